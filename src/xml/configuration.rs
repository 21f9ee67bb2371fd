//! Configuration document emission (§4.3): the SIP-profile document with a
//! static internal profile and an external profile populated from the
//! global gateway pool.

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::error::EmitError;
use crate::models::Gateway;

/// "Result not found" document for any configuration key other than the
/// SIP profile (§4.3).
pub fn emit_not_found() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<document type="freeswitch/xml">
  <section name="result">
    <result status="not found"/>
  </section>
</document>"#
        .to_string()
}

/// The SIP-profile configuration document: a fixed internal profile plus an
/// external profile enumerating `gateways` (one `<gateway>` per record). An
/// empty pool still yields a well-formed external profile with safe
/// defaults (§4.3).
pub fn emit_sip_profiles(external_profile_name: &str, gateways: &[Gateway]) -> String {
    try_emit(external_profile_name, gateways).unwrap_or_else(|err| {
        tracing::error!(error = %err, "malformed configuration document, emitting not-found");
        emit_not_found()
    })
}

fn try_emit(external_profile_name: &str, gateways: &[Gateway]) -> Result<String, EmitError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut document = BytesStart::new("document");
    document.push_attribute(("type", "freeswitch/xml"));
    writer.write_event(Event::Start(document.clone()))?;

    let mut section = BytesStart::new("section");
    section.push_attribute(("name", "configuration"));
    writer.write_event(Event::Start(section.clone()))?;

    let mut config = BytesStart::new("configuration");
    config.push_attribute(("name", "sofia.conf"));
    config.push_attribute(("description", "sofia SIP profiles"));
    writer.write_event(Event::Start(config.clone()))?;

    writer.write_event(Event::Start(BytesStart::new("profiles")))?;
    write_internal_profile(&mut writer)?;
    write_external_profile(&mut writer, external_profile_name, gateways)?;
    writer.write_event(Event::End(BytesStart::new("profiles").to_end()))?;

    writer.write_event(Event::End(config.to_end()))?;
    writer.write_event(Event::End(section.to_end()))?;
    writer.write_event(Event::End(document.to_end()))?;

    Ok(String::from_utf8(writer.into_inner().into_inner()).expect("quick-xml only writes valid utf-8"))
}

fn write_internal_profile<W: std::io::Write>(writer: &mut Writer<W>) -> Result<(), EmitError> {
    let mut profile = BytesStart::new("profile");
    profile.push_attribute(("name", "internal"));
    writer.write_event(Event::Start(profile.clone()))?;

    writer.write_event(Event::Start(BytesStart::new("settings")))?;
    for (name, value) in [
        ("context", "default"),
        ("codec-prefs", "OPUS,G722,PCMU,PCMA"),
        ("presence-privacy", "false"),
        ("manage-presence", "true"),
        ("apply-nat-acl", "nat.auto"),
        ("record-path", "/var/lib/switchplane/recordings"),
    ] {
        write_param(writer, name, value)?;
    }
    writer.write_event(Event::End(BytesStart::new("settings").to_end()))?;
    writer.write_event(Event::End(profile.to_end()))?;
    Ok(())
}

fn write_external_profile<W: std::io::Write>(
    writer: &mut Writer<W>,
    profile_name: &str,
    gateways: &[Gateway],
) -> Result<(), EmitError> {
    let mut profile = BytesStart::new("profile");
    profile.push_attribute(("name", profile_name));
    writer.write_event(Event::Start(profile.clone()))?;

    writer.write_event(Event::Start(BytesStart::new("settings")))?;
    for (name, value) in [("context", "public"), ("codec-prefs", "PCMU,PCMA,G729")] {
        write_param(writer, name, value)?;
    }
    writer.write_event(Event::End(BytesStart::new("settings").to_end()))?;

    writer.write_event(Event::Start(BytesStart::new("gateways")))?;
    for gateway in gateways {
        let mut gw = BytesStart::new("gateway");
        gw.push_attribute(("name", gateway.name.as_str()));
        writer.write_event(Event::Start(gw.clone()))?;

        write_param(writer, "realm", &gateway.realm)?;
        write_param(writer, "username", &gateway.username)?;
        write_param(writer, "password", &gateway.password)?;
        write_param(writer, "proxy", &gateway.proxy)?;
        write_param(writer, "register", if gateway.register { "true" } else { "false" })?;
        if let Some(transport) = &gateway.register_transport {
            write_param(writer, "register-transport", transport)?;
        }
        if let Some(secure_media) = &gateway.secure_media {
            write_param(writer, "secure-media", secure_media)?;
        }
        write_param(writer, "dtmf-type", dtmf_type_str(gateway))?;
        write_param(writer, "codec-prefs", &gateway.codec_prefs.join(","))?;

        writer.write_event(Event::End(gw.to_end()))?;
    }
    writer.write_event(Event::End(BytesStart::new("gateways").to_end()))?;

    writer.write_event(Event::End(profile.to_end()))?;
    Ok(())
}

fn dtmf_type_str(gateway: &Gateway) -> &'static str {
    use crate::models::gateway::DtmfType;
    match gateway.dtmf_type {
        DtmfType::Rfc2833 => "rfc2833",
        DtmfType::Info => "info",
        DtmfType::Inband => "inband",
    }
}

fn write_param<W: std::io::Write>(writer: &mut Writer<W>, name: &str, value: &str) -> Result<(), EmitError> {
    let mut param = BytesStart::new("param");
    param.push_attribute(("name", name));
    param.push_attribute(("value", value));
    writer.write_event(Event::Empty(param))?;
    Ok(())
}
