//! Directory document emission (§4.2, §4.4 shape conventions applied to the
//! `directory` section instead of `dialplan`).

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::error::EmitError;
use crate::resolver::directory::DirectoryUser;

/// Emits the directory document. A lookup miss (§4.2 "If nothing matches,
/// emit an empty directory document") is represented by `user: None`.
pub fn emit_directory(domain: &str, user: Option<&DirectoryUser>) -> String {
    try_emit_directory(domain, user).unwrap_or_else(|err| {
        tracing::error!(error = %err, "malformed directory document, emitting empty document");
        empty_document()
    })
}

fn try_emit_directory(domain: &str, user: Option<&DirectoryUser>) -> Result<String, EmitError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut document = BytesStart::new("document");
    document.push_attribute(("type", "freeswitch/xml"));
    writer.write_event(Event::Start(document.clone()))?;

    let mut section = BytesStart::new("section");
    section.push_attribute(("name", "directory"));
    writer.write_event(Event::Start(section.clone()))?;

    if let Some(user) = user {
        let mut domain_el = BytesStart::new("domain");
        domain_el.push_attribute(("name", domain));
        writer.write_event(Event::Start(domain_el.clone()))?;

        let mut user_el = BytesStart::new("user");
        user_el.push_attribute(("id", user.id.as_str()));
        writer.write_event(Event::Start(user_el.clone()))?;

        writer.write_event(Event::Start(BytesStart::new("params")))?;
        write_param(&mut writer, "password", &user.password)?;
        if let Some(vm_pin) = &user.vm_password {
            write_param(&mut writer, "vm-password", vm_pin)?;
        }
        writer.write_event(Event::End(BytesStart::new("params").to_end()))?;

        writer.write_event(Event::Start(BytesStart::new("variables")))?;
        write_param(&mut writer, "user_context", &user.context)?;
        write_param(&mut writer, "domain_name", domain)?;
        if let Some(cid_name) = &user.caller_id_name {
            write_param(&mut writer, "effective_caller_id_name", cid_name)?;
        }
        if let Some(cid_number) = &user.caller_id_number {
            write_param(&mut writer, "effective_caller_id_number", cid_number)?;
        }
        if let Some(email) = &user.voicemail_email {
            write_param(&mut writer, "vm-mailto", email)?;
        }
        if let Some(mailbox) = &user.voicemail_mailbox {
            write_param(&mut writer, "vm-mailbox", mailbox)?;
        }
        writer.write_event(Event::End(BytesStart::new("variables").to_end()))?;

        writer.write_event(Event::End(user_el.to_end()))?;
        writer.write_event(Event::End(domain_el.to_end()))?;
    }

    writer.write_event(Event::End(section.to_end()))?;
    writer.write_event(Event::End(document.to_end()))?;

    Ok(String::from_utf8(writer.into_inner().into_inner()).expect("quick-xml only writes valid utf-8"))
}

fn write_param<W: std::io::Write>(writer: &mut Writer<W>, name: &str, value: &str) -> Result<(), EmitError> {
    let mut param = BytesStart::new("param");
    param.push_attribute(("name", name));
    param.push_attribute(("value", value));
    writer.write_event(Event::Empty(param))?;
    Ok(())
}

fn empty_document() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<document type="freeswitch/xml">
  <section name="directory"/>
</document>"#
        .to_string()
}
