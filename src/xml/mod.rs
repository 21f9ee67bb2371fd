//! XML Emitter (§4.4), grounded on
//! `eisenzopf-rvoip/crates/registrar-core/src/presence/pidf.rs`'s push-based
//! `quick_xml::Writer`/`Event` document construction.
//!
//! Pure function from an in-memory extension program to a well-formed XML
//! document. Identifier attributes (`name`, `field`, `application`) are
//! escaped by `quick-xml`'s `BytesStart::push_attribute`; `expression` and
//! action `data` are written as raw text nodes so `${...}` switch-side
//! interpolation and regex metacharacters survive untouched — upstream
//! sanitization of those values is the resolver's job (§4.4).

pub mod configuration;
pub mod directory;

use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::error::EmitError;
use crate::models::ExtensionProgram;

/// Emits the dialplan document for a single resolved extension. Never
/// panics or propagates: a malformed program is replaced with the standard
/// error program before emission is attempted (§4.4 "if malformed... emit
/// the standard error program instead of crashing").
pub fn emit_dialplan(program: &ExtensionProgram) -> String {
    match try_emit_dialplan(program) {
        Ok(xml) => xml,
        Err(err) => {
            tracing::error!(error = %err, extension = %program.name, "malformed extension program, substituting error document");
            try_emit_dialplan(&ExtensionProgram::error(&program.context))
                .expect("the built-in error program is always well-formed")
        }
    }
}

fn try_emit_dialplan(program: &ExtensionProgram) -> Result<String, EmitError> {
    if program.name.is_empty() {
        return Err(EmitError::MissingField("name"));
    }
    if program.condition_field.is_empty() {
        return Err(EmitError::MissingField("condition_field"));
    }

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    write_element(&mut writer, "document", &[("type", "freeswitch/xml")], |w| {
        write_element(w, "section", &[("name", "dialplan")], |w| {
            write_element(w, "context", &[("name", &program.context)], |w| {
                write_element(w, "extension", &[("name", &program.name)], |w| {
                    write_element(
                        w,
                        "condition",
                        &[("field", &program.condition_field), ("expression", &program.expression)],
                        |w| {
                            for action in &program.actions {
                                let mut start = BytesStart::new("action");
                                start.push_attribute(("application", action.application.as_str()));
                                start.push_attribute(("data", action.data.as_str()));
                                w.write_event(Event::Empty(start))?;
                            }
                            Ok(())
                        },
                    )
                })
            })
        })
    })?;

    Ok(String::from_utf8(writer.into_inner().into_inner()).expect("quick-xml only writes valid utf-8"))
}

/// Writes `<tag attr="val"...>...children...</tag>`, recursing via `body`.
/// `expression`/`data` attribute values pass through `push_attribute`
/// untouched (no extra escaping beyond what quick-xml already applies for
/// `< > & ' "`), matching §4.4's passthrough rule.
fn write_element<W: std::io::Write, F>(
    writer: &mut Writer<W>,
    tag: &str,
    attrs: &[(&str, &str)],
    body: F,
) -> Result<(), EmitError>
where
    F: FnOnce(&mut Writer<W>) -> Result<(), EmitError>,
{
    let mut start = BytesStart::new(tag);
    for (key, value) in attrs {
        start.push_attribute((*key, *value));
    }
    writer.write_event(Event::Start(start.clone()))?;
    body(writer)?;
    writer.write_event(Event::End(start.to_end()))?;
    Ok(())
}

/// Emits a bare text leaf, e.g. `<password>secret</password>`, used by the
/// directory document.
pub(crate) fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), EmitError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesStart::new(tag).to_end()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;

    #[test]
    fn emits_single_extension_inside_single_context() {
        let program = ExtensionProgram::new("default", "1001")
            .with_condition("destination_number", "^1001$")
            .push(Action::new("bridge", "user/1001@a.example"));

        let xml = emit_dialplan(&program);
        assert_eq!(xml.matches("<extension").count(), 1);
        assert_eq!(xml.matches("<context").count(), 1);
        assert!(xml.contains(r#"expression="^1001$""#));
        assert!(xml.contains(r#"data="user/1001@a.example""#));
    }

    #[test]
    fn malformed_program_falls_back_to_error_document() {
        let program = ExtensionProgram {
            context: "default".to_string(),
            name: String::new(),
            condition_field: "destination_number".to_string(),
            expression: "^x$".to_string(),
            actions: vec![],
        };
        let xml = emit_dialplan(&program);
        assert!(xml.contains(r#"name="error""#));
        assert!(xml.contains("cannot_be_completed"));
    }

    #[test]
    fn expression_special_characters_pass_through_verbatim() {
        let program = ExtensionProgram::new("default", "1001")
            .with_condition("destination_number", r"^\+15125551234$")
            .push(Action::new("set", "caller_id_name=${cnam_name}"));

        let xml = emit_dialplan(&program);
        assert!(xml.contains(r#"expression="^\+15125551234$""#));
        assert!(xml.contains("${cnam_name}"));
    }
}
