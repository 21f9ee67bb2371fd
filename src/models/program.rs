//! The in-memory "extension program" the resolvers build and the XML
//! Emitter turns into a switch-executable document (§4.4).

use serde::{Deserialize, Serialize};

/// A single `<action application="..." data="..."/>` entry. Actions execute
/// in the order the switch finds them in the document, so every producer in
/// this crate appends to a `Vec`, never reorders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub application: String,
    #[serde(default)]
    pub data: String,
}

impl Action {
    pub fn new(application: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            data: data.into(),
        }
    }

    pub fn bare(application: impl Into<String>) -> Self {
        Self::new(application, "")
    }
}

/// One named extension: a condition on a request field plus ordered
/// actions. The Emitter wraps exactly one of these inside exactly one
/// `<context>` (§8 invariant).
#[derive(Debug, Clone)]
pub struct ExtensionProgram {
    pub context: String,
    pub name: String,
    pub condition_field: String,
    pub expression: String,
    pub actions: Vec<Action>,
}

impl ExtensionProgram {
    pub fn new(context: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            name: name.into(),
            condition_field: "destination_number".to_string(),
            expression: String::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, field: impl Into<String>, expression: impl Into<String>) -> Self {
        self.condition_field = field.into();
        self.expression = expression.into();
        self
    }

    pub fn push(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn extend(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// The standard "something went wrong, don't crash the call" program —
    /// §7's guiding principle made concrete. Every fallible path that would
    /// otherwise have no safe response converges here.
    pub fn error(context: &str) -> Self {
        Self::new(context, "error")
            .with_condition("destination_number", "^.*$")
            .push(Action::bare("answer"))
            .push(Action::new("playback", "ivr/ivr-call_cannot_be_completed_as_dialed.wav"))
            .push(Action::bare("hangup"))
    }

    /// No matching route was found for the destination, but nothing went
    /// wrong — a routing decision, not an error (§7).
    pub fn no_match(context: &str, destination: &str) -> Self {
        Self::new(context, "no-match")
            .with_condition("destination_number", &anchored(destination))
            .push(Action::bare("answer"))
            .push(Action::new("playback", "ivr/ivr-call_cannot_be_completed_as_dialed.wav"))
            .push(Action::bare("hangup"))
    }

    pub fn rejected(context: &str, destination: &str) -> Self {
        Self::new(context, "rejected")
            .with_condition("destination_number", &anchored(destination))
            .push(Action::new("hangup", "CALL_REJECTED"))
    }
}

/// Anchor and regex-escape a literal destination for use as a condition
/// expression — §4.1 "every emitted condition expression anchors the
/// destination literally".
pub fn anchored(destination: &str) -> String {
    format!("^{}$", regex::escape(destination))
}
