//! Call classification — the dialplan resolver's state machine entry point
//! (§4.1 "Classification state machine").

use crate::models::CallVars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A carrier trunk call; inbound-DID handling applies.
    Public,
    /// The internal context: inter-domain guard, outbound PSTN, local
    /// dispatch, in that order.
    Default,
    /// Anything else — logged and sent straight to the no-match fallback.
    Other(String),
}

pub fn classify(vars: &CallVars) -> Classification {
    match vars.context() {
        "public" => Classification::Public,
        "default" => Classification::Default,
        other => Classification::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars_with_context(context: &str) -> CallVars {
        CallVars::new(HashMap::from([("Caller-Context".to_string(), context.to_string())]))
    }

    #[test]
    fn classifies_known_contexts() {
        assert_eq!(classify(&vars_with_context("public")), Classification::Public);
        assert_eq!(classify(&vars_with_context("default")), Classification::Default);
    }

    #[test]
    fn unknown_context_falls_through_to_other() {
        assert_eq!(
            classify(&vars_with_context("weird")),
            Classification::Other("weird".to_string())
        );
    }

    #[test]
    fn missing_context_defaults_to_default() {
        let vars = CallVars::new(HashMap::new());
        assert_eq!(classify(&vars), Classification::Default);
    }
}
