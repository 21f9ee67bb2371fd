//! Typed accessor over the switch's loose string-keyed request (§4.1,
//! §9 "dynamic field access maps to a typed accessor that reads a small,
//! closed set of recognized keys with documented precedence").

use std::collections::HashMap;

/// The form-urlencoded body the switch posts for every lookup. Keys and
/// values are both strings; this wrapper is the only place in the crate
/// that understands the switch's naming and precedence rules.
#[derive(Debug, Clone)]
pub struct CallVars(HashMap<String, String>);

impl CallVars {
    pub fn new(map: HashMap<String, String>) -> Self {
        Self(map)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|s| !s.is_empty())
    }

    pub fn section(&self) -> Option<&str> {
        self.get("section")
    }

    pub fn action(&self) -> Option<&str> {
        self.get("action")
    }

    /// Domain hint, tried in the order the spec documents: `domain`, then
    /// `variable_domain_name`, then `variable_sip_to_host`.
    pub fn domain(&self) -> Option<&str> {
        self.get("domain")
            .or_else(|| self.get("variable_domain_name"))
            .or_else(|| self.get("variable_sip_to_host"))
    }

    /// Call-context, defaulting to `"default"` per the spec.
    pub fn context(&self) -> &str {
        self.get("Caller-Context")
            .or_else(|| self.get("variable_dialplan_context"))
            .unwrap_or("default")
    }

    pub fn destination(&self) -> Option<&str> {
        self.get("Caller-Destination-Number")
            .or_else(|| self.get("destination_number"))
    }

    /// The trunk's own notion of the DID dialed, overriding whatever the
    /// carrier put in the destination-number field.
    pub fn signalwire_actual_did(&self) -> Option<&str> {
        self.get("variable_signalwire_actual_did")
    }

    pub fn sip_to_user(&self) -> Option<&str> {
        self.get("variable_sip_to_user")
            .or_else(|| self.get("variable_sip_dest_user"))
    }

    pub fn caller_id_number(&self) -> Option<&str> {
        self.get("Caller-Caller-ID-Number")
    }

    pub fn caller_id_name(&self) -> Option<&str> {
        self.get("Caller-Caller-ID-Name")
    }

    pub fn channel_name(&self) -> Option<&str> {
        self.get("Caller-Channel-Name")
    }

    /// The trunk's best guess at the real DID: the explicit override if
    /// present, otherwise the callee-hint, otherwise the destination.
    pub fn inbound_did_hint(&self) -> Option<&str> {
        self.signalwire_actual_did()
            .or_else(|| self.sip_to_user())
            .or_else(|| self.destination())
    }

    /// The `user_id` / mailbox id a directory lookup is for.
    pub fn directory_user_id(&self) -> Option<&str> {
        self.get("user")
            .or_else(|| self.get("sip_auth_username"))
            .or_else(|| self.get("Auth-User"))
    }

    pub fn config_key_name(&self) -> Option<&str> {
        self.get("keyvalue").or_else(|| self.get("key_value"))
    }
}
