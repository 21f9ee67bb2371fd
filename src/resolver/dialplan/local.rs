//! Local dispatch (§4.1 "Local dispatch, in strict order of precedence").
//! Runs after the inter-domain guard and outbound-PSTN match have both
//! passed on a call in the `default` context.

use crate::config::AppConfig;
use crate::models::program::anchored;
use crate::models::{Action, CallVars, ExtensionProgram, Group, GroupType, Tenant};

use super::normalize::{is_external_dial_out, normalize_identifier};

/// Runs rules 1-6 of §4.1 local dispatch in order, returning the first
/// match. `None` means "continue to fallback" (rule 6), which the caller
/// (the top-level resolver) always supplies.
pub fn dispatch(config: &AppConfig, vars: &CallVars, tenant: &Tenant, destination: &str) -> Option<ExtensionProgram> {
    if destination == config.voicemail_check_code {
        return Some(voicemail_retrieval(config, &tenant.domain_name));
    }

    if let Some(group) = tenant.find_group(destination) {
        return Some(group_program(&tenant.domain_name, destination, group));
    }

    if let Some(extension) = tenant
        .dialplan_entries()
        .iter()
        .find(|e| e.condition_field == "destination_number" && anchored_matches(&e.condition_expression, destination))
    {
        return Some(
            ExtensionProgram::new("default", &extension.name)
                .with_condition("destination_number", &extension.condition_expression)
                .extend(extension.actions.clone()),
        );
    }

    let normalized_destination = normalize_identifier(destination);
    if let Some(client) = tenant
        .sip_clients
        .iter()
        .find(|c| normalize_identifier(&c.user_id) == normalized_destination)
    {
        return Some(direct_sip_client_program(vars, &tenant.domain_name, destination, client));
    }

    if is_external_dial_out(destination) {
        return Some(external_dial_out_program(config, destination));
    }

    None
}

fn anchored_matches(expression: &str, destination: &str) -> bool {
    regex::Regex::new(expression)
        .map(|re| re.is_match(destination))
        .unwrap_or(false)
}

fn voicemail_retrieval(config: &AppConfig, domain: &str) -> ExtensionProgram {
    ExtensionProgram::new("default", "voicemail-check")
        .with_condition("destination_number", &anchored(&config.voicemail_check_code))
        .push(Action::bare("answer"))
        .push(Action::new("sleep", "1000"))
        .push(Action::new("voicemail", format!("check default {domain}")))
        .push(Action::bare("hangup"))
}

/// Member URIs joined per §4.1 rule 2: `"|"` for hunt (sequential), `","`
/// for ring (simultaneous), with an optional leading `timeout=<n>,` token.
pub fn group_program(domain: &str, destination: &str, group: &Group) -> ExtensionProgram {
    let separator = match group.group_type {
        GroupType::Hunt => "|",
        GroupType::Ring => ",",
    };

    let members = group
        .ordered_members()
        .map(|m| format!("user/{}@{domain}", m.user_id))
        .collect::<Vec<_>>()
        .join(separator);

    let timeout_prefix = group.timeout.map(|t| format!("timeout={t},")).unwrap_or_default();
    let bridge_data = format!("{timeout_prefix}{members}");

    let mut program = ExtensionProgram::new("default", &format!("group-{}", group.name))
        .with_condition("destination_number", &anchored(destination))
        .push(Action::new("bridge", bridge_data));

    program = program.extend(no_answer_tail(domain, group.voicemail_box_id.as_deref(), group.no_answer_action.as_ref()));
    program
}

/// The shared "what happens if nobody answers" tail used by group routing
/// (§4.1 rule 2), direct SIP client routing (§4.1 rule 4), and inbound DID
/// extension/group routing (§4.1 inbound handling): voicemail if a mailbox
/// is configured, a custom action if declared, otherwise announce+hangup.
pub fn no_answer_tail(domain: &str, voicemail_box_id: Option<&str>, no_answer_action: Option<&Action>) -> Vec<Action> {
    if let Some(box_id) = voicemail_box_id {
        vec![
            Action::bare("answer"),
            Action::new("sleep", "1000"),
            Action::new("voicemail", format!("default {domain} {box_id}")),
            Action::bare("hangup"),
        ]
    } else if let Some(action) = no_answer_action {
        vec![action.clone()]
    } else {
        vec![
            Action::bare("answer"),
            Action::new("playback", "ivr/ivr-call_cannot_be_completed_as_dialed.wav"),
            Action::bare("hangup"),
        ]
    }
}

/// The standard per-user program (§4.1 rule 4): declares bookkeeping
/// variables the switch/UI layer reads, then bridges to the user, falling
/// back to voicemail-or-announce on no answer.
fn direct_sip_client_program(
    _vars: &CallVars,
    domain: &str,
    destination: &str,
    client: &crate::models::SipClient,
) -> ExtensionProgram {
    let mut program = ExtensionProgram::new("default", &format!("client-{}", client.user_id))
        .with_condition("destination_number", &anchored(destination))
        .push(Action::new("set", format!("dialed_extension={}", client.user_id)))
        .push(Action::new("export", format!("dialed_extension={}", client.user_id)))
        .push(Action::new("set", format!("user_exists=${{user_exists(id {}@{domain})}}", client.user_id)))
        .push(Action::new("set", "dx=extension"))
        .push(Action::new("set", "RECORD_SESSION=false"))
        .push(Action::new("set", "call_forward=${call_forward}"))
        .push(Action::new("set", "attended_transfer=true"))
        .push(Action::new("set", "ringback=${us-ring}"))
        .push(Action::new("set", "transfer_ringback=${us-ring}"))
        .push(Action::new("set", format!("call_timeout={}", client.no_answer_timeout())))
        .push(Action::new("set", "hangup_after_bridge=true"))
        .push(Action::new("set", "continue_on_fail=true"))
        .push(Action::new("set", format!("call_return=${{call_return}},{}", client.user_id)))
        .push(Action::new("set", format!("last_dial_ext={}", client.user_id)))
        .push(Action::new("bridge", format!("user/{}@{domain}", client.user_id)));

    let voicemail_box_id = client.enable_voicemail.then(|| client.user_id.as_str());
    program = program.extend(no_answer_tail(domain, voicemail_box_id, None));
    program
}

fn external_dial_out_program(config: &AppConfig, destination: &str) -> ExtensionProgram {
    ExtensionProgram::new("default", "external-dial-out")
        .with_condition("destination_number", &anchored(destination))
        .push(Action::new(
            "bridge",
            format!("sofia/gateway/{}/{destination}", config.outbound_gateway_profile),
        ))
        .push(Action::new("playback", "ivr/ivr-call_cannot_be_completed_as_dialed.wav"))
        .push(Action::bare("hangup"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupMember, GroupStrategy};
    use std::collections::HashMap;

    fn empty_vars() -> CallVars {
        CallVars::new(HashMap::new())
    }

    #[test]
    fn voicemail_check_code_produces_expected_action_sequence() {
        let config = AppConfig::test_default();
        let program = dispatch(&config, &empty_vars(), &Tenant { domain_name: "a.example".into(), ..Default::default() }, "*98")
            .unwrap();
        let apps: Vec<_> = program.actions.iter().map(|a| a.application.as_str()).collect();
        assert_eq!(apps, vec!["answer", "sleep", "voicemail", "hangup"]);
        assert_eq!(program.actions[2].data, "check default a.example");
    }

    #[test]
    fn hunt_group_joins_members_with_pipe_and_timeout_prefix() {
        let group = Group {
            name: "sales".into(),
            group_type: GroupType::Hunt,
            timeout: Some(20),
            members: vec![
                GroupMember { user_id: "1001".into(), order: 0 },
                GroupMember { user_id: "1002".into(), order: 1 },
            ],
            strategy: GroupStrategy::Sequential,
            voicemail_box_id: None,
            no_answer_action: None,
        };
        let program = group_program("a.example", "sales", &group);
        let bridge = program.actions.iter().find(|a| a.application == "bridge").unwrap();
        assert_eq!(bridge.data, "timeout=20,user/1001@a.example|user/1002@a.example");
    }

    #[test]
    fn ring_group_joins_members_with_comma() {
        let group = Group {
            name: "ring1".into(),
            group_type: GroupType::Ring,
            timeout: None,
            members: vec![
                GroupMember { user_id: "1001".into(), order: 0 },
                GroupMember { user_id: "1002".into(), order: 1 },
            ],
            strategy: GroupStrategy::Simultaneous,
            voicemail_box_id: None,
            no_answer_action: None,
        };
        let program = group_program("a.example", "ring1", &group);
        let bridge = program.actions.iter().find(|a| a.application == "bridge").unwrap();
        assert_eq!(bridge.data, "user/1001@a.example,user/1002@a.example");
    }

    #[test]
    fn group_with_zero_members_still_produces_well_formed_bridge() {
        let group = Group {
            name: "empty".into(),
            group_type: GroupType::Ring,
            timeout: None,
            members: vec![],
            strategy: GroupStrategy::Simultaneous,
            voicemail_box_id: None,
            no_answer_action: None,
        };
        let program = group_program("a.example", "empty", &group);
        let bridge = program.actions.iter().find(|a| a.application == "bridge").unwrap();
        assert_eq!(bridge.data, "");
    }

    #[test]
    fn direct_client_sets_call_timeout_from_no_answer_timeout() {
        let config = AppConfig::test_default();
        let mut tenant = Tenant { domain_name: "a.example".into(), ..Default::default() };
        tenant.sip_clients.push(crate::models::SipClient {
            user_id: "1001".into(),
            password: "p".into(),
            display_name: None,
            enable_voicemail: false,
            voicemail_pin: None,
            voicemail_email: None,
            no_answer_timeout: Some(25),
            local_caller_id_name: None,
        });
        let program = dispatch(&config, &empty_vars(), &tenant, "1001").unwrap();
        assert!(program.actions.iter().any(|a| a.application == "set" && a.data == "call_timeout=25"));
        assert!(program.actions.iter().any(|a| a.application == "bridge" && a.data == "user/1001@a.example"));
    }

    #[test]
    fn direct_client_with_voicemail_enabled_falls_back_to_voicemail_on_no_answer() {
        let config = AppConfig::test_default();
        let mut tenant = Tenant { domain_name: "a.example".into(), ..Default::default() };
        tenant.sip_clients.push(crate::models::SipClient {
            user_id: "1001".into(),
            password: "p".into(),
            display_name: None,
            enable_voicemail: true,
            voicemail_pin: None,
            voicemail_email: None,
            no_answer_timeout: None,
            local_caller_id_name: None,
        });
        let program = dispatch(&config, &empty_vars(), &tenant, "1001").unwrap();
        assert!(program.actions.iter().any(|a| a.application == "voicemail" && a.data == "default a.example 1001"));
    }

    #[test]
    fn direct_client_without_voicemail_falls_back_to_announce_and_hangup() {
        let config = AppConfig::test_default();
        let mut tenant = Tenant { domain_name: "a.example".into(), ..Default::default() };
        tenant.sip_clients.push(crate::models::SipClient {
            user_id: "1001".into(),
            password: "p".into(),
            display_name: None,
            enable_voicemail: false,
            voicemail_pin: None,
            voicemail_email: None,
            no_answer_timeout: None,
            local_caller_id_name: None,
        });
        let program = dispatch(&config, &empty_vars(), &tenant, "1001").unwrap();
        assert!(!program.actions.iter().any(|a| a.application == "voicemail"));
        assert!(program.actions.iter().any(|a| a.application == "playback"));
    }

    #[test]
    fn external_dial_out_matches_ten_to_fifteen_digit_destinations() {
        let config = AppConfig::test_default();
        let tenant = Tenant { domain_name: "a.example".into(), ..Default::default() };
        let program = dispatch(&config, &empty_vars(), &tenant, "+442071234567").unwrap();
        let bridge = program.actions.iter().find(|a| a.application == "bridge").unwrap();
        assert!(bridge.data.starts_with("sofia/gateway/"));
    }

    #[test]
    fn no_match_returns_none_for_fallback() {
        let config = AppConfig::test_default();
        let tenant = Tenant { domain_name: "a.example".into(), ..Default::default() };
        assert!(dispatch(&config, &empty_vars(), &tenant, "99999999999999999").is_none());
    }
}
