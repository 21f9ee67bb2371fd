//! Inbound-DID handling (§4.1 "Inbound-DID handling").

use crate::cnam::CnamClient;
use crate::models::program::anchored;
use crate::models::{Action, CallVars, ExtensionProgram, FailoverRoutingType, RoutingType, Tenant};
use crate::store::SwitchStore;

use super::local::{group_program, no_answer_tail};
use super::normalize::{canonical_did, strip_leading_plus_one};

/// Resolves an inbound call once the trunk-side DID hint has been
/// extracted. Always returns a program — a missing tenant/target is a
/// no-match, never an error (§7).
pub async fn resolve_inbound_did(
    store: &dyn SwitchStore,
    cnam: &CnamClient,
    vars: &CallVars,
    did_hint: &str,
) -> ExtensionProgram {
    let did_number = canonical_did(did_hint);
    let caller_number = vars.caller_id_number().unwrap_or_default();

    let (display_name, display_number) = resolve_caller_identity(cnam, vars, caller_number).await;

    let tenant = match store.get_tenant_and_did_by_did_number(&did_number).await {
        Ok(Some(tenant)) => tenant,
        Ok(None) => return ExtensionProgram::no_match("default", did_hint),
        Err(err) => {
            tracing::error!(error = %err, did = %did_number, "store error resolving inbound DID");
            return ExtensionProgram::error("default");
        }
    };

    let did = match tenant.find_did(&did_number) {
        Some(did) => did.clone(),
        None => return ExtensionProgram::no_match("default", did_hint),
    };

    let domain = &tenant.domain_name;
    let sip_from_uri = format!("sip:{display_number}@{domain}");

    let mut program = ExtensionProgram::new("default", &format!("inbound-did-{}", did.did_number))
        .with_condition("destination_number", &anchored(did_hint))
        .push(set_export("caller_id_name", &display_name))
        .push(set_export("caller_id_number", &display_number))
        .push(set_export("effective_caller_id_name", &display_name))
        .push(set_export("effective_caller_id_number", &display_number))
        .push(set_export("sip_invite_domain", domain))
        .push(set_export("sip_from_host", domain))
        .push(set_export("sip_from_user", &display_number))
        .push(set_export("sip_from_display", &display_name))
        .push(set_export("sip_from_uri", &sip_from_uri))
        .push(Action::new("set", "continue_on_fail=true"))
        .push(Action::new("set", "hangup_after_bridge=true"));

    let routed = route_target(&tenant, &did);
    program = program.extend(routed);
    program = program.extend(failover_tail(domain, &did));
    program
}

async fn resolve_caller_identity(cnam: &CnamClient, vars: &CallVars, caller_number: &str) -> (String, String) {
    if let Some(record) = cnam.lookup(caller_number).await {
        let rewritten_name = format!(
            "{}, {}, {}",
            strip_leading_plus_one(&record.national_number_formatted),
            record.caller_id,
            record.location
        );
        (rewritten_name, strip_leading_plus_one(&record.national_number_formatted))
    } else {
        let name = vars.caller_id_name().unwrap_or(caller_number).to_string();
        (strip_leading_plus_one(&name), strip_leading_plus_one(caller_number))
    }
}

fn set_export(name: &str, value: &str) -> Action {
    // Two actions collapse into one for data that must both be visible to
    // this leg and survive into the bridged leg; emitted as a single
    // `export` covers both per the switch's semantics for this field set.
    Action::new("export", format!("{name}={value}"))
}

fn route_target(tenant: &Tenant, did: &crate::models::Did) -> Vec<Action> {
    let domain = &tenant.domain_name;
    match did.routing_type {
        RoutingType::Extension => match tenant.find_sip_client(&did.routing_target) {
            Some(client) => vec![Action::new("bridge", format!("user/{}@{domain}", client.user_id))],
            None => vec![],
        },
        RoutingType::Group => match tenant.find_group(&did.routing_target) {
            Some(group) => group_program(domain, &did.routing_target, group).actions,
            None => vec![],
        },
        RoutingType::Ivr => vec![Action::new(
            "transfer",
            format!("{} XML {domain}_ivr_context", did.routing_target),
        )],
        RoutingType::ExternalNumber | RoutingType::Custom => {
            vec![Action::new("transfer", did.routing_target.clone())]
        }
    }
}

fn failover_tail(domain: &str, did: &crate::models::Did) -> Vec<Action> {
    if did.failover_routing_type == Some(FailoverRoutingType::DialplanExtension) {
        if let Some(target) = &did.failover_routing_target {
            if let Some(box_id) = target.strip_prefix("voicemail_") {
                return no_answer_tail(domain, Some(box_id), None);
            }
        }
    }
    no_answer_tail(domain, None, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Did, SipClient};
    use crate::store::fixture::FixtureStore;
    use std::collections::HashMap;

    fn vars(caller_number: &str, caller_name: &str) -> CallVars {
        CallVars::new(HashMap::from([
            ("Caller-Caller-ID-Number".to_string(), caller_number.to_string()),
            ("Caller-Caller-ID-Name".to_string(), caller_name.to_string()),
        ]))
    }

    fn tenant_with_did() -> Tenant {
        let mut tenant = Tenant {
            domain_name: "a.example".into(),
            ..Default::default()
        };
        tenant.sip_clients.push(SipClient {
            user_id: "1001".into(),
            password: "p".into(),
            display_name: None,
            enable_voicemail: true,
            voicemail_pin: Some("1234".into()),
            voicemail_email: None,
            no_answer_timeout: None,
            local_caller_id_name: None,
        });
        tenant.dids.push(Did {
            did_number: "+15125551234".into(),
            active: true,
            routing_type: RoutingType::Extension,
            routing_target: "1001".into(),
            failover_routing_type: Some(FailoverRoutingType::DialplanExtension),
            failover_routing_target: Some("voicemail_1001".into()),
        });
        tenant
    }

    #[tokio::test]
    async fn routes_to_extension_with_voicemail_failover() {
        let store = FixtureStore::new().with_tenant(tenant_with_did());
        let cnam = CnamClient::disabled();
        let vars = vars("5125550000", "Jane Doe");

        let program = resolve_inbound_did(&store, &cnam, &vars, "5125551234").await;

        assert_eq!(program.context, "default");
        assert!(program.actions.iter().any(|a| a.application == "bridge" && a.data == "user/1001@a.example"));
        let voicemail = program.actions.iter().find(|a| a.application == "voicemail").unwrap();
        assert_eq!(voicemail.data, "default a.example 1001");
    }

    #[tokio::test]
    async fn unknown_did_falls_back_to_no_match() {
        let store = FixtureStore::new();
        let cnam = CnamClient::disabled();
        let vars = vars("5125550000", "Jane Doe");

        let program = resolve_inbound_did(&store, &cnam, &vars, "5125559999").await;
        assert_eq!(program.name, "no-match");
    }

    #[tokio::test]
    async fn disabled_cnam_keeps_switch_supplied_caller_name() {
        let store = FixtureStore::new().with_tenant(tenant_with_did());
        let cnam = CnamClient::disabled();
        let vars = vars("5125550000", "Jane Doe");

        let program = resolve_inbound_did(&store, &cnam, &vars, "5125551234").await;
        let name_export = program.actions.iter().find(|a| a.data.starts_with("caller_id_name=")).unwrap();
        assert_eq!(name_export.data, "caller_id_name=Jane Doe");
    }
}
