//! Directory Resolver (§4.2): resolves a directory lookup to a user entry,
//! in precedence order direct SIP client, then a group's voicemail box,
//! then a DID's failover voicemail box. A lookup miss becomes `None` — the
//! emitter turns that into an empty directory document, never an error.

use crate::error::ResolverError;
use crate::models::{FailoverRoutingType, SipClient, Tenant};
use crate::store::SwitchStore;

/// What the directory emitter needs to build a `<user>` element. SIP
/// clients carry a real registration password; voicemail-only entries
/// (reached via a group's or DID's voicemail box, never directly
/// registered) carry the `NO_SIP_AUTH` sentinel (§4.2), which FreeSWITCH
/// treats as "never matches a registration attempt".
#[derive(Debug, Clone)]
pub struct DirectoryUser {
    pub id: String,
    pub password: String,
    pub vm_password: Option<String>,
    pub context: String,
    pub caller_id_name: Option<String>,
    pub caller_id_number: Option<String>,
    pub voicemail_email: Option<String>,
    pub voicemail_mailbox: Option<String>,
}

impl DirectoryUser {
    fn from_sip_client(client: &SipClient) -> Self {
        Self {
            id: client.user_id.clone(),
            password: client.password.clone(),
            vm_password: client.enable_voicemail.then(|| client.voicemail_pin.clone()).flatten(),
            context: "default".to_string(),
            caller_id_name: client.local_caller_id_name.clone(),
            caller_id_number: Some(client.user_id.clone()),
            voicemail_email: client.voicemail_email.clone(),
            voicemail_mailbox: client.enable_voicemail.then(|| client.user_id.clone()),
        }
    }

    fn voicemail_only(box_id: &str) -> Self {
        Self {
            id: box_id.to_string(),
            password: "NO_SIP_AUTH".to_string(),
            vm_password: None,
            context: "default".to_string(),
            caller_id_name: None,
            caller_id_number: None,
            voicemail_email: None,
            voicemail_mailbox: Some(box_id.to_string()),
        }
    }
}

/// Full precedence (§4.2): direct SIP client, then a group voicemail box,
/// then a DID's failover voicemail target.
pub async fn resolve_directory(
    store: &dyn SwitchStore,
    domain: &str,
    user_id: &str,
) -> Result<Option<DirectoryUser>, ResolverError> {
    let tenant = match store.get_tenant_by_domain(domain).await? {
        Some(tenant) => tenant,
        None => return Ok(None),
    };

    if let Some(client) = tenant.find_sip_client(user_id) {
        return Ok(Some(DirectoryUser::from_sip_client(client)));
    }

    Ok(resolve_voicemail_branches(&tenant, user_id))
}

/// The `voicemail-lookup` action (a named supplemented feature): restricts
/// precedence to the group/DID voicemail branches, skipping the direct SIP
/// client, so a lookup explicitly for a mailbox never resolves to a live
/// registration entry.
pub async fn resolve_voicemail_lookup(
    store: &dyn SwitchStore,
    domain: &str,
    box_id: &str,
) -> Result<Option<DirectoryUser>, ResolverError> {
    let tenant = match store.get_tenant_by_domain(domain).await? {
        Some(tenant) => tenant,
        None => return Ok(None),
    };

    Ok(resolve_voicemail_branches(&tenant, box_id))
}

fn resolve_voicemail_branches(tenant: &Tenant, box_id: &str) -> Option<DirectoryUser> {
    if tenant.find_group_by_voicemail_box(box_id).is_some() {
        return Some(DirectoryUser::voicemail_only(box_id));
    }

    let did_has_failover_box = tenant.dids.iter().any(|did| {
        did.failover_routing_type == Some(FailoverRoutingType::DialplanExtension)
            && did
                .failover_routing_target
                .as_deref()
                .and_then(|t| t.strip_prefix("voicemail_"))
                == Some(box_id)
    });
    if did_has_failover_box {
        return Some(DirectoryUser::voicemail_only(box_id));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Did, FailoverRoutingType, Group, GroupMember, GroupStrategy, GroupType, RoutingType};
    use crate::store::fixture::FixtureStore;

    fn tenant_with_sip_client() -> Tenant {
        let mut tenant = Tenant {
            domain_name: "a.example".into(),
            ..Default::default()
        };
        tenant.sip_clients.push(SipClient {
            user_id: "1001".into(),
            password: "secret".into(),
            display_name: None,
            enable_voicemail: true,
            voicemail_pin: Some("4321".into()),
            voicemail_email: Some("jane@a.example".into()),
            no_answer_timeout: None,
            local_caller_id_name: Some("Jane".into()),
        });
        tenant
    }

    #[tokio::test]
    async fn direct_sip_client_resolves_with_password_and_voicemail() {
        let store = FixtureStore::new().with_tenant(tenant_with_sip_client());
        let user = resolve_directory(&store, "a.example", "1001").await.unwrap().unwrap();
        assert_eq!(user.password, "secret");
        assert_eq!(user.vm_password.as_deref(), Some("4321"));
        assert_eq!(user.voicemail_mailbox.as_deref(), Some("1001"));
    }

    #[tokio::test]
    async fn group_voicemail_box_resolves_without_a_password() {
        let mut tenant = Tenant {
            domain_name: "a.example".into(),
            ..Default::default()
        };
        tenant.groups.push(Group {
            name: "sales".into(),
            group_type: GroupType::Ring,
            timeout: None,
            members: vec![GroupMember { user_id: "1001".into(), order: 0 }],
            strategy: GroupStrategy::Simultaneous,
            voicemail_box_id: Some("sales_vm".into()),
            no_answer_action: None,
        });
        let store = FixtureStore::new().with_tenant(tenant);

        let user = resolve_directory(&store, "a.example", "sales_vm").await.unwrap().unwrap();
        assert_eq!(user.password, "NO_SIP_AUTH");
        assert_eq!(user.voicemail_mailbox.as_deref(), Some("sales_vm"));
    }

    #[tokio::test]
    async fn did_failover_voicemail_box_resolves() {
        let mut tenant = Tenant {
            domain_name: "a.example".into(),
            ..Default::default()
        };
        tenant.dids.push(Did {
            did_number: "+15125551234".into(),
            active: true,
            routing_type: RoutingType::Extension,
            routing_target: "1001".into(),
            failover_routing_type: Some(FailoverRoutingType::DialplanExtension),
            failover_routing_target: Some("voicemail_1001".into()),
        });
        let store = FixtureStore::new().with_tenant(tenant);

        let user = resolve_directory(&store, "a.example", "1001").await.unwrap().unwrap();
        assert_eq!(user.voicemail_mailbox.as_deref(), Some("1001"));
    }

    #[tokio::test]
    async fn voicemail_lookup_action_skips_direct_sip_client() {
        let store = FixtureStore::new().with_tenant(tenant_with_sip_client());
        let user = resolve_voicemail_lookup(&store, "a.example", "1001").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn unknown_user_is_none() {
        let store = FixtureStore::new().with_tenant(tenant_with_sip_client());
        let user = resolve_directory(&store, "a.example", "9999").await.unwrap();
        assert!(user.is_none());
    }
}
