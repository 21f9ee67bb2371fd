//! The Tenant aggregate and its embedded child entities (§3 of the spec).
//!
//! A tenant is persisted as a single JSONB document (see `migrations/`):
//! the embedded arrays (`sip_clients`, `groups`, `dids`, `dialplan.default`)
//! round-trip through `serde_json` as plain `Vec`s, which preserves
//! insertion order the way the spec's routing-precedence invariant requires
//! — a relational join with no explicit `ORDER BY` would not.

use serde::{Deserialize, Serialize};

use super::program::Action;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TenantRow {
    pub domain_name: String,
    #[sqlx(json)]
    pub document: Tenant,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tenant {
    pub domain_name: String,
    #[serde(default)]
    pub profile: TenantProfile,
    #[serde(default)]
    pub sip_clients: Vec<SipClient>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub dids: Vec<Did>,
    #[serde(default)]
    pub dialplan: Dialplan,
}

impl Tenant {
    pub fn find_sip_client(&self, user_id: &str) -> Option<&SipClient> {
        self.sip_clients.iter().find(|c| c.user_id == user_id)
    }

    pub fn find_group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn find_group_by_voicemail_box(&self, box_id: &str) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.voicemail_box_id.as_deref() == Some(box_id))
    }

    pub fn find_did(&self, did_number: &str) -> Option<&Did> {
        self.dids.iter().find(|d| d.did_number == did_number)
    }

    /// First matching dialplan entry whose condition field targets the
    /// destination number, in declared (insertion) order — §4.1 rule 3.
    pub fn dialplan_entries(&self) -> &[DialplanExtension] {
        &self.dialplan.default
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dialplan {
    #[serde(default)]
    pub default: Vec<DialplanExtension>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipClient {
    pub user_id: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub enable_voicemail: bool,
    #[serde(default)]
    pub voicemail_pin: Option<String>,
    #[serde(default)]
    pub voicemail_email: Option<String>,
    #[serde(default)]
    pub no_answer_timeout: Option<u32>,
    #[serde(default)]
    pub local_caller_id_name: Option<String>,
}

impl SipClient {
    pub const DEFAULT_NO_ANSWER_TIMEOUT: u32 = 30;

    pub fn no_answer_timeout(&self) -> u32 {
        self.no_answer_timeout.unwrap_or(Self::DEFAULT_NO_ANSWER_TIMEOUT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Hunt,
    Ring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStrategy {
    Sequential,
    Simultaneous,
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: String,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(default)]
    pub members: Vec<GroupMember>,
    pub strategy: GroupStrategy,
    #[serde(default)]
    pub voicemail_box_id: Option<String>,
    #[serde(default)]
    pub no_answer_action: Option<Action>,
}

impl Group {
    /// Members in declared order, regardless of the `order` field's values
    /// — the spec's ordering invariant is insertion order, `order` is
    /// caller-supplied metadata only.
    pub fn ordered_members(&self) -> impl Iterator<Item = &GroupMember> {
        self.members.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingType {
    Extension,
    Group,
    Ivr,
    ExternalNumber,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailoverRoutingType {
    DialplanExtension,
    ExternalNumber,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Did {
    pub did_number: String,
    #[serde(default = "default_active")]
    pub active: bool,
    pub routing_type: RoutingType,
    pub routing_target: String,
    #[serde(default)]
    pub failover_routing_type: Option<FailoverRoutingType>,
    #[serde(default)]
    pub failover_routing_target: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialplanExtension {
    pub name: String,
    pub condition_field: String,
    pub condition_expression: String,
    pub actions: Vec<Action>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_lookups_respect_insertion_order() {
        let tenant = Tenant {
            domain_name: "a.example".into(),
            sip_clients: vec![
                SipClient {
                    user_id: "1001".into(),
                    password: "p".into(),
                    display_name: None,
                    enable_voicemail: false,
                    voicemail_pin: None,
                    voicemail_email: None,
                    no_answer_timeout: None,
                    local_caller_id_name: None,
                },
                SipClient {
                    user_id: "1002".into(),
                    password: "q".into(),
                    display_name: None,
                    enable_voicemail: false,
                    voicemail_pin: None,
                    voicemail_email: None,
                    no_answer_timeout: None,
                    local_caller_id_name: None,
                },
            ],
            ..Default::default()
        };

        assert_eq!(tenant.find_sip_client("1002").unwrap().password, "q");
        assert!(tenant.find_sip_client("9999").is_none());
    }

    #[test]
    fn no_answer_timeout_defaults_to_30() {
        let client = SipClient {
            user_id: "1001".into(),
            password: "p".into(),
            display_name: None,
            enable_voicemail: false,
            voicemail_pin: None,
            voicemail_email: None,
            no_answer_timeout: None,
            local_caller_id_name: None,
        };
        assert_eq!(client.no_answer_timeout(), 30);
    }
}
