pub mod gateway;
pub mod program;
pub mod request_vars;
pub mod tenant;

pub use gateway::Gateway;
pub use program::{Action, ExtensionProgram};
pub use request_vars::CallVars;
pub use tenant::{
    Did, FailoverRoutingType, Group, GroupMember, GroupStrategy, GroupType, RoutingType, SipClient,
    Tenant,
};
