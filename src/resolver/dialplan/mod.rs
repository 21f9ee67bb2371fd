//! Dialplan Resolver (§4.1): the single entry point the `dialplan` section
//! of the HTTP handler calls. Always returns a program the switch can
//! execute — never an error (§7).

pub mod classify;
pub mod inbound;
pub mod local;
pub mod normalize;
pub mod outbound;

use crate::cnam::CnamClient;
use crate::config::AppConfig;
use crate::models::{CallVars, ExtensionProgram};
use crate::store::SwitchStore;

use classify::Classification;
use normalize::{domain_from_channel_name, normalize_identifier};

/// Runs classification, the inter-domain guard, outbound-PSTN matching,
/// local dispatch, and inbound-DID handling in the order §4.1 specifies.
pub async fn resolve(
    config: &AppConfig,
    store: &dyn SwitchStore,
    cnam: &CnamClient,
    vars: &CallVars,
) -> ExtensionProgram {
    match classify::classify(vars) {
        Classification::Public => match vars.inbound_did_hint() {
            Some(did_hint) => inbound::resolve_inbound_did(store, cnam, vars, did_hint).await,
            None => ExtensionProgram::no_match("public", ""),
        },
        Classification::Default => resolve_default_context(config, store, vars).await,
        Classification::Other(context) => ExtensionProgram::no_match(&context, vars.destination().unwrap_or("")),
    }
}

async fn resolve_default_context(config: &AppConfig, store: &dyn SwitchStore, vars: &CallVars) -> ExtensionProgram {
    let destination = match vars.destination() {
        Some(d) => d,
        None => return ExtensionProgram::error("default"),
    };

    let domain = match vars.domain() {
        Some(d) => d.to_string(),
        None => match vars.channel_name().and_then(domain_from_channel_name) {
            Some(d) => d.to_string(),
            None => return ExtensionProgram::error("default"),
        },
    };

    let tenant = match store.get_tenant_by_domain(&domain).await {
        Ok(Some(tenant)) => tenant,
        Ok(None) => return ExtensionProgram::no_match("default", destination),
        Err(err) => {
            tracing::error!(error = %err, domain = %domain, "store error resolving tenant by domain");
            return ExtensionProgram::error("default");
        }
    };

    if !inter_domain_guard(vars, &tenant.domain_name) {
        return ExtensionProgram::rejected("default", destination);
    }

    let gateways = match store.get_all_external_gateways().await {
        Ok(gateways) => gateways,
        Err(err) => {
            tracing::error!(error = %err, "store error loading gateway pool");
            Vec::new()
        }
    };

    if let Some(program) = outbound::try_outbound(config, destination, &gateways) {
        return program;
    }

    if let Some(program) = local::dispatch(config, vars, &tenant, destination) {
        return program;
    }

    ExtensionProgram::no_match("default", destination)
}

/// A call whose channel-derived domain doesn't match the tenant it was
/// routed to is rejected outright (§4.1 "Inter-domain guard").
fn inter_domain_guard(vars: &CallVars, tenant_domain: &str) -> bool {
    match vars.channel_name().and_then(domain_from_channel_name) {
        Some(channel_domain) => normalize_identifier(channel_domain) == normalize_identifier(tenant_domain),
        None => true,
    }
}
