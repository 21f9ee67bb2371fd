//! Configuration Resolver (§4.3): the only recognized key is the SIP
//! profile request; anything else gets the standard not-found document.

use crate::config::AppConfig;
use crate::error::ResolverError;
use crate::store::SwitchStore;
use crate::xml::configuration::{emit_not_found, emit_sip_profiles};

/// The `keyvalue`/`key_value` the switch sends for its `sofia.conf` lookup
/// at startup and reload.
const SIP_PROFILE_KEY: &str = "sip.conf";

pub async fn resolve_configuration(
    config: &AppConfig,
    store: &dyn SwitchStore,
    key_name: Option<&str>,
) -> Result<String, ResolverError> {
    if key_name != Some(SIP_PROFILE_KEY) {
        return Ok(emit_not_found());
    }

    let gateways = store.get_all_external_gateways().await?;
    Ok(emit_sip_profiles(&config.outbound_gateway_profile, &gateways))
}
