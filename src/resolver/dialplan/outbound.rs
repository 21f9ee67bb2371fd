//! Outbound PSTN matching (§4.1 "Outbound PSTN").

use crate::config::AppConfig;
use crate::models::program::anchored;
use crate::models::{Action, ExtensionProgram, Gateway};

use super::normalize::match_ten_digit_nanp;

/// If `destination` matches the 10-digit NANP shape and a gateway is
/// available, returns the bridge-to-trunk program. Returns `None` if the
/// shape doesn't match or the gateway pool is empty, in which case the
/// caller continues on to local dispatch then fallback (§4.1).
///
/// The dial string names the selected gateway directly —
/// `sofia/gateway/<gateway-name>/<number>` — per the worked example in §8
/// scenario 4, where a pool containing only `sw1` yields
/// `sofia/gateway/sw1/+15125559999`.
pub fn try_outbound(_config: &AppConfig, destination: &str, gateways: &[Gateway]) -> Option<ExtensionProgram> {
    let national_number = match_ten_digit_nanp(destination)?;
    let gateway = gateways.first()?;
    let reformatted = format!("+1{national_number}");

    Some(
        ExtensionProgram::new("default", "outbound-pstn")
            .with_condition("destination_number", &anchored(destination))
            .push(Action::new(
                "bridge",
                format!("sofia/gateway/{}/{}", gateway.name, reformatted),
            ))
            .push(Action::new("playback", "ivr/ivr-call_cannot_be_completed_as_dialed.wav"))
            .push(Action::bare("hangup")),
    )
}
