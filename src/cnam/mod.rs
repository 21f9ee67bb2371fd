//! CNAM Enrichment Client (§4.5), grounded on the teacher's
//! `server::telnyx::TelnyxClient`: a `reqwest::Client` wrapper with a typed
//! error enum and JSON (de)serialization, except every failure here
//! resolves to `None` rather than propagating — CNAM is best-effort.

use serde::Deserialize;
use std::time::Duration;

use crate::config::CnamConfig;
use crate::error::CnamError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnamRecord {
    pub national_number_formatted: String,
    pub caller_id: String,
    pub location: String,
}

#[derive(Clone)]
pub struct CnamClient {
    client: reqwest::Client,
    config: Option<CnamConfig>,
    timeout: Duration,
}

impl CnamClient {
    /// Builds a disabled client when credentials are missing, matching
    /// §6's "missing CNAM credentials disable enrichment without failing
    /// startup".
    pub fn from_config(config: &CnamConfig, timeout: Duration) -> Self {
        let config = config.is_configured().then(|| config.clone());
        Self {
            client: reqwest::Client::new(),
            config,
            timeout,
        }
    }

    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            config: None,
            timeout: Duration::from_secs(1),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Looks up `number` and returns `None` on anything short of a clean
    /// 2xx response with the fields we need — timeouts, non-2xx status, and
    /// missing fields are all silently swallowed (§4.5, §7).
    pub async fn lookup(&self, number: &str) -> Option<CnamRecord> {
        let config = self.config.as_ref()?;
        let normalized = normalize_number(number);

        match self.lookup_inner(config, &normalized).await {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::debug!(error = %err, number = %normalized, "cnam lookup failed, proceeding without enrichment");
                None
            }
        }
    }

    async fn lookup_inner(&self, config: &CnamConfig, number: &str) -> Result<CnamRecord, CnamError> {
        let url = format!(
            "https://{}/v1/projects/{}/phone_numbers/{}",
            config.space_host, config.project_id, number
        );

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .get(&url)
                .bearer_auth(&config.api_token)
                .send(),
        )
        .await
        .map_err(|_| CnamError::Timeout)??;

        if !response.status().is_success() {
            return Err(CnamError::MalformedResponse);
        }

        let body: CnamLookupResponse = response.json().await?;
        let national_number_formatted = body.national_number_formatted.ok_or(CnamError::MalformedResponse)?;
        let caller_id = body.cnam.and_then(|c| c.caller_id).ok_or(CnamError::MalformedResponse)?;
        let location = body.location.unwrap_or_default();

        Ok(CnamRecord {
            national_number_formatted,
            caller_id,
            location,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CnamLookupResponse {
    national_number_formatted: Option<String>,
    #[serde(default)]
    cnam: Option<CnamField>,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CnamField {
    caller_id: Option<String>,
}

/// A 10-digit input gets a leading `+1` (§4.5); anything else passes
/// through unchanged.
pub fn normalize_number(number: &str) -> String {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("+1{digits}")
    } else {
        number.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_bare_ten_digit_numbers() {
        assert_eq!(normalize_number("5125551234"), "+15125551234");
    }

    #[test]
    fn leaves_already_formatted_numbers_alone() {
        assert_eq!(normalize_number("+15125551234"), "+15125551234");
    }

    #[tokio::test]
    async fn disabled_client_never_calls_out() {
        let client = CnamClient::disabled();
        assert!(!client.is_enabled());
        assert_eq!(client.lookup("5125551234").await, None);
    }
}
