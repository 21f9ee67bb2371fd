//! The global gateway (trunk) pool — a separate aggregate from Tenant (§3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DtmfType {
    Rfc2833,
    Info,
    Inband,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Gateway {
    pub name: String,
    pub realm: String,
    pub username: String,
    pub password: String,
    pub proxy: String,
    #[serde(default)]
    pub register: bool,
    #[serde(default)]
    pub register_transport: Option<String>,
    /// Optional secure-media mode (e.g. `"sdes"`, `"dtls:srtp"`), emitted as
    /// a `secure-media` param when present (§4.3).
    #[serde(default)]
    pub secure_media: Option<String>,
    #[sqlx(json)]
    pub dtmf_type: DtmfType,
    #[sqlx(json)]
    pub codec_prefs: Vec<String>,
}
