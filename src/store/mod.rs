//! Data Store Adapter (§4.6). Read access to tenant documents and the
//! global gateway pool; the dialplan path is read-only end to end.
//!
//! Trait-based storage abstraction, grounded on the teacher's
//! `RecordingStorage` trait: a `SwitchStore` implementor can be a real
//! Postgres-backed store or, in tests, an in-memory fixture, so resolver
//! logic never needs a database to exercise.

pub mod fixture;
pub mod pg;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Gateway, Tenant};

/// Writes live entirely in the (out-of-scope, §1) admin REST surface; this
/// trait only exposes the reads the core resolvers need (§4.6).
#[async_trait]
pub trait SwitchStore: Send + Sync {
    async fn get_tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>, StoreError>;

    /// Matches only active DIDs (§4.6).
    async fn get_tenant_and_did_by_did_number(
        &self,
        did_number: &str,
    ) -> Result<Option<Tenant>, StoreError>;

    async fn get_all_external_gateways(&self) -> Result<Vec<Gateway>, StoreError>;

    async fn find_sip_client(
        &self,
        domain: &str,
        user_id: &str,
    ) -> Result<Option<crate::models::SipClient>, StoreError> {
        Ok(self
            .get_tenant_by_domain(domain)
            .await?
            .and_then(|t| t.find_sip_client(user_id).cloned()))
    }
}

pub use pg::PgStore;
