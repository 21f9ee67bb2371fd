//! The administrative REST CRUD surface's business logic (uniqueness
//! enforcement, validation) lives outside this crate — tenants and
//! gateways are "treated as external collaborators" (§1). This module
//! documents the read-side contract the admin UI's index view would use,
//! against the same `tenants` table the dialplan resolver reads.
#![allow(dead_code)]

use chrono::{DateTime, Utc};

use crate::error::{AdminError, StoreError};
use crate::store::PgStore;

#[derive(Debug, Clone, serde::Serialize)]
pub struct TenantSummary {
    pub domain_name: String,
    pub updated_at: DateTime<Utc>,
}

/// Lists tenants for an admin index view, most recently updated first.
/// Creation, renaming, and deletion are out of scope here (§1, Non-goals).
pub async fn list_tenant_summaries(store: &PgStore) -> Result<Vec<TenantSummary>, AdminError> {
    let rows: Vec<(String, DateTime<Utc>)> =
        sqlx::query_as("SELECT domain_name, updated_at FROM tenants ORDER BY updated_at DESC")
            .fetch_all(store.pool())
            .await
            .map_err(StoreError::from)?;

    Ok(rows
        .into_iter()
        .map(|(domain_name, updated_at)| TenantSummary { domain_name, updated_at })
        .collect())
}
