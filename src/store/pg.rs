//! Postgres-backed `SwitchStore`, grounded on the teacher's
//! `server::db::mod::init_pool` / query-module style: a thin `sqlx::PgPool`
//! wrapper, one query per operation, `query_as` into a `#[derive(FromRow)]`
//! struct.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::error::StoreError;
use crate::models::gateway::Gateway;
use crate::models::tenant::{Tenant, TenantRow};

use super::SwitchStore;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SwitchStore for PgStore {
    async fn get_tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>, StoreError> {
        let row = sqlx::query_as::<_, TenantRow>(
            r#"SELECT domain_name, document FROM tenants WHERE domain_name = $1"#,
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.document))
    }

    async fn get_tenant_and_did_by_did_number(
        &self,
        did_number: &str,
    ) -> Result<Option<Tenant>, StoreError> {
        // The DID array is embedded in the tenant document; unnest it so
        // the "active DID exists" filter runs in the database rather than
        // requiring every tenant to be pulled into the process.
        let row = sqlx::query_as::<_, TenantRow>(
            r#"
            SELECT domain_name, document
            FROM tenants, jsonb_array_elements(document -> 'dids') AS did
            WHERE did ->> 'did_number' = $1
              AND (did ->> 'active')::boolean IS DISTINCT FROM false
            LIMIT 1
            "#,
        )
        .bind(did_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.document))
    }

    async fn get_all_external_gateways(&self) -> Result<Vec<Gateway>, StoreError> {
        let gateways = sqlx::query_as::<_, Gateway>(
            r#"
            SELECT name, realm, username, password, proxy, register,
                   register_transport, secure_media, dtmf_type, codec_prefs
            FROM external_gateways
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(gateways)
    }
}
