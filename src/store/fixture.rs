//! In-memory `SwitchStore` used by resolver tests so routing logic can be
//! exercised without a database, matching the trait-based storage
//! abstraction the teacher uses for `RecordingStorage` (multiple backends
//! behind one trait).

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::models::{Gateway, Tenant};

use super::SwitchStore;

#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    tenants: HashMap<String, Tenant>,
    gateways: Vec<Gateway>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, tenant: Tenant) -> Self {
        self.tenants.insert(tenant.domain_name.clone(), tenant);
        self
    }

    pub fn with_gateway(mut self, gateway: Gateway) -> Self {
        self.gateways.push(gateway);
        self
    }
}

#[async_trait]
impl SwitchStore for FixtureStore {
    async fn get_tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>, StoreError> {
        Ok(self.tenants.get(domain).cloned())
    }

    async fn get_tenant_and_did_by_did_number(
        &self,
        did_number: &str,
    ) -> Result<Option<Tenant>, StoreError> {
        Ok(self
            .tenants
            .values()
            .find(|t| {
                t.dids
                    .iter()
                    .any(|d| d.active && d.did_number == did_number)
            })
            .cloned())
    }

    async fn get_all_external_gateways(&self) -> Result<Vec<Gateway>, StoreError> {
        Ok(self.gateways.clone())
    }
}
