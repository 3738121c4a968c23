use std::sync::Arc;

use crate::contract::{
    client::{ModelAdminApi, TreeParams},
    error::ModelAdminError,
    model::{ChangeList, NewRecord, Record, User},
};
use crate::domain::service::Service;
use crate::registry::AdminRegistry;

/// Local implementation of [`ModelAdminApi`] that delegates to the
/// registered domain services.
pub struct ModelAdminLocalClient {
    registry: Arc<AdminRegistry>,
}

impl ModelAdminLocalClient {
    pub fn new(registry: Arc<AdminRegistry>) -> Self {
        Self { registry }
    }

    fn service(&self, model: &str) -> Result<&Arc<Service>, ModelAdminError> {
        self.registry
            .get(model)
            .ok_or_else(|| ModelAdminError::unknown_model(model))
    }
}

impl ModelAdminApi for ModelAdminLocalClient {
    fn changelist(
        &self,
        model: &str,
        user: &User,
        params: &[(String, String)],
    ) -> Result<ChangeList, ModelAdminError> {
        Ok(self.service(model)?.list(user, params)?)
    }

    fn create(
        &self,
        model: &str,
        user: &User,
        record: NewRecord,
        tree: TreeParams,
    ) -> Result<Record, ModelAdminError> {
        Ok(self.service(model)?.create(user, record, tree)?)
    }

    fn inspect(&self, model: &str, user: &User, pk: &str) -> Result<Record, ModelAdminError> {
        Ok(self.service(model)?.inspect(user, pk)?)
    }
}
