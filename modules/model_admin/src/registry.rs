//! Registered admins, keyed by `app_label.model_name`.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// A named menu group of admins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminGroup {
    pub label: String,
    pub members: Vec<String>,
}

#[derive(Default)]
pub struct AdminRegistry {
    services: BTreeMap<String, Arc<Service>>,
    groups: Vec<AdminGroup>,
}

impl AdminRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one admin. A model may only be registered once.
    pub fn register(&mut self, service: Service) -> Result<Arc<Service>, DomainError> {
        let label = service.label();
        if self.services.contains_key(&label) {
            return Err(DomainError::configuration(format!(
                "{label} is already registered"
            )));
        }
        info!(model = %label, index = service.urls().index_url(), "registered model admin");
        let service = Arc::new(service);
        self.services.insert(label, service.clone());
        Ok(service)
    }

    /// Group already registered admins under one menu label.
    pub fn register_group(&mut self, label: &str, members: &[&str]) -> Result<(), DomainError> {
        if let Some(missing) = members.iter().find(|m| !self.services.contains_key(**m)) {
            return Err(DomainError::configuration(format!(
                "group '{label}' refers to unregistered model {missing}"
            )));
        }
        self.groups.push(AdminGroup {
            label: label.to_owned(),
            members: members.iter().map(|m| (*m).to_owned()).collect(),
        });
        Ok(())
    }

    pub fn get(&self, model: &str) -> Option<&Arc<Service>> {
        self.services.get(model)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Service>> {
        self.services.values()
    }

    pub fn groups(&self) -> &[AdminGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
