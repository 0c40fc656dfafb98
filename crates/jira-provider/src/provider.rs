//! Provider entry point and resource registry.
//!
//! Resource types are registered explicitly when the provider is configured;
//! nothing is wired up by module initialization.

use std::collections::BTreeMap;

use tracing::info;

use crate::client::{AdminClient, JiraClient};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::resources::{
    DynResource, GroupMembershipResource, GroupResource, IssueResource, UserResource,
};

/// Resource types keyed by their registered name.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<&'static str, Box<dyn DynResource>>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource under its type name, replacing any previous entry.
    pub fn register<R: DynResource + 'static>(&mut self, resource: R) {
        let name = resource.type_name();
        if self.resources.insert(name, Box::new(resource)).is_some() {
            info!(resource_type = name, "Replaced registered resource");
        }
    }

    /// Look up a resource by type name.
    ///
    /// # Errors
    /// Returns [`ProviderError::UnknownResource`] for unregistered names.
    pub fn get(&self, type_name: &str) -> Result<&dyn DynResource, ProviderError> {
        self.resources
            .get(type_name)
            .map(|resource| &**resource)
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    /// Registered type names in sorted order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }
}

/// Configured provider holding the API clients and every resource type.
pub struct Provider {
    registry: ResourceRegistry,
}

impl Provider {
    /// Build clients from `config` and register all resource types.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or a client cannot be built.
    pub fn configure(config: &ProviderConfig) -> Result<Self, ProviderError> {
        config.validate()?;

        info!(url = %config.url, "Creating Jira client");
        let jira = JiraClient::from_config(config)?;

        let admin = match &config.token {
            Some(token) => {
                info!("Creating admin client");
                Some(AdminClient::new(token.clone())?)
            }
            None => None,
        };

        Ok(Self::with_clients(jira, admin))
    }

    /// Register all resource types on top of existing clients.
    #[must_use]
    pub fn with_clients(jira: JiraClient, admin: Option<AdminClient>) -> Self {
        let mut registry = ResourceRegistry::new();
        registry.register(IssueResource::new(jira.clone()));
        registry.register(UserResource::new(jira.clone(), admin));
        registry.register(GroupResource::new(jira.clone()));
        registry.register(GroupMembershipResource::new(jira));
        Self { registry }
    }

    /// Look up a registered resource.
    ///
    /// # Errors
    /// Returns [`ProviderError::UnknownResource`] for unregistered names.
    pub fn resource(&self, type_name: &str) -> Result<&dyn DynResource, ProviderError> {
        self.registry.get(type_name)
    }

    /// Registered resource type names.
    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registry.type_names()
    }
}
