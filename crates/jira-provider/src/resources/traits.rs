//! Resource trait and its type-erased form used by the registry.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

/// A remote object managed through create/read/update/delete.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Persisted state of one instance.
    type State: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Name the resource is registered under (e.g. `jira_issue`).
    const TYPE_NAME: &'static str;

    /// Create the object described by `desired` and return its state.
    async fn create(&self, desired: Self::State) -> Result<Self::State, ProviderError>;

    /// Refresh `prior` from the remote side. `None` means the object is gone.
    async fn read(&self, prior: Self::State) -> Result<Option<Self::State>, ProviderError>;

    /// Apply the difference between `prior` and `desired` in place.
    async fn update(
        &self,
        prior: Self::State,
        desired: Self::State,
    ) -> Result<Self::State, ProviderError>;

    /// Delete the object.
    async fn delete(&self, state: Self::State) -> Result<(), ProviderError>;

    /// Build state for an existing object from its id.
    async fn import(&self, id: &str) -> Result<Self::State, ProviderError>;
}

/// Object-safe view of a [`Resource`] working on JSON state documents.
#[async_trait]
pub trait DynResource: Send + Sync {
    /// Registered type name.
    fn type_name(&self) -> &'static str;

    /// See [`Resource::create`].
    async fn create(&self, desired: Value) -> Result<Value, ProviderError>;

    /// See [`Resource::read`].
    async fn read(&self, prior: Value) -> Result<Option<Value>, ProviderError>;

    /// See [`Resource::update`].
    async fn update(&self, prior: Value, desired: Value) -> Result<Value, ProviderError>;

    /// See [`Resource::delete`].
    async fn delete(&self, state: Value) -> Result<(), ProviderError>;

    /// See [`Resource::import`].
    async fn import(&self, id: &str) -> Result<Value, ProviderError>;
}

#[async_trait]
impl<R: Resource> DynResource for R {
    fn type_name(&self) -> &'static str {
        R::TYPE_NAME
    }

    async fn create(&self, desired: Value) -> Result<Value, ProviderError> {
        let state = Resource::create(self, serde_json::from_value(desired)?).await?;
        Ok(serde_json::to_value(state)?)
    }

    async fn read(&self, prior: Value) -> Result<Option<Value>, ProviderError> {
        match Resource::read(self, serde_json::from_value(prior)?).await? {
            Some(state) => Ok(Some(serde_json::to_value(state)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, prior: Value, desired: Value) -> Result<Value, ProviderError> {
        let state = Resource::update(
            self,
            serde_json::from_value(prior)?,
            serde_json::from_value(desired)?,
        )
        .await?;
        Ok(serde_json::to_value(state)?)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        Resource::delete(self, serde_json::from_value(state)?).await
    }

    async fn import(&self, id: &str) -> Result<Value, ProviderError> {
        Ok(serde_json::to_value(Resource::import(self, id).await?)?)
    }
}
