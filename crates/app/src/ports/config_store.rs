//! Configuration store port: persistence of the whole controller snapshot.

use std::future::Future;

use climahub_domain::error::ClimaError;
use climahub_domain::snapshot::ConfigSnapshot;

/// Loads and saves the [`ConfigSnapshot`].
///
/// `save` must be atomic from the caller's point of view: a concurrent `load`
/// sees either the previous snapshot or the new one, never a mix.
pub trait ConfigStore {
    /// Load the persisted snapshot, or defaults when nothing was saved yet.
    fn load(&self) -> impl Future<Output = Result<ConfigSnapshot, ClimaError>> + Send;

    /// Replace the persisted snapshot.
    fn save(
        &self,
        snapshot: &ConfigSnapshot,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send;
}

impl<T: ConfigStore + Send + Sync> ConfigStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<ConfigSnapshot, ClimaError>> + Send {
        (**self).load()
    }

    fn save(
        &self,
        snapshot: &ConfigSnapshot,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        (**self).save(snapshot)
    }
}
