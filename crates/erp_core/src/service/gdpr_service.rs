//! GDPR data-exclusion lookups.
//!
//! Pure functions over loaded configs; `GdprService` adds repository access.

use crate::model::gdpr::{DataToExcludeConfig, DataToExcludeConfigId, MetaField, MetaModel};
use crate::repo::gdpr_repo::GdprRepository;
use crate::repo::RepoResult;

/// Whether any config targets `model`.
pub fn is_model_excluded(configs: &[DataToExcludeConfig], model: &MetaModel) -> bool {
    configs.iter().any(|config| &config.model == model)
}

/// Fields excluded for `model`, across every config targeting it, in config order.
pub fn fields_to_exclude(configs: &[DataToExcludeConfig], model: &MetaModel) -> Vec<MetaField> {
    configs
        .iter()
        .filter(|config| &config.model == model)
        .flat_map(|config| config.fields.iter().cloned())
        .collect()
}

/// Exclusion lookups over stored configs.
pub struct GdprService<R: GdprRepository> {
    repo: R,
}

impl<R: GdprRepository> GdprService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores one exclusion config.
    pub fn add_config(&mut self, config: &DataToExcludeConfig) -> RepoResult<DataToExcludeConfigId> {
        self.repo.create_config(config)
    }

    /// Whether any stored config targets `model`.
    pub fn is_model_excluded(&self, model: &MetaModel) -> RepoResult<bool> {
        Ok(is_model_excluded(&self.repo.list_configs()?, model))
    }

    /// Fields excluded for `model` across stored configs.
    pub fn fields_to_exclude(&self, model: &MetaModel) -> RepoResult<Vec<MetaField>> {
        Ok(fields_to_exclude(&self.repo.list_configs()?, model))
    }
}
