//! GDPR data-exclusion configuration.
//!
//! # Responsibility
//! - Describe which models, and which of their fields, are left out of
//!   personal-data exports and anonymization.
//!
//! # Invariants
//! - Model and field names are identifiers (`[A-Za-z_][A-Za-z0-9_]*`,
//!   dotted package prefixes allowed for models).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type DataToExcludeConfigId = Uuid;

static MODEL_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid model regex")
});
static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field regex"));

/// Fully qualified model name, e.g. `com.acme.hr.Employee`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetaModel(pub String);

impl MetaModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        self.0.as_str()
    }
}

/// Field of a [`MetaModel`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetaField {
    pub model: MetaModel,
    pub name: String,
}

/// Config validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GdprConfigError {
    InvalidModelName(String),
    InvalidFieldName(String),
    /// Field declared on a different model than the config targets.
    FieldModelMismatch { field: String, model: String },
    DuplicateFieldName(String),
}

impl Display for GdprConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidModelName(name) => write!(f, "invalid model name `{name}`"),
            Self::InvalidFieldName(name) => write!(f, "invalid field name `{name}`"),
            Self::FieldModelMismatch { field, model } => {
                write!(f, "field `{field}` does not belong to model `{model}`")
            }
            Self::DuplicateFieldName(name) => write!(f, "field `{name}` is listed twice"),
        }
    }
}

impl Error for GdprConfigError {}

/// One exclusion rule: a model and the subset of its fields to skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataToExcludeConfig {
    pub uuid: DataToExcludeConfigId,
    pub model: MetaModel,
    pub fields: Vec<MetaField>,
}

impl DataToExcludeConfig {
    /// Builds a config for `model` excluding `field_names`.
    pub fn new<I, S>(model: MetaModel, field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = field_names
            .into_iter()
            .map(|name| MetaField {
                model: model.clone(),
                name: name.into(),
            })
            .collect();
        Self {
            uuid: Uuid::new_v4(),
            model,
            fields,
        }
    }

    pub fn validate(&self) -> Result<(), GdprConfigError> {
        if !MODEL_NAME_RE.is_match(self.model.name()) {
            return Err(GdprConfigError::InvalidModelName(self.model.0.clone()));
        }
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !FIELD_NAME_RE.is_match(&field.name) {
                return Err(GdprConfigError::InvalidFieldName(field.name.clone()));
            }
            if field.model != self.model {
                return Err(GdprConfigError::FieldModelMismatch {
                    field: field.name.clone(),
                    model: self.model.0.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(GdprConfigError::DuplicateFieldName(field.name.clone()));
            }
        }
        Ok(())
    }
}
