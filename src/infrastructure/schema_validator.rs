//! JSON Schema validator adapter (draft 2020-12)

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use jsonschema::{Draft, Validator};
use serde_json::Value;
use tracing::warn;

use crate::application::ports::outbound::{SchemaIssue, SchemaValidatorPort, SchemaViolation};

/// Record schema compiled into the binary
pub const EMBEDDED_SCHEMA: &str = include_str!("../../schemas/dcc-record.schema.json");

#[derive(Debug, thiserror::Error)]
pub enum SchemaLoadError {
    #[error("Failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Schema could not be compiled: {0}")]
    Invalid(String),
}

pub struct JsonSchemaValidator {
    schema: Value,
    validator: Validator,
}

impl JsonSchemaValidator {
    pub fn new(schema: Value) -> Result<Self, SchemaLoadError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|e| SchemaLoadError::Invalid(e.to_string()))?;
        Ok(Self { schema, validator })
    }

    pub fn embedded() -> Result<Self, SchemaLoadError> {
        Self::new(serde_json::from_str(EMBEDDED_SCHEMA)?)
    }

    /// Load the schema file, falling back to the embedded copy when it is absent
    pub fn from_path(path: &Path) -> Result<Self, SchemaLoadError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::new(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Schema file missing, using embedded schema");
                Self::embedded()
            }
            Err(source) => Err(SchemaLoadError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl SchemaValidatorPort for JsonSchemaValidator {
    fn schema(&self) -> &Value {
        &self.schema
    }

    fn validate(&self, record: &Value) -> Result<(), SchemaViolation> {
        let mut issues: Vec<SchemaIssue> = self
            .validator
            .iter_errors(record)
            .map(|err| SchemaIssue {
                path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();
        issues.sort_by(|a, b| a.path.cmp(&b.path));

        match SchemaViolation::from_issues(issues) {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }
}
