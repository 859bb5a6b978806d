//! Record Validation Service - Re-checks stored records against the schema

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, instrument, warn};

use crate::application::ports::outbound::{RecordStorePort, SchemaIssue, SchemaValidatorPort};

/// Validation outcome for one stored record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordCheck {
    pub path: PathBuf,
    /// Empty when the record is valid
    pub issues: Vec<SchemaIssue>,
}

impl RecordCheck {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

pub struct RecordValidationService<S: RecordStorePort, V: SchemaValidatorPort> {
    store: S,
    validator: V,
}

impl<S: RecordStorePort, V: SchemaValidatorPort> RecordValidationService<S, V> {
    pub fn new(store: S, validator: V) -> Self {
        Self { store, validator }
    }

    /// Validate every stored record, in path order
    #[instrument(skip(self))]
    pub async fn validate_all(&self) -> Result<Vec<RecordCheck>> {
        let mut checks = Vec::new();

        for path in self.store.list_records().await? {
            let issues = match self.store.load_record(&path).await {
                Ok(value) => match self.validator.validate(&value) {
                    Ok(()) => Vec::new(),
                    Err(violation) => violation.issues,
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Unreadable record");
                    vec![SchemaIssue {
                        path: String::new(),
                        message: format!("{:#}", e),
                    }]
                }
            };
            checks.push(RecordCheck { path, issues });
        }

        let failed = checks.iter().filter(|c| !c.is_valid()).count();
        info!(checked = checks.len(), failed, "Validated stored records");
        Ok(checks)
    }
}
