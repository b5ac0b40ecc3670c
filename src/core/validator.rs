use crate::domain::report::SchemaViolation;
use crate::utils::error::{EtlError, Result};
use jsonschema::draft7 as schema_draft;
use serde_json::Value;

// Embed schema at compile time
const LOTTERY_RESULT_SCHEMA: &str = include_str!("../../schemas/lottery-result.schema.json");

/// Compiled structural schema for lottery result documents.
///
/// Unknown fields are accepted everywhere; `response.result.data` is an open
/// map whose values must all be prize entries.
pub struct LotterySchema {
    validator: jsonschema::Validator,
}

impl LotterySchema {
    pub fn new() -> Result<Self> {
        let schema: Value = serde_json::from_str(LOTTERY_RESULT_SCHEMA)?;
        let validator =
            schema_draft::new(&schema).map_err(|e| EtlError::SchemaCompileError {
                message: e.to_string(),
            })?;
        Ok(Self { validator })
    }

    pub fn validate(&self, candidate: &Value) -> bool {
        self.validator.is_valid(candidate)
    }

    /// Every schema violation in `candidate`; empty exactly when `validate` passes.
    pub fn violations(&self, candidate: &Value) -> Vec<SchemaViolation> {
        self.validator
            .iter_errors(candidate)
            .map(|error| SchemaViolation {
                instance_path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect()
    }

    pub fn check(&self, candidate: &Value) -> std::result::Result<(), Vec<SchemaViolation>> {
        if self.validate(candidate) {
            return Ok(());
        }
        Err(self.violations(candidate))
    }
}
