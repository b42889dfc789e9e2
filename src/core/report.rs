use crate::core::validator;
use crate::domain::model::{FieldMap, RecordKind, ValidationOutcome};

/// Number of records echoed back in a report preview.
pub const PREVIEW_LIMIT: usize = 5;

/// Validate `records` as `kind` and assemble the file-level report.
pub fn validate(records: &[FieldMap], kind: RecordKind) -> ValidationOutcome {
    let check = validator::check(records, kind);

    ValidationOutcome {
        is_valid: check.errors.is_empty(),
        errors: check.errors,
        warnings: check.warnings,
        record_count: records.len(),
        valid_records: check.valid_records,
        preview: records.iter().take(PREVIEW_LIMIT).cloned().collect(),
    }
}
