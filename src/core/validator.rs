use crate::domain::model::{FieldMap, FieldValue, RecordKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Field rules for one record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    /// Absent or blank is a blocking error.
    pub required: &'static [&'static str],
    /// Absent or blank is a warning.
    pub recommended: &'static [&'static str],
    /// If present and non-blank, must coerce to a number.
    pub numeric: &'static [&'static str],
    /// If present and non-blank, must parse as a calendar date.
    pub dates: &'static [&'static str],
    /// A file with zero records is rejected.
    pub require_records: bool,
}

pub const PRODUCT_SCHEMA: RecordSchema = RecordSchema {
    required: &["sku", "name"],
    recommended: &["category", "price", "cost"],
    numeric: &["price", "cost"],
    dates: &[],
    require_records: false,
};

pub const SALES_SCHEMA: RecordSchema = RecordSchema {
    required: &["sku", "date", "unitsSold", "revenue"],
    recommended: &[],
    numeric: &["unitsSold", "revenue"],
    dates: &["date"],
    require_records: false,
};

pub const GENERIC_SCHEMA: RecordSchema = RecordSchema {
    required: &[],
    recommended: &[],
    numeric: &[],
    dates: &[],
    require_records: true,
};

pub const NO_DATA_ERROR: &str = "No data found in file";

pub fn schema_for(kind: RecordKind) -> &'static RecordSchema {
    match kind {
        RecordKind::Product => &PRODUCT_SCHEMA,
        RecordKind::Sales => &SALES_SCHEMA,
        RecordKind::Generic => &GENERIC_SCHEMA,
    }
}

/// Accumulated findings for a sequence of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCheck {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub valid_records: usize,
}

fn is_missing(value: Option<&FieldValue>) -> bool {
    value.map_or(true, FieldValue::is_blank)
}

/// Calendar dates in the layouts upload files commonly carry.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 6] = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%d %b %Y",
        "%b %d, %Y",
        "%B %d, %Y",
    ];
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Check one record, appending findings. Returns `true` when the record has no blocking error.
fn check_record(
    schema: &RecordSchema,
    row: usize,
    record: &FieldMap,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> bool {
    let errors_before = errors.len();

    for field in schema.required {
        if is_missing(record.get(field)) {
            errors.push(format!("Row {}: Missing required field '{}'", row, field));
        }
    }

    for field in schema.recommended {
        if is_missing(record.get(field)) {
            warnings.push(format!("Row {}: Missing recommended field '{}'", row, field));
        }
    }

    for field in schema.numeric {
        if let Some(value) = record.get(field) {
            if !value.is_blank() && value.as_number().is_none() {
                errors.push(format!("Row {}: Field '{}' must be a number", row, field));
            }
        }
    }

    for field in schema.dates {
        if let Some(value) = record.get(field) {
            if !value.is_blank() && parse_date(&value.to_string()).is_none() {
                errors.push(format!("Row {}: Invalid date format in field '{}'", row, field));
            }
        }
    }

    errors.len() == errors_before
}

/// Validate records against the schema of `kind`. Rows are numbered from 1.
pub fn check(records: &[FieldMap], kind: RecordKind) -> SchemaCheck {
    let schema = schema_for(kind);
    let mut result = SchemaCheck::default();

    if schema.require_records && records.is_empty() {
        result.errors.push(NO_DATA_ERROR.to_string());
        return result;
    }

    for (idx, record) in records.iter().enumerate() {
        if check_record(schema, idx + 1, record, &mut result.errors, &mut result.warnings) {
            result.valid_records += 1;
        }
    }

    result
}
