use crate::domain::model::{FieldMap, FieldValue};
use crate::domain::ports::FormatParser;
use crate::utils::error::{IngestError, Result};
use serde_json::{Map, Value};

/// A JSON array of objects, or a single object treated as one record.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

fn scalar(value: Value) -> FieldValue {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(FieldValue::Number)
            .unwrap_or_else(|| FieldValue::Text(n.to_string())),
        Value::String(s) => FieldValue::Text(s),
        Value::Bool(b) => FieldValue::Text(b.to_string()),
        Value::Null => FieldValue::Text(String::new()),
        nested => FieldValue::Text(nested.to_string()),
    }
}

fn to_record(object: Map<String, Value>) -> FieldMap {
    object.into_iter().map(|(k, v)| (k, scalar(v))).collect()
}

impl FormatParser for JsonParser {
    fn parse(&self, raw: &[u8]) -> Result<Vec<FieldMap>> {
        let data: Value = serde_json::from_slice(raw)
            .map_err(|e| IngestError::format(format!("Invalid JSON format: {}", e)))?;

        match data {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| match item {
                    Value::Object(obj) => Ok(to_record(obj)),
                    other => Err(IngestError::format(format!(
                        "Invalid JSON format: element {} is not an object (found {})",
                        idx + 1,
                        type_name(&other)
                    ))),
                })
                .collect(),
            // 單一物件視為一筆記錄
            Value::Object(obj) => Ok(vec![to_record(obj)]),
            other => Err(IngestError::format(format!(
                "Invalid JSON format: expected an object or an array of objects, found {}",
                type_name(&other)
            ))),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
