use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single coerced cell: numeric when the raw text parses fully as a finite number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Coerce raw cell text. Empty or non-numeric text stays text (trimmed).
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        match parse_number(trimmed) {
            Some(n) => FieldValue::Number(n),
            None => FieldValue::Text(trimmed.to_string()),
        }
    }

    /// Blank means an empty or whitespace-only text value.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// The numeric reading of this value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => parse_number(s.trim()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

fn parse_number(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    // f64::from_str 接受 "inf" / "NaN"，這些不算數字
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// One decoded record: header name to coerced value, in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a value. A repeated header replaces the earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Schema family applied during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Product,
    Sales,
    /// Inventory and anything else without a dedicated schema.
    #[serde(alias = "inventory")]
    Generic,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Product => "product",
            RecordKind::Sales => "sales",
            RecordKind::Generic => "generic",
        }
    }

    /// 依檔名猜測資料類型（預設為 product）
    pub fn infer_from_filename(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("sales") || lower.contains("revenue") {
            RecordKind::Sales
        } else if lower.contains("inventory") || lower.contains("stock") {
            RecordKind::Generic
        } else {
            RecordKind::Product
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "product" | "products" => Ok(RecordKind::Product),
            "sales" => Ok(RecordKind::Sales),
            "generic" | "inventory" => Ok(RecordKind::Generic),
            other => Err(format!("Unknown record kind: {}", other)),
        }
    }
}

/// Report for one file. `is_valid` holds iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub record_count: usize,
    pub valid_records: usize,
    pub preview: Vec<FieldMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    pub records_processed: usize,
    pub records_total: usize,
    /// Blocking errors on failure, carried-forward warnings on success.
    pub errors: Vec<String>,
    /// Empty on failure.
    pub source_id: String,
    /// Public URL of the committed file, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_url: Option<String>,
}

impl ImportOutcome {
    pub fn failed(records_total: usize, errors: Vec<String>) -> Self {
        Self {
            success: false,
            records_processed: 0,
            records_total,
            errors,
            source_id: String::new(),
            storage_url: None,
        }
    }
}

/// An uploaded file as handed over by the upload collaborator.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lower-cased suffix after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    pub overwrite: bool,
}

/// Durable reference returned by a blob sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub reachable: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrigin {
    File,
    Api,
    Database,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Active,
    Inactive,
    Error,
    Syncing,
}

/// Data source entry as the presentation layer lists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDescriptor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub origin: SourceOrigin,
    pub source_type: String,
    pub status: SourceStatus,
    pub last_sync: String,
    pub record_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

impl SourceDescriptor {
    /// Descriptor for a successful file import; `None` when the import failed.
    pub fn from_import(file: &UploadedFile, outcome: &ImportOutcome) -> Option<Self> {
        if !outcome.success {
            return None;
        }

        let source_type = match file.extension() {
            Some(ext) if matches!(ext.as_str(), "xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => {
                "excel".to_string()
            }
            // csv、tsv、json 與自訂註冊的格式沿用副檔名
            Some(ext) => ext,
            None => "file".to_string(),
        };

        Some(Self {
            id: outcome.source_id.clone(),
            name: file.name.clone(),
            origin: SourceOrigin::File,
            source_type,
            status: SourceStatus::Active,
            last_sync: chrono::Utc::now().to_rfc3339(),
            record_count: outcome.records_processed,
            file_size: Some(file.size()),
        })
    }
}
