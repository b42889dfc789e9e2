use crate::domain::model::{FieldMap, FieldValue};
use crate::domain::ports::FormatParser;
use crate::utils::error::{IngestError, Result};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use std::io::Cursor;

/// Reads the first worksheet of an Excel/ODS workbook. Row one is the header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetParser;

fn cell_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Int(i) => FieldValue::Number(*i as f64),
        Data::Float(f) => FieldValue::Number(*f),
        Data::String(s) => FieldValue::coerce(s),
        Data::Empty => FieldValue::Text(String::new()),
        // 日期儲存格轉成 ISO 日期字串，方便後續日期驗證
        Data::DateTime(_) => cell
            .as_date()
            .map(|d| FieldValue::Text(d.format("%Y-%m-%d").to_string()))
            .unwrap_or_else(|| FieldValue::coerce(&cell.to_string())),
        other => FieldValue::coerce(&other.to_string()),
    }
}

impl FormatParser for SpreadsheetParser {
    fn parse(&self, raw: &[u8]) -> Result<Vec<FieldMap>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(raw.to_vec()))
            .map_err(|e| IngestError::format(format!("Invalid spreadsheet: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| IngestError::format("Invalid spreadsheet: workbook has no worksheets"))?
            .map_err(|e| IngestError::format(format!("Invalid spreadsheet: {}", e)))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => return Ok(Vec::new()),
        };

        let mut records = Vec::new();
        for data_row in rows {
            // 跳過完全空白的行
            if data_row.iter().all(|cell| matches!(cell, Data::Empty)) {
                continue;
            }

            let mut record = FieldMap::with_capacity(headers.len());
            for (idx, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                let value = data_row
                    .get(idx)
                    .map(cell_value)
                    .unwrap_or_else(|| FieldValue::Text(String::new()));
                record.insert(header.clone(), value);
            }
            records.push(record);
        }

        tracing::debug!("Parsed {} spreadsheet records", records.len());
        Ok(records)
    }
}
