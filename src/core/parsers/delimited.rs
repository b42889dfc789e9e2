use crate::domain::model::{FieldMap, FieldValue};
use crate::domain::ports::FormatParser;
use crate::utils::error::{IngestError, Result};
use csv::ReaderBuilder;

pub const DEFAULT_DELIMITER: u8 = b',';

/// Header row first, then one record per line split on a single delimiter.
///
/// Quote characters are stripped rather than interpreted, so a quoted cell
/// containing the delimiter is still split.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedParser {
    delimiter: u8,
}

impl DelimitedParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn comma() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }

    pub fn tab() -> Self {
        Self::new(b'\t')
    }
}

impl Default for DelimitedParser {
    fn default() -> Self {
        Self::comma()
    }
}

fn clean_cell(cell: &str) -> String {
    cell.replace('"', "").trim().to_string()
}

fn blank_record(headers: &[String]) -> FieldMap {
    headers
        .iter()
        .map(|header| (header.clone(), FieldValue::Text(String::new())))
        .collect()
}

fn decode_error(e: csv::Error) -> IngestError {
    IngestError::format(format!("Invalid delimited text: {}", e))
}

impl FormatParser for DelimitedParser {
    fn parse(&self, raw: &[u8]) -> Result<Vec<FieldMap>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quoting(false)
            .has_headers(true)
            .flexible(true) // 允許行長度不一致
            .from_reader(raw);

        let header_row = reader.headers().map_err(decode_error)?;
        let mut last_line = header_row.position().map_or(1, |pos| pos.line());
        let headers: Vec<String> = header_row.iter().map(clean_cell).collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(decode_error)?;

            // csv 會略過空白行；中間的空白行仍算一筆全空的紀錄，保持列號一致
            if let Some(line) = row.position().map(|pos| pos.line()) {
                for _ in last_line + 1..line {
                    records.push(blank_record(&headers));
                }
                last_line = line;
            }

            let mut record = FieldMap::with_capacity(headers.len());

            for (idx, header) in headers.iter().enumerate() {
                // 缺少的尾端欄位補空字串
                let cell = row.get(idx).map(clean_cell).unwrap_or_default();
                record.insert(header.clone(), FieldValue::coerce(&cell));
            }

            records.push(record);
        }

        tracing::debug!(
            "Parsed {} delimited records with {} columns",
            records.len(),
            headers.len()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_parse_header_and_rows() {
        let raw = "sku,name,price\nA1,Widget,9.99\nA2,,5.00";
        let records = DelimitedParser::comma().parse(raw.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("sku"), Some(&text("A1")));
        assert_eq!(records[0].get("price"), Some(&FieldValue::Number(9.99)));
        assert_eq!(records[1].get("name"), Some(&text("")));
        assert_eq!(records[1].get("price"), Some(&FieldValue::Number(5.0)));
    }

    #[test]
    fn test_short_line_fills_missing_headers() {
        let raw = "sku,name,price\nA1";
        let records = DelimitedParser::comma().parse(raw.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 3);
        assert_eq!(records[0].get("name"), Some(&text("")));
        assert_eq!(records[0].get("price"), Some(&text("")));
    }

    #[test]
    fn test_quotes_are_stripped_not_interpreted() {
        let raw = "\"sku\",\"name\",extra\n\"A1\",\"Big, Red\",x";
        let records = DelimitedParser::comma().parse(raw.as_bytes()).unwrap();

        assert_eq!(records[0].get("sku"), Some(&text("A1")));
        // 引號內的分隔符仍會被切開
        assert_eq!(records[0].get("name"), Some(&text("Big")));
        assert_eq!(records[0].get("extra"), Some(&text("Red")));
    }

    #[test]
    fn test_header_only_and_empty_input_yield_no_records() {
        assert!(DelimitedParser::comma().parse(b"sku,name").unwrap().is_empty());
        assert!(DelimitedParser::comma().parse(b"").unwrap().is_empty());
    }

    #[test]
    fn test_crlf_and_tab_delimiter() {
        let raw = "sku\tunits\r\nA1\t 7 \r\n";
        let records = DelimitedParser::tab().parse(raw.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("units"), Some(&FieldValue::Number(7.0)));
    }

    #[test]
    fn test_interior_blank_line_is_an_empty_record() {
        let raw = "sku,name\nA1,Widget\n\nA2,Gadget\n\n";
        let records = DelimitedParser::comma().parse(raw.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].get("sku"), Some(&text("")));
        assert_eq!(records[1].get("name"), Some(&text("")));
        assert_eq!(records[2].get("sku"), Some(&text("A2")));

        let outcome = crate::core::report::validate(&records, crate::RecordKind::Product);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.record_count, 3);
        assert_eq!(outcome.valid_records, 2);
        assert_eq!(
            outcome.errors,
            vec![
                "Row 2: Missing required field 'sku'",
                "Row 2: Missing required field 'name'"
            ]
        );
    }

    #[test]
    fn test_blank_lines_around_crlf_rows() {
        let raw = "sku,units\r\nA1,1\r\n\r\n\r\nA2,2\r\n";
        let records = DelimitedParser::comma().parse(raw.as_bytes()).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[3].get("units"), Some(&FieldValue::Number(2.0)));
    }

    #[test]
    fn test_invalid_utf8_is_format_error() {
        let raw = b"sku,name\nA1,\xff\xfe";
        let err = DelimitedParser::comma().parse(raw).unwrap_err();
        assert!(matches!(err, IngestError::Format { .. }));
    }
}
