//! Row codec: typed cell generation and the sheetData rewrite pass

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::Value;

use crate::error::RenderError;
use crate::normalize::Record;
use crate::range::column_letters;
use crate::schema::TableKind;

/// A synthesized cell, ready for markup emission.
#[derive(Debug, Clone, PartialEq)]
pub enum CellData {
    Number(f64),
    Text(String),
}

/// Build schema-ordered cell rows for a table.
///
/// A numeric column whose value parses as a number becomes a numeric cell;
/// everything else becomes a text cell holding the literal string form of the
/// value (empty for absent/null, and for numeric columns that fail to parse).
pub fn build_rows(records: &[Record], kind: TableKind) -> Vec<Vec<CellData>> {
    let fields = kind.fields();

    records
        .iter()
        .map(|record| {
            fields
                .iter()
                .map(|field| {
                    let value = record.get(*field);
                    if kind.is_numeric(field) {
                        return match value.and_then(parse_amount) {
                            Some(n) => CellData::Number(n),
                            None => CellData::Text(String::new()),
                        };
                    }
                    CellData::Text(value.map(field_text).unwrap_or_default())
                })
                .collect()
        })
        .collect()
}

/// Literal text form of a field value. Compound values render as their
/// compact JSON text.
fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Permissive numeric parsing for currency-ish values.
///
/// Finite JSON numbers pass through. Strings are trimmed, one surrounding
/// parenthesis pair marks a negative, and currency symbols, thousands
/// separators and interior whitespace are stripped before parsing.
/// Unparseable or non-finite values yield `None`, never an error.
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_amount_text(s),
        _ => None,
    }
}

fn parse_amount_text(raw: &str) -> Option<f64> {
    let mut text = raw.trim();
    if text.is_empty() {
        return None;
    }

    let mut negative = false;
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        text = inner.trim();
    }

    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let n: f64 = cleaned.parse().ok()?;
    if !n.is_finite() {
        return None;
    }
    Some(if negative { -n } else { n })
}

/// Rewrite the worksheet's row-data region.
///
/// Every existing row with `r >= start_row` inside `<sheetData>` is discarded
/// and the synthesized rows are emitted in its place; rows before
/// `start_row` (the header) pass through verbatim. With no rows to write, a
/// single bare row is emitted at `start_row` so the region is never
/// zero-length.
pub fn replace_data_rows(
    sheet_xml: &str,
    start_row: u32,
    rows: &[Vec<CellData>],
) -> Result<String, RenderError> {
    let mut reader = Reader::from_str(sheet_xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();
    let mut in_sheet_data = false;
    let mut skip_row = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"sheetData" => {
                in_sheet_data = true;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) if e.name().as_ref() == b"sheetData" => {
                // The template shipped an empty region; expand it around the
                // synthesized rows.
                let name = String::from_utf8(e.name().as_ref().to_vec())?;
                writer.write_event(Event::Start(e))?;
                write_rows(&mut writer, start_row, rows)?;
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            Event::Start(e) if in_sheet_data && e.name().as_ref() == b"row" => {
                if row_number(&e).is_some_and(|r| r >= start_row) {
                    skip_row = true;
                } else {
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) if in_sheet_data && e.name().as_ref() == b"row" => {
                if !row_number(&e).is_some_and(|r| r >= start_row) {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) if skip_row && e.name().as_ref() == b"row" => {
                skip_row = false;
            }
            Event::End(e) if e.name().as_ref() == b"sheetData" => {
                in_sheet_data = false;
                write_rows(&mut writer, start_row, rows)?;
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            e => {
                if !skip_row {
                    writer.write_event(e)?;
                }
            }
        }
        buf.clear();
    }

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn row_number(e: &BytesStart) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"r")
        .and_then(|attr| std::str::from_utf8(attr.value.as_ref()).ok()?.parse().ok())
}

fn write_rows<W: std::io::Write>(
    writer: &mut Writer<W>,
    start_row: u32,
    rows: &[Vec<CellData>],
) -> Result<(), RenderError> {
    if rows.is_empty() {
        let mut row = BytesStart::new("row");
        row.push_attribute(("r", start_row.to_string().as_str()));
        writer.write_event(Event::Empty(row))?;
        return Ok(());
    }

    for (i, cells) in rows.iter().enumerate() {
        let r = start_row + i as u32;
        let mut row = BytesStart::new("row");
        row.push_attribute(("r", r.to_string().as_str()));
        writer.write_event(Event::Start(row))?;

        for (idx, cell) in cells.iter().enumerate() {
            let addr = format!("{}{}", column_letters(idx + 1), r);
            match cell {
                CellData::Number(n) => {
                    let mut c = BytesStart::new("c");
                    c.push_attribute(("r", addr.as_str()));
                    writer.write_event(Event::Start(c))?;
                    writer.write_event(Event::Start(BytesStart::new("v")))?;
                    writer.write_event(Event::Text(BytesText::new(&n.to_string())))?;
                    writer.write_event(Event::End(BytesEnd::new("v")))?;
                    writer.write_event(Event::End(BytesEnd::new("c")))?;
                }
                CellData::Text(text) => {
                    let mut c = BytesStart::new("c");
                    c.push_attribute(("r", addr.as_str()));
                    c.push_attribute(("t", "inlineStr"));
                    writer.write_event(Event::Start(c))?;
                    writer.write_event(Event::Start(BytesStart::new("is")))?;
                    writer.write_event(Event::Start(BytesStart::new("t")))?;
                    writer.write_event(Event::Text(BytesText::new(text)))?;
                    writer.write_event(Event::End(BytesEnd::new("t")))?;
                    writer.write_event(Event::End(BytesEnd::new("is")))?;
                    writer.write_event(Event::End(BytesEnd::new("c")))?;
                }
            }
        }

        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_parse_amount_currency_text() {
        assert_eq!(parse_amount(&json!("$1,234.50")), Some(1234.5));
        assert_eq!(parse_amount(&json!("(500)")), Some(-500.0));
        assert_eq!(parse_amount(&json!("($2,000.25)")), Some(-2000.25));
        assert_eq!(parse_amount(&json!(" 1 234.56 ")), Some(1234.56));
        assert_eq!(parse_amount(&json!(42)), Some(42.0));
        assert_eq!(parse_amount(&json!(-7.5)), Some(-7.5));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(&json!("")), None);
        assert_eq!(parse_amount(&json!("   ")), None);
        assert_eq!(parse_amount(&json!("abc")), None);
        assert_eq!(parse_amount(&json!("()")), None);
        assert_eq!(parse_amount(&json!(null)), None);
        assert_eq!(parse_amount(&json!(true)), None);
        assert_eq!(parse_amount(&json!("inf")), None);
    }

    #[test]
    fn test_build_rows_numeric_vs_text() {
        let records = vec![record(&[
            ("Name", json!("Line A")),
            ("Expenditure", json!("$1,234.50")),
            ("Total Expenditures", json!("abc")),
            ("Notes", json!("abc")),
        ])];
        let rows = build_rows(&records, TableKind::Lines);
        assert_eq!(rows.len(), 1);

        let fields = TableKind::Lines.fields();
        let cell = |name: &str| {
            let idx = fields.iter().position(|f| *f == name).unwrap();
            rows[0][idx].clone()
        };

        assert_eq!(cell("Name"), CellData::Text("Line A".to_string()));
        assert_eq!(cell("Expenditure"), CellData::Number(1234.5));
        // Unparseable numeric input degrades to an empty cell
        assert_eq!(cell("Total Expenditures"), CellData::Text(String::new()));
        // The same literal stays text on a non-numeric column
        assert_eq!(cell("Notes"), CellData::Text("abc".to_string()));
        // Absent field renders empty
        assert_eq!(cell("Program Code"), CellData::Text(String::new()));
    }

    #[test]
    fn test_build_rows_empty_input_builds_no_rows() {
        assert!(build_rows(&[], TableKind::Lines).is_empty());
    }

    const SHEET: &str = concat!(
        r#"<worksheet><sheetData>"#,
        r#"<row r="1"><c r="A1" t="inlineStr"><is><t>Header</t></is></c></row>"#,
        r#"<row r="2"><c r="A2" t="inlineStr"><is><t>STALE</t></is></c></row>"#,
        r#"<row r="3"><c r="A3" t="inlineStr"><is><t>STALE</t></is></c></row>"#,
        r#"</sheetData></worksheet>"#,
    );

    #[test]
    fn test_replace_drops_stale_rows_and_keeps_header() {
        let rows = vec![vec![
            CellData::Text("fresh".to_string()),
            CellData::Number(-500.0),
        ]];
        let out = replace_data_rows(SHEET, 2, &rows).unwrap();

        assert!(!out.contains("STALE"));
        assert!(out.contains("<t>Header</t>"));
        assert!(out.contains(r#"<row r="2"><c r="A2" t="inlineStr"><is><t>fresh</t></is></c><c r="B2"><v>-500</v></c></row>"#));
        assert!(!out.contains(r#"<row r="3">"#));
    }

    #[test]
    fn test_replace_with_no_rows_emits_single_bare_row() {
        let out = replace_data_rows(SHEET, 2, &[]).unwrap();
        assert!(out.contains(r#"<row r="2"/>"#));
        assert!(!out.contains("STALE"));
        assert!(out.contains("<t>Header</t>"));
    }

    #[test]
    fn test_replace_expands_empty_sheet_data() {
        let sheet = r#"<worksheet><sheetData/></worksheet>"#;
        let rows = vec![vec![CellData::Text("x".to_string())]];
        let out = replace_data_rows(sheet, 2, &rows).unwrap();
        assert!(out.contains(r#"<sheetData><row r="2"><c r="A2" t="inlineStr"><is><t>x</t></is></c></row></sheetData>"#));
    }

    #[test]
    fn test_replace_escapes_markup_text() {
        let rows = vec![vec![CellData::Text(r#"a < b & "c""#.to_string())]];
        let out = replace_data_rows(SHEET, 2, &rows).unwrap();
        assert!(out.contains("a &lt; b &amp;"));
        assert!(!out.contains(r#"<t>a < b"#));
    }

    #[test]
    fn test_replace_numbers_rows_sequentially() {
        let rows = vec![
            vec![CellData::Text("one".to_string())],
            vec![CellData::Text("two".to_string())],
            vec![CellData::Text("three".to_string())],
        ];
        let out = replace_data_rows(SHEET, 2, &rows).unwrap();
        assert!(out.contains(r#"<row r="2">"#));
        assert!(out.contains(r#"<row r="3">"#));
        assert!(out.contains(r#"<row r="4"><c r="A4""#));
    }
}
