//! Range computation and rewriting of the dimension and table declarations

use std::io::Cursor;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::RenderError;

/// 1-based bijective base-26 column letters: 1 -> A, 26 -> Z, 27 -> AA.
pub fn column_letters(mut n: usize) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Bounding rectangle for a table with `field_count` columns and
/// `record_count` data rows. Row 1 is the header; the data region is never
/// zero-length, so an empty table still spans two rows.
pub fn table_range(field_count: usize, record_count: usize) -> String {
    let last_col = column_letters(field_count);
    let last_row = 1 + record_count.max(1);
    format!("A1:{last_col}{last_row}")
}

/// Rewrite the worksheet's dimension declaration to `range`, inserting one
/// immediately after the `<worksheet>` open tag when the template has none.
pub fn upsert_dimension(sheet_xml: &str, range: &str) -> Result<String, RenderError> {
    let insert_after_worksheet = !has_element(sheet_xml, b"dimension")?;

    let mut reader = Reader::from_str(sheet_xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"worksheet" => {
                writer.write_event(Event::Start(e.to_owned()))?;
                if insert_after_worksheet {
                    let mut dimension = BytesStart::new("dimension");
                    dimension.push_attribute(("ref", range));
                    writer.write_event(Event::Empty(dimension))?;
                }
            }
            Event::Start(e) if e.name().as_ref() == b"dimension" => {
                writer.write_event(Event::Start(with_ref_attr(&e, range)?))?;
            }
            Event::Empty(e) if e.name().as_ref() == b"dimension" => {
                writer.write_event(Event::Empty(with_ref_attr(&e, range)?))?;
            }
            Event::Eof => break,
            e => writer.write_event(e)?,
        }
        buf.clear();
    }

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

/// Rewrite the table definition's range to `range`. The auto-filter range,
/// when present, must always mirror the table range; a stale auto-filter
/// range corrupts the table feature in the consuming application.
pub fn update_table_range(table_xml: &str, range: &str) -> Result<String, RenderError> {
    let mut reader = Reader::from_str(table_xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if is_ranged_element(&e) => {
                writer.write_event(Event::Start(with_ref_attr(&e, range)?))?;
            }
            Event::Empty(e) if is_ranged_element(&e) => {
                writer.write_event(Event::Empty(with_ref_attr(&e, range)?))?;
            }
            Event::Eof => break,
            e => writer.write_event(e)?,
        }
        buf.clear();
    }

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn is_ranged_element(e: &BytesStart) -> bool {
    matches!(e.name().as_ref(), b"table" | b"autoFilter")
}

/// Rebuild an element with its `ref` attribute replaced (or appended),
/// preserving every other attribute in order.
fn with_ref_attr(e: &BytesStart, range: &str) -> Result<BytesStart<'static>, RenderError> {
    let name = String::from_utf8(e.name().as_ref().to_vec())?;
    let mut out = BytesStart::new(name);
    let mut replaced = false;

    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"ref" {
            out.push_attribute(("ref", range));
            replaced = true;
        } else {
            out.push_attribute(attr);
        }
    }
    if !replaced {
        out.push_attribute(("ref", range));
    }

    Ok(out)
}

fn has_element(xml: &str, element: &[u8]) -> Result<bool, RenderError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() == element {
                    return Ok(true);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(false)
}
