//! Relationship resolution between the workbook, worksheets and table parts

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::RenderError;

/// Top-level manifest listing named sheets and their relationship ids.
pub const WORKBOOK_PATH: &str = "xl/workbook.xml";

/// Side table mapping workbook relationship ids to entry paths.
pub const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";

/// Resolve a sheet name to its worksheet entry path.
///
/// Scans `xl/workbook.xml` for the sheet's `r:id`, then resolves that id to a
/// target in `xl/_rels/workbook.xml.rels`. A miss in either lookup is fatal
/// for the whole request: a template missing an expected sheet is a
/// deployment error, not a data error.
pub fn sheet_target(
    workbook_xml: &str,
    workbook_rels_xml: &str,
    sheet_name: &str,
) -> Result<String, RenderError> {
    // 1. Get rId from the workbook manifest
    let mut rid = String::new();
    {
        let mut reader = Reader::from_str(workbook_xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.name().as_ref() == b"sheet" {
                        let mut name = String::new();
                        let mut r_id = String::new();
                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.as_ref() {
                                b"name" => name = attr.unescape_value()?.to_string(),
                                b"r:id" => r_id = attr.unescape_value()?.to_string(),
                                _ => {}
                            }
                        }
                        if name == sheet_name {
                            rid = r_id;
                            break;
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    if rid.is_empty() {
        return Err(RenderError::SheetNotFound(sheet_name.to_string()));
    }

    // 2. Resolve the rId in the workbook relationships
    let mut target = String::new();
    {
        let mut reader = Reader::from_str(workbook_rels_xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.name().as_ref() == b"Relationship" {
                        let mut id = String::new();
                        let mut t = String::new();
                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.as_ref() {
                                b"Id" => id = attr.unescape_value()?.to_string(),
                                b"Target" => t = attr.unescape_value()?.to_string(),
                                _ => {}
                            }
                        }
                        if id == rid {
                            target = t;
                            break;
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    if target.is_empty() {
        return Err(RenderError::SheetNotFound(sheet_name.to_string()));
    }

    // Workbook targets are relative to xl/ ("worksheets/sheet1.xml")
    if let Some(absolute) = target.strip_prefix('/') {
        Ok(absolute.to_string())
    } else {
        Ok(resolve_relative("xl", &target))
    }
}

/// Relationship entry path for a worksheet:
/// `xl/worksheets/sheet7.xml` -> `xl/worksheets/_rels/sheet7.xml.rels`.
pub fn sheet_rels_path(sheet_path: &str) -> String {
    match sheet_path.rfind('/') {
        Some(i) => format!("{}/_rels/{}.rels", &sheet_path[..i], &sheet_path[i + 1..]),
        None => format!("_rels/{sheet_path}.rels"),
    }
}

/// Find the table definition bound to a worksheet.
///
/// Returns the target of the first relationship whose type denotes a table,
/// resolved relative to the worksheet's directory. Only the first table
/// relationship is honored; the template contract is one table per sheet.
pub fn table_target(sheet_path: &str, sheet_rels_xml: &str) -> Result<String, RenderError> {
    let mut reader = Reader::from_str(sheet_rels_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() == b"Relationship" {
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Type" => rel_type = attr.unescape_value()?.to_string(),
                            b"Target" => target = attr.unescape_value()?.to_string(),
                            _ => {}
                        }
                    }
                    if rel_type.ends_with("/table") && !target.is_empty() {
                        return Ok(resolve_relative(parent_dir(sheet_path), &target));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Err(RenderError::TableNotFound(sheet_path.to_string()))
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..i],
        None => "",
    }
}

/// Resolve a relationship target against a base directory inside the archive:
/// `xl/worksheets` + `../tables/table1.xml` -> `xl/tables/table1.xml`.
fn resolve_relative(base_dir: &str, target: &str) -> String {
    let mut stack: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for part in target.split('/').filter(|p| !p.is_empty()) {
        match part {
            ".." => {
                stack.pop();
            }
            "." => {}
            _ => stack.push(part),
        }
    }
    stack.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKBOOK: &str = r#"<?xml version="1.0"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
<sheet name="Data_Scenario" sheetId="1" r:id="rId1"/>
<sheet name="Data_Lines" sheetId="2" r:id="rId2"/>
</sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
</Relationships>"#;

    const SHEET_RELS: &str = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/printerSettings" Target="../printerSettings/printerSettings1.bin"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/table" Target="../tables/table2.xml"/>
</Relationships>"#;

    #[test]
    fn test_sheet_target_resolves_through_rels() {
        let path = sheet_target(WORKBOOK, WORKBOOK_RELS, "Data_Lines").unwrap();
        assert_eq!(path, "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_unknown_sheet_is_fatal() {
        let err = sheet_target(WORKBOOK, WORKBOOK_RELS, "Data_Nope").unwrap_err();
        assert!(matches!(err, RenderError::SheetNotFound(_)));
    }

    #[test]
    fn test_dangling_rid_is_fatal() {
        let rels = r#"<Relationships><Relationship Id="rId9" Target="worksheets/sheet9.xml"/></Relationships>"#;
        let err = sheet_target(WORKBOOK, rels, "Data_Lines").unwrap_err();
        assert!(matches!(err, RenderError::SheetNotFound(_)));
    }

    #[test]
    fn test_sheet_rels_path() {
        assert_eq!(
            sheet_rels_path("xl/worksheets/sheet7.xml"),
            "xl/worksheets/_rels/sheet7.xml.rels"
        );
    }

    #[test]
    fn test_table_target_takes_first_table_relationship() {
        let path = table_target("xl/worksheets/sheet2.xml", SHEET_RELS).unwrap();
        assert_eq!(path, "xl/tables/table2.xml");
    }

    #[test]
    fn test_missing_table_relationship_is_fatal() {
        let rels = r#"<Relationships><Relationship Id="rId1" Type=".../printerSettings" Target="x.bin"/></Relationships>"#;
        let err = table_target("xl/worksheets/sheet2.xml", rels).unwrap_err();
        assert!(matches!(err, RenderError::TableNotFound(_)));
    }
}
