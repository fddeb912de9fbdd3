//! Orchestration of per-table rewrites against one archive state

use crate::archive::TemplateArchive;
use crate::error::RenderError;
use crate::normalize::Record;
use crate::range;
use crate::rels::{self, WORKBOOK_PATH, WORKBOOK_RELS_PATH};
use crate::request::ReportInput;
use crate::rows;
use crate::schema::{DATA_START_ROW, TableKind};

/// Render a full report: rewrite the data region of all four tables inside
/// the template archive and re-pack it.
///
/// Tables are processed strictly in sequence against the same in-memory
/// archive, since re-serialization needs every table mutation landed in one
/// state. Any structural failure aborts before output bytes exist, so a
/// partial render is never observable.
pub fn render_report(template: &[u8], input: &ReportInput) -> Result<Vec<u8>, RenderError> {
    let mut archive = TemplateArchive::open(template)?;

    for kind in TableKind::ALL {
        write_table(&mut archive, kind, input.records_for(kind))?;
    }

    archive.into_bytes()
}

/// Rewrite one table: resolve its worksheet and table-definition entries,
/// regenerate the row region, and update both range declarations.
fn write_table(
    archive: &mut TemplateArchive,
    kind: TableKind,
    records: &[Record],
) -> Result<(), RenderError> {
    let workbook_xml = archive.read_text(WORKBOOK_PATH)?;
    let workbook_rels_xml = archive.read_text(WORKBOOK_RELS_PATH)?;

    let sheet_path = rels::sheet_target(&workbook_xml, &workbook_rels_xml, kind.sheet_name())?;
    let sheet_rels_xml = archive.read_text(&rels::sheet_rels_path(&sheet_path))?;
    let table_path = rels::table_target(&sheet_path, &sheet_rels_xml)?;

    let sheet_xml = archive.read_text(&sheet_path)?;
    let table_xml = archive.read_text(&table_path)?;

    let cell_rows = rows::build_rows(records, kind);
    let sheet_xml = rows::replace_data_rows(&sheet_xml, DATA_START_ROW, &cell_rows)?;

    let range_ref = range::table_range(kind.fields().len(), records.len());
    let sheet_xml = range::upsert_dimension(&sheet_xml, &range_ref)?;
    let table_xml = range::update_table_range(&table_xml, &range_ref)?;

    archive.write_entry(&sheet_path, sheet_xml);
    archive.write_entry(&table_path, table_xml);

    Ok(())
}
