//! Error types for the rendering engine and the request boundary

use thiserror::Error;

/// Structural failure while traversing or rewriting the template archive.
///
/// These indicate a broken template or deployment, never bad caller data.
/// Caller-data irregularities are absorbed by the normalizer and never reach
/// this type.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Missing archive entry: {0}")]
    MissingEntry(String),

    #[error("Sheet '{0}' not found in workbook.xml")]
    SheetNotFound(String),

    #[error("No table relationship found for sheet '{0}'")]
    TableNotFound(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive entry is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Client-facing request error, rejected before the engine runs.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Missing scenarioId")]
    MissingScenarioId,
}
