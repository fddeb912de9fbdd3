//! reportcraft-core: template-table injection for budget scenario reports
//!
//! This library rewrites the data regions of four known tables inside a
//! prebuilt XLSM template while leaving every other archive entry
//! byte-for-byte untouched, so the template's macros, styles and formulas
//! keep working in the rendered output.

pub mod archive;
pub mod config;
pub mod error;
pub mod normalize;
pub mod range;
pub mod rels;
pub mod render;
pub mod request;
pub mod rows;
pub mod schema;
pub mod store;

pub use config::ServiceConfig;
pub use error::{RenderError, RequestError};
pub use normalize::Record;
pub use render::render_report;
pub use request::{ReportInput, ReportRequest, ReportResponse, parse_request};
pub use schema::TableKind;
pub use store::{DirStore, ObjectStore};
