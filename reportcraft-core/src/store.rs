//! Storage boundary: template fetch, report persistence, public addressing

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use url::Url;

use crate::request::DEFAULT_SCENARIO_NAME;

/// Well-known storage key of the prebuilt report template.
pub const TEMPLATE_KEY: &str = "templates/final-report-template.xlsm";

/// Content type of a rendered macro-enabled workbook.
pub const REPORT_CONTENT_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.12";

/// Durable object storage as seen by the renderer. Retries, if desired,
/// belong to the caller of this boundary, not to the engine.
pub trait ObjectStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> io::Result<()>;
}

/// Filesystem-backed store; keys are relative paths under a root directory.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl ObjectStore for DirStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.resolve(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> io::Result<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)
    }
}

/// Timestamped output file name: `<utc-iso-ts>-<sanitized scenario name>.xlsm`.
pub fn report_file_name(scenario_name: Option<&str>) -> String {
    report_file_name_at(scenario_name, Utc::now())
}

pub fn report_file_name_at(scenario_name: Option<&str>, now: DateTime<Utc>) -> String {
    let ts = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let name = sanitize_component(scenario_name.unwrap_or(DEFAULT_SCENARIO_NAME));
    format!("{ts}-{name}.xlsm")
}

/// Storage key for a rendered report.
pub fn report_key(scenario_id: &str, file_name: &str) -> String {
    format!("reports/{scenario_id}/{file_name}")
}

/// Publicly resolvable address of a stored report: the base URL with the
/// key's segments appended, percent-encoded.
pub fn public_url(base: &str, key: &str) -> Option<String> {
    let mut url = Url::parse(base).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(key.split('/'));
    Some(url.to_string())
}

/// Collapse every run of characters outside `[A-Za-z0-9_-]` into an
/// underscore, truncated to 120 characters.
pub fn sanitize_component(name: &str) -> String {
    thread_local! {
        static RE: Regex = Regex::new(r"[^\w\-]+").unwrap();
    }
    RE.with(|re| re.replace_all(name, "_").chars().take(120).collect())
}
