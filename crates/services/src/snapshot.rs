use progress_core::Clock;

use crate::error::ProgressError;

pub const EXPORT_MIME_TYPE: &str = "application/json";
const EXPORT_PREFIX: &str = "zephyr-learning-progress";

/// A downloadable progress backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: Vec<u8>,
}

impl ExportFile {
    #[must_use]
    pub fn new(clock: &Clock, contents: String) -> Self {
        Self {
            file_name: export_file_name(clock),
            mime_type: EXPORT_MIME_TYPE,
            contents: contents.into_bytes(),
        }
    }
}

/// `zephyr-learning-progress-<YYYY-MM-DD>.json`
#[must_use]
pub fn export_file_name(clock: &Clock) -> String {
    format!("{EXPORT_PREFIX}-{}.json", clock.today_iso())
}

/// Reject files that do not carry a `.json` extension.
///
/// # Errors
///
/// Returns `ProgressError::UnsupportedFileType` for any other name.
pub fn ensure_json_file_name(name: &str) -> Result<(), ProgressError> {
    let is_json = std::path::Path::new(name.trim())
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(())
    } else {
        Err(ProgressError::UnsupportedFileType {
            name: name.to_string(),
        })
    }
}

/// Decode raw file bytes into a JSON value.
///
/// # Errors
///
/// Returns `ProgressError::ImportParseFailed` for non-UTF-8 or non-JSON input.
pub fn parse_snapshot(bytes: &[u8]) -> Result<serde_json::Value, ProgressError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| ProgressError::ImportParseFailed(err.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    serde_json::from_str(text).map_err(|err| ProgressError::ImportParseFailed(err.to_string()))
}
