use std::io;
use std::path::Path;

use crate::format;
use crate::models::BatchReport;

pub const JSON_REPORT_FILENAME: &str = "normalize_report.json";
pub const TEXT_REPORT_FILENAME: &str = "normalize_report.txt";

/// Save a batch report as pretty-printed JSON to `normalize_report.json`.
pub fn save_report(dir: &Path, report: &BatchReport) -> io::Result<()> {
    let path = dir.join(JSON_REPORT_FILENAME);
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    std::fs::write(&path, json)
}

/// Save the text table to `normalize_report.txt`.
pub fn save_text_report(dir: &Path, report: &BatchReport) -> io::Result<()> {
    let path = dir.join(TEXT_REPORT_FILENAME);
    std::fs::write(&path, format::format_table(report))
}
