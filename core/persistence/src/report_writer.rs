//! FILENAME: core/persistence/src/report_writer.rs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use coverage_engine::{ContributorKind, StatisticsReport};
use log::info;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::{ensure_directory, Result};

pub const REPORT_INDENT: &[u8] = b"    ";

/// `<project>_institution_stats.json` or `<project>_model_stats.json`.
pub fn report_file_name(project: &str, kind: ContributorKind) -> String {
    format!("{}_{}_stats.json", project, kind.singular())
}

/// Writes `report` to `dir/file_name` and returns the written path.
pub fn save_report(dir: &Path, file_name: &str, report: &StatisticsReport) -> Result<PathBuf> {
    ensure_directory(dir)?;

    let path = dir.join(file_name);
    let mut writer = BufWriter::new(File::create(&path)?);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(REPORT_INDENT));
    report.serialize(&mut serializer)?;
    writer.flush()?;

    info!("wrote {} statistics to {}", report.len(), path.display());
    Ok(path)
}
