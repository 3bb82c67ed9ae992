use log::{debug, info};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{BuildWarnError, Result};
use crate::report::{ReportRow, HEADER};

/// Decides where the report goes.
///
/// With a staging directory (typically `BUILD_ARTIFACTSTAGINGDIRECTORY`) the
/// directory is created if needed and the file lands inside it. Without one,
/// `filename` is used as given.
pub fn resolve_output_path(filename: &Path, staging_dir: Option<&Path>) -> Result<PathBuf> {
    match staging_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            debug!("Using artifact staging directory {}", dir.display());
            Ok(dir.join(filename))
        }
        None => Ok(filename.to_path_buf()),
    }
}

/// CSV report writer.
///
/// The header is written on creation, so a run that scans pipelines without
/// finding warnings still leaves a valid, header-only file. Rows are flushed
/// as they are written.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl ReportWriter<File> {
    /// Creates (or truncates) the report file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        info!("Writing report to {}", path.display());
        Self::from_writer(file)
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn from_writer(output: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(output);

        writer.write_record(HEADER)?;

        Ok(Self { writer })
    }

    pub fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| BuildWarnError::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn rendered(rows: &[ReportRow]) -> String {
        let mut writer = ReportWriter::from_writer(Vec::new()).unwrap();
        for row in rows {
            assert_ok!(writer.write_row(row));
        }
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_header_only_report() {
        assert_eq!(
            rendered(&[]),
            "project_name,pipeline_name,build_id,warnings_message\n"
        );
    }

    #[test]
    fn test_multiline_warnings_are_quoted_in_one_field() {
        let row = ReportRow::new(
            "P1",
            "Pipe1",
            100,
            &["A".to_string(), "B".to_string()],
            "https://dev.azure.com/abc/P1/_build/results?buildId=100".to_string(),
        );

        assert_eq!(
            rendered(&[row]),
            "project_name,pipeline_name,build_id,warnings_message\nP1,Pipe1,100,\"A\nB\"\n"
        );
    }

    #[test]
    fn test_fields_with_commas_and_quotes_are_escaped() {
        let row = ReportRow::new(
            "Core, Platform",
            "build \"nightly\"",
            7,
            &["single".to_string()],
            String::new(),
        );

        assert_eq!(
            rendered(&[row]),
            "project_name,pipeline_name,build_id,warnings_message\n\"Core, Platform\",\"build \"\"nightly\"\"\",7,single\n"
        );
    }

    #[test]
    fn test_resolve_without_staging_dir() {
        let path = resolve_output_path(Path::new("pipeline_warnings.csv"), None).unwrap();
        assert_eq!(path, PathBuf::from("pipeline_warnings.csv"));
    }

    #[test]
    fn test_resolve_creates_staging_dir() {
        let temp_dir = TempDir::new().unwrap();
        let staging = temp_dir.path().join("a").join("staging");

        let path = resolve_output_path(Path::new("report.csv"), Some(&staging)).unwrap();

        assert!(staging.is_dir());
        assert_eq!(path, staging.join("report.csv"));
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.csv");
        fs::write(&path, "stale content that is longer than the header row\n".repeat(4)).unwrap();

        let writer = ReportWriter::create(&path).unwrap();
        writer.finish().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "project_name,pipeline_name,build_id,warnings_message\n"
        );
    }
}
