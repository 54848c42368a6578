//! CSV export of particle measurements.
//!
//! Format (bit-exact):
//!
//! ```text
//! No.,Area(px),Diameter(px)
//! 1,25.0,5.64
//! 2,100.0,11.28
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::{AnalysisError, Result};
use crate::metrics::Report;

pub const CSV_HEADER: &str = "No.,Area(px),Diameter(px)";

/// Write the report rows as CSV.
pub fn write_csv<W: Write>(mut writer: W, report: &Report) -> io::Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for r in &report.records {
        writeln!(writer, "{},{:.1},{:.2}", r.index, r.area as f64, r.diameter)?;
    }
    writer.flush()
}

/// Render the CSV into a string.
pub fn to_csv_string(report: &Report) -> String {
    let mut buf = Vec::new();
    write_csv(&mut buf, report).expect("writing to a Vec cannot fail");
    String::from_utf8(buf).expect("CSV rows are ASCII")
}

/// Write the report to `path`.
///
/// The file is only created once `report` exists, so an empty analysis never
/// leaves a file behind.
pub fn export_csv(path: &Path, report: &Report) -> Result<()> {
    let io_err = |source| AnalysisError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    write_csv(BufWriter::new(file), report).map_err(io_err)?;
    info!(
        "exported {} particle(s) to {}",
        report.records.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::analyze_areas;

    #[test]
    fn test_csv_exact_text() {
        let report = analyze_areas(&[25, 100, 1]).unwrap();
        assert_eq!(
            to_csv_string(&report),
            "No.,Area(px),Diameter(px)\n1,25.0,5.64\n2,100.0,11.28\n3,1.0,1.13\n"
        );
    }

    #[test]
    fn test_string_matches_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("same.csv");
        let report = analyze_areas(&[7, 49, 314]).unwrap();

        export_csv(&path, &report).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), to_csv_string(&report));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let report = analyze_areas(&[1000]).unwrap();

        export_csv(&path, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "No.,Area(px),Diameter(px)\n1,1000.0,35.68\n");
    }

    #[test]
    fn test_export_to_missing_directory_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("results.csv");
        let report = analyze_areas(&[4]).unwrap();

        let err = export_csv(&path, &report).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
        assert!(err.to_string().contains("results.csv"));
    }
}
