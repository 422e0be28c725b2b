//! Export boundary
//! Serializes already-computed aggregate tables to CSV or Markdown.
//! No computation happens here.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Write rows as CSV with a serde-derived header. An empty table still
/// produces the file.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating export directory {:?}", parent))?;
    }
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("opening {:?} for export", path))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Render a Markdown table. The header row is always emitted, so an empty
/// table exports as a header-only artifact.
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = writeln!(
        out,
        "|{}|",
        headers.iter().map(|_| " --- ").collect::<Vec<_>>().join("|")
    );
    for row in rows {
        let _ = writeln!(out, "| {} |", row.join(" | "));
    }
    out
}

/// Assemble a titled Markdown report from (section heading, body) pairs.
pub fn markdown_report(title: &str, sections: &[(String, String)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", title);
    for (heading, body) in sections {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {}", heading);
        let _ = writeln!(out);
        let _ = write!(out, "{}", body);
    }
    out
}

pub fn write_markdown(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating export directory {:?}", parent))?;
    }
    fs::write(path, content).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: String,
        count: u64,
    }

    #[test]
    fn markdown_table_renders_header_and_rows() {
        let table = markdown_table(
            &["Region", "Rate"],
            &[vec!["North".to_string(), "4.2".to_string()]],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "| Region | Rate |");
        assert_eq!(lines[1], "| --- | --- |");
        assert_eq!(lines[2], "| North | 4.2 |");
    }

    #[test]
    fn empty_markdown_table_is_header_only() {
        let table = markdown_table(&["Region"], &[]);
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn markdown_report_nests_sections() {
        let report = markdown_report(
            "Fraud Overview",
            &[("Regions".to_string(), "body\n".to_string())],
        );
        assert!(report.starts_with("# Fraud Overview"));
        assert!(report.contains("## Regions"));
    }

    #[test]
    fn csv_roundtrip_through_a_temp_file() {
        let path = std::env::temp_dir().join("fraudscope_export_test.csv");
        let rows = vec![
            Row { name: "North".to_string(), count: 3 },
            Row { name: "South".to_string(), count: 1 },
        ];
        write_csv(&path, &rows).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("name,count"));
        assert_eq!(content.lines().count(), 3);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_csv_still_creates_the_file() {
        let path = std::env::temp_dir().join("fraudscope_export_empty_test.csv");
        let rows: Vec<Row> = Vec::new();
        write_csv(&path, &rows).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
