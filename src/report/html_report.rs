//! Self-contained HTML report, regenerated on every run.

use super::{Report, ReportRow};
use crate::error::CompressError;
use std::fmt::Write as _;
use std::path::Path;

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>PDF Compression Report</title>
    <style>
        table { width: 100%; border-collapse: collapse; }
        table, th, td { border: 1px solid black; }
        th, td { padding: 8px; text-align: left; }
    </style>
</head>
<body>
    <h2>PDF Compression Report</h2>
    <table>
        <tr>
            <th>File Name</th>
            <th>File Location</th>
            <th>Original Size (MB)</th>
            <th>Compressed Size (MB)</th>
            <th>Size Reduction (%)</th>
            <th>Time Taken (seconds)</th>
            <th>Compressed PDF</th>
        </tr>
"#;

const TAIL: &str = "    </table>\n</body>\n</html>\n";

impl Report {
    /// Render the whole document
    pub fn render_html(&self) -> String {
        let mut html = String::from(HEAD);
        for row in &self.rows {
            push_row(&mut html, row);
        }
        html.push_str(TAIL);
        html
    }

    /// Overwrite `path` with a fresh document
    pub fn write_html(&self, path: &Path) -> Result<(), CompressError> {
        std::fs::write(path, self.render_html())?;
        Ok(())
    }
}

fn push_row(html: &mut String, row: &ReportRow) {
    let cells = [
        escape(&row.file_name),
        escape(&row.file_location),
        row.original_size_mb.clone(),
        row.compressed_size_mb.clone(),
        row.size_reduction.clone(),
        row.time_taken.clone(),
    ];

    html.push_str("        <tr>\n");
    for cell in cells {
        let _ = writeln!(html, "            <td>{}</td>", cell);
    }
    let _ = writeln!(html, "            <td><a href=\"{}\">Download</a></td>", escape(&row.link));
    html.push_str("        </tr>\n");
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
