//! Console table of the run's results.

use super::Report;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};

impl Report {
    /// Render the "Compression Results" table
    pub fn render_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("File Name").fg(Color::Magenta),
                Cell::new("Original Size (MB)").fg(Color::Magenta),
                Cell::new("Compressed Size (MB)").fg(Color::Magenta),
                Cell::new("Size Reduction (%)").fg(Color::Magenta),
                Cell::new("Time Taken (s)").fg(Color::Magenta),
            ]);

        for row in &self.rows {
            table.add_row(vec![
                Cell::new(&row.file_name),
                Cell::new(&row.original_size_mb).set_alignment(CellAlignment::Right),
                Cell::new(&row.compressed_size_mb).set_alignment(CellAlignment::Right),
                Cell::new(&row.size_reduction).set_alignment(CellAlignment::Right),
                Cell::new(&row.time_taken).set_alignment(CellAlignment::Right),
            ]);
        }

        format!("Compression Results\n{}", table)
    }
}
