//! Result rendering: boxed tables for the terminal, JSON and CSV for files
//! and pipelines.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;

/// Output format of the `price` and `crosscheck` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// A record that can be laid out as one table row.
pub trait TableRow: Serialize {
    /// Column headings.
    fn headers() -> &'static [&'static str];

    /// Formatted cells, one per heading.
    fn cells(&self) -> Vec<String>;
}

/// Format an optional number, leaving the cell blank when absent.
pub fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(String::new, |v| format!("{v:.precision$}"))
}

/// Write `rows` to `out` in `format`.
pub fn write_rows<T, W>(rows: &[T], format: OutputFormat, mut out: W) -> Result<()>
where
    T: TableRow,
    W: Write,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, rows)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => write_table(rows, out)?,
    }
    Ok(())
}

fn write_table<T: TableRow, W: Write>(rows: &[T], mut out: W) -> Result<()> {
    let headers = T::headers();
    let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(j, h)| {
            cells
                .iter()
                .map(|row| row[j].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(mid))
    };
    let line = |values: &[String]| {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!(" {v:>w$} "))
            .collect();
        format!("│{}│", padded.join("│"))
    };

    writeln!(out, "{}", rule("┌", "┬", "┐"))?;
    let heading: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    writeln!(out, "{}", line(&heading))?;
    writeln!(out, "{}", rule("├", "┼", "┤"))?;
    for row in &cells {
        writeln!(out, "{}", line(row))?;
    }
    writeln!(out, "{}", rule("└", "┴", "┘"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        strike: f64,
        price: Option<f64>,
    }

    impl TableRow for Row {
        fn headers() -> &'static [&'static str] {
            &["Strike", "Price"]
        }

        fn cells(&self) -> Vec<String> {
            vec![format!("{:.4}", self.strike), optional(self.price, 6)]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { strike: 0.02, price: Some(0.0123) },
            Row { strike: 0.03, price: None },
        ]
    }

    #[test]
    fn test_table_layout() {
        let mut buf = Vec::new();
        write_rows(&rows(), OutputFormat::Table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("Strike"));
        assert!(lines[3].contains("0.012300"));
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_csv_leaves_missing_values_blank() {
        let mut buf = Vec::new();
        write_rows(&rows(), OutputFormat::Csv, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "strike,price\n0.02,0.0123\n0.03,\n");
    }

    #[test]
    fn test_json_round_trips() {
        let mut buf = Vec::new();
        write_rows(&rows(), OutputFormat::Json, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["price"], 0.0123);
        assert!(value[1]["price"].is_null());
    }
}
