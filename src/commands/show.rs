//! Print an exported CSV table as aligned columns.

use crate::export::read_table;
use anyhow::Result;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let table = read_table(path)?;

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", render(&table.headers));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in &table.rows {
        println!("{}", render(row));
    }

    eprintln!();
    eprintln!("{} rows", table.rows.len());
    Ok(())
}
