use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::ExportError;
use crate::planning::grid::{GridCell, GridView};

const EMPTY_CELL: &str = "-";

/// Formats a cell for text output; unpainted cells render as `-`
pub fn format_cell(cell: &GridCell) -> String {
    cell.visual
        .as_ref()
        .map(|visual| visual.label())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

fn header_line(grid: &GridView) -> String {
    grid.days
        .iter()
        .map(|day| format!("{} {}", day.weekday, day.label))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Writes the grid as one block per analyst:
/// `Name` then `  Mon 11/03: T1 08:00–18:00 [Norte]`
pub fn write_grid_to_file<P: AsRef<Path>>(grid: &GridView, path: P) -> Result<(), ExportError> {
    let mut file = File::create(path)?;

    writeln!(file, "** {} **", header_line(grid))?;
    for row in &grid.rows {
        writeln!(file, "{}", row.analyst.name)?;
        for (day, cell) in grid.days.iter().zip(&row.cells) {
            writeln!(file, "  {} {}: {}", day.weekday, day.label, format_cell(cell))?;
        }
    }

    Ok(())
}

/// Prints the grid in a readable format
pub fn print_grid(grid: &GridView) {
    let (first, last) = match (grid.days.first(), grid.days.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            println!("(empty view)");
            return;
        }
    };
    println!("\n=== Schedule {} - {} ===", first.date, last.date);
    println!("Analysts: {}", grid.rows.len());
    if grid.rows.is_empty() {
        println!("⚠️  No analysts in this view");
        return;
    }

    for row in &grid.rows {
        let painted = row.cells.iter().filter(|c| c.visual.is_some()).count();
        println!("\n{} (ID: {}, {}/{} days planned)", row.analyst.name, row.analyst.id, painted, row.cells.len());
        for (day, cell) in grid.days.iter().zip(&row.cells) {
            let marker = if day.is_weekend { "*" } else { " " };
            println!("  {}{} {} -> {}", marker, day.weekday, day.label, format_cell(cell));
        }
    }
}
