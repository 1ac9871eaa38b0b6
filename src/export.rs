use std::path::Path;

use csv::WriterBuilder;

use crate::display::format_cell;
use crate::error::ExportError;
use crate::planning::grid::GridView;

/// Exports a rendered grid to CSV: one row per analyst, one column per day.
///
/// The header is `Analyst` followed by the ISO dates of the view. Painted
/// cells carry their compact label (`T1 08:00–18:00 [Norte]`), empty cells
/// are written as `-`. An existing file is overwritten.
pub fn export_grid_to_csv(grid: &GridView, csv_path: &Path) -> Result<(), ExportError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(csv_path)?;

    let mut header = vec!["Analyst".to_string()];
    header.extend(grid.days.iter().map(|day| day.date.to_string()));
    wtr.write_record(&header)?;

    for row in &grid.rows {
        let mut record = Vec::with_capacity(row.cells.len() + 1);
        record.push(row.analyst.name.clone());
        record.extend(row.cells.iter().map(format_cell));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::render_grid;
    use crate::planning::store::AssignmentStore;
    use crate::planning::time_utils::{ViewLength, ViewWindow};
    use crate::planning::types::fixtures::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_header_and_one_row_per_analyst() {
        let window = ViewWindow::new(date(2024, 3, 10), ViewLength::Fortnight).unwrap();
        let analysts = vec![analyst(5, "Ana"), analyst(7, "Luis")];
        let rows = vec![workable(7, date(2024, 3, 11), t1()), day_off(5, date(2024, 3, 24))];
        let store = AssignmentStore::load(&analysts, &window, rows);
        let grid = render_grid(&analysts, &store, &window);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        export_grid_to_csv(&grid, &path).unwrap();

        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(&path).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].len(), 16);
        assert_eq!(&records[0][0], "Analyst");
        assert_eq!(&records[0][1], "2024-03-10");
        assert_eq!(&records[0][15], "2024-03-24");
        assert_eq!(&records[1][0], "Ana");
        assert_eq!(&records[1][15], "OFF");
        assert_eq!(&records[2][2], "T1 08:00–18:00");
        assert_eq!(&records[2][3], "-");
    }
}
