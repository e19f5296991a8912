//! Table detection
//!
//! Detects tabular regions on a page from line positions alone: lines are
//! bucketed into rows by vertical coordinate, and vertically stacked runs of
//! multi-column rows become table grids. Real tables exhibit at least three
//! stacked rows of at least two aligned columns; the bounded lookahead keeps
//! the scan linear and stops unrelated multi-column layouts far apart on the
//! page from merging into one region.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ingest::{BBox, Line};

/// Minimum stacked rows for a run to be accepted as a table.
pub const MIN_TABLE_ROWS: usize = 3;

/// Minimum lines in a row for it to qualify as a table row.
pub const MIN_TABLE_COLUMNS: usize = 2;

/// Maximum consecutive rows consumed by a single region.
const MAX_RUN_ROWS: usize = 10;

/// A detected table: bounding box, grid dimensions, and cell text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRegion {
    /// Union of all constituent line boxes
    pub bbox: BBox,
    /// Number of rows in the grid
    pub rows: usize,
    /// Max row width observed in the run; every grid row is padded to it
    pub columns: usize,
    /// Row-major cell text, right-padded with empty strings
    pub grid: Vec<Vec<String>>,
}

/// Detect table regions within one page's lines.
///
/// Pages with no multi-column rows yield an empty vector, never an error.
pub fn detect_tables(lines: &[Line]) -> Vec<TableRegion> {
    // Bucket lines into rows by top coordinate rounded to one decimal place.
    // BTreeMap keeps the row keys in ascending y order.
    let mut rows: BTreeMap<i64, Vec<&Line>> = BTreeMap::new();
    for line in lines {
        let key = (line.bbox.y0 * 10.0).round() as i64;
        rows.entry(key).or_default().push(line);
    }

    let ordered: Vec<&Vec<&Line>> = rows.values().collect();

    let mut regions = Vec::new();
    let mut i = 0;
    while i < ordered.len() {
        // Greedily extend a run of qualifying rows, bounded by the lookahead.
        let mut run = 0;
        while run < MAX_RUN_ROWS
            && i + run < ordered.len()
            && ordered[i + run].len() >= MIN_TABLE_COLUMNS
        {
            run += 1;
        }

        if run >= MIN_TABLE_ROWS {
            regions.push(build_region(&ordered[i..i + run]));
            // Regions never overlap: resume after the consumed rows.
            i += run;
        } else {
            i += 1;
        }
    }

    regions
}

/// Assemble the grid for an accepted run of rows.
fn build_region(run: &[&Vec<&Line>]) -> TableRegion {
    let columns = run.iter().map(|row| row.len()).max().unwrap_or(0);

    let mut bbox: Option<BBox> = None;
    let mut grid = Vec::with_capacity(run.len());

    for row in run {
        let mut cells: Vec<&Line> = (*row).clone();
        cells.sort_by(|a, b| {
            a.bbox
                .x0
                .partial_cmp(&b.bbox.x0)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut texts: Vec<String> = cells.iter().map(|l| l.text.clone()).collect();
        texts.resize(columns, String::new());
        grid.push(texts);

        for cell in &cells {
            bbox = Some(match bbox {
                Some(b) => b.union(&cell.bbox),
                None => cell.bbox,
            });
        }
    }

    TableRegion {
        bbox: bbox.unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0)),
        rows: run.len(),
        columns,
        grid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_line(text: &str, x: f32, y: f32) -> Line {
        Line {
            page: 1,
            text: text.into(),
            bbox: BBox::new(x, y, x + 60.0, y + 12.0),
            font_size: 12.0,
            font: "F1".into(),
        }
    }

    fn three_cell_row(y: f32, a: &str, b: &str, c: &str) -> Vec<Line> {
        vec![
            make_line(a, 100.0, y),
            make_line(b, 250.0, y),
            make_line(c, 400.0, y),
        ]
    }

    #[test]
    fn test_three_by_three_table() {
        let mut lines = Vec::new();
        lines.extend(three_cell_row(700.0, "Subject", "Q1", "Q2"));
        lines.extend(three_cell_row(680.0, "Math", "9.0", "8.5"));
        lines.extend(three_cell_row(660.0, "Science", "8.0", "9.0"));

        let tables = detect_tables(&lines);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows, 3);
        assert_eq!(tables[0].columns, 3);
        assert_eq!(tables[0].grid[1], vec!["Math", "9.0", "8.5"]);
    }

    #[test]
    fn test_single_column_page_yields_nothing() {
        let lines = vec![
            make_line("paragraph one", 72.0, 700.0),
            make_line("paragraph two", 72.0, 680.0),
            make_line("paragraph three", 72.0, 660.0),
            make_line("paragraph four", 72.0, 640.0),
        ];
        assert!(detect_tables(&lines).is_empty());
    }

    #[test]
    fn test_two_rows_not_enough() {
        let mut lines = Vec::new();
        lines.extend(three_cell_row(700.0, "a", "b", "c"));
        lines.extend(three_cell_row(680.0, "d", "e", "f"));
        assert!(detect_tables(&lines).is_empty());
    }

    #[test]
    fn test_ragged_rows_padded_to_max_width() {
        let mut lines = Vec::new();
        lines.extend(three_cell_row(700.0, "Name", "Price", "Qty"));
        lines.push(make_line("Widget", 100.0, 680.0));
        lines.push(make_line("5.00", 250.0, 680.0));
        lines.extend(three_cell_row(660.0, "Gadget", "12.50", "4"));

        let tables = detect_tables(&lines);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns, 3);
        for row in &tables[0].grid {
            assert_eq!(row.len(), 3);
        }
        assert_eq!(tables[0].grid[1], vec!["Widget", "5.00", ""]);
    }

    #[test]
    fn test_cells_sorted_by_x() {
        let mut lines = Vec::new();
        // Cells delivered right-to-left
        for y in [700.0, 680.0, 660.0] {
            lines.push(make_line("right", 400.0, y));
            lines.push(make_line("left", 100.0, y));
        }
        let tables = detect_tables(&lines);
        assert_eq!(tables[0].grid[0], vec!["left", "right"]);
    }

    #[test]
    fn test_region_bbox_is_union() {
        let mut lines = Vec::new();
        lines.extend(three_cell_row(700.0, "a", "b", "c"));
        lines.extend(three_cell_row(680.0, "d", "e", "f"));
        lines.extend(three_cell_row(660.0, "g", "h", "i"));

        let region = &detect_tables(&lines)[0];
        assert_eq!(region.bbox.x0, 100.0);
        assert_eq!(region.bbox.x1, 460.0);
        assert_eq!(region.bbox.y0, 660.0);
        assert_eq!(region.bbox.y1, 712.0);
    }

    #[test]
    fn test_run_capped_at_ten_rows() {
        let mut lines = Vec::new();
        for i in 0..12 {
            let y = 700.0 - i as f32 * 20.0;
            lines.push(make_line("a", 100.0, y));
            lines.push(make_line("b", 250.0, y));
        }

        let tables = detect_tables(&lines);
        // Ten rows consumed by the first region; the two left over are too
        // few to form a second one.
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows, 10);
    }

    #[test]
    fn test_interrupted_runs_stay_separate() {
        let mut lines = Vec::new();
        for y in [700.0, 690.0, 680.0] {
            lines.push(make_line("a", 100.0, y));
            lines.push(make_line("b", 250.0, y));
        }
        // Single-column gap breaks the run
        lines.push(make_line("prose in between", 72.0, 670.0));
        for y in [660.0, 650.0, 640.0] {
            lines.push(make_line("c", 100.0, y));
            lines.push(make_line("d", 250.0, y));
        }

        let tables = detect_tables(&lines);
        assert_eq!(tables.len(), 2);
        assert!(tables.iter().all(|t| t.rows == 3 && t.columns == 2));
    }

    #[test]
    fn test_close_y_values_bucket_together() {
        // 700.04 and 700.01 both round to 700.0 at one decimal place
        let mut lines = vec![
            make_line("a", 100.0, 700.04),
            make_line("b", 250.0, 700.01),
        ];
        for y in [680.0, 660.0] {
            lines.push(make_line("c", 100.0, y));
            lines.push(make_line("d", 250.0, y));
        }

        let tables = detect_tables(&lines);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows, 3);
    }
}
