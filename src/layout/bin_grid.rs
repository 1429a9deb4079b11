//! Discrete-cell bin packing
//!
//! Each box claims a rectangular block of square cells sized to its outer
//! preferred size, rounded up to whole cells. Boxes that find no free block
//! are left out of the result and listed in `LayoutResult::unplaced`.

use tracing::{debug, trace, warn};

use super::error::LayoutError;
use super::types::{validate_boxes, ChildLayout, Envelope, LayoutBox, LayoutResult};

/// Slack for float noise when converting sizes to cell counts
const CELL_EPSILON: f64 = 1e-9;

/// How a free block is chosen for a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPolicy {
    /// First free block in row-major order (top-to-bottom, left-to-right).
    /// Simple and deterministic, but can strand space a later box needed.
    #[default]
    FirstFit,
}

impl PlacementPolicy {
    /// Find a free `(row, col)` for a block of `span_cols x span_rows` cells
    pub fn find_slot(self, grid: &OccupancyGrid, span_cols: usize, span_rows: usize) -> Option<(usize, usize)> {
        match self {
            PlacementPolicy::FirstFit => grid.first_fit(span_cols, span_rows),
        }
    }
}

/// A claimed block of cells, end-exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellBlock {
    row: usize,
    col: usize,
    end_row: usize,
    end_col: usize,
}

impl CellBlock {
    fn new(row: usize, col: usize, span_cols: usize, span_rows: usize) -> Option<Self> {
        Some(Self {
            row,
            col,
            end_row: row.checked_add(span_rows)?,
            end_col: col.checked_add(span_cols)?,
        })
    }

    fn intersects(&self, other: &CellBlock) -> bool {
        self.row < other.end_row && other.row < self.end_row && self.col < other.end_col && other.col < self.end_col
    }
}

/// Cell occupancy kept as the list of claimed blocks.
///
/// With `max_rows == None` the grid is open downward. Cost depends on the
/// number of placed boxes, never on cell counts.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    cols: usize,
    max_rows: Option<usize>,
    blocks: Vec<CellBlock>,
}

impl OccupancyGrid {
    pub fn new(cols: usize, max_rows: Option<usize>) -> Self {
        Self {
            cols,
            max_rows,
            blocks: Vec::new(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Rows down to the lowest claimed block
    pub fn rows(&self) -> usize {
        self.blocks.iter().map(|b| b.end_row).max().unwrap_or(0)
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.blocks
            .iter()
            .any(|b| (b.row..b.end_row).contains(&row) && (b.col..b.end_col).contains(&col))
    }

    /// True when every cell of the block is inside the grid and free
    pub fn is_free(&self, row: usize, col: usize, span_cols: usize, span_rows: usize) -> bool {
        let Some(block) = CellBlock::new(row, col, span_cols, span_rows) else {
            return false;
        };
        if block.end_col > self.cols {
            return false;
        }
        if self.max_rows.is_some_and(|max| block.end_row > max) {
            return false;
        }
        !self.blocks.iter().any(|b| b.intersects(&block))
    }

    /// Row-major first fit.
    ///
    /// The topmost-leftmost free block always starts on row 0 or the bottom
    /// edge of a claimed block, and on column 0 or the right edge of one, so
    /// only those candidates are tried.
    fn first_fit(&self, span_cols: usize, span_rows: usize) -> Option<(usize, usize)> {
        if span_cols > self.cols || self.max_rows.is_some_and(|max| span_rows > max) {
            return None;
        }
        let mut rows: Vec<usize> = std::iter::once(0).chain(self.blocks.iter().map(|b| b.end_row)).collect();
        let mut cols: Vec<usize> = std::iter::once(0).chain(self.blocks.iter().map(|b| b.end_col)).collect();
        rows.sort_unstable();
        rows.dedup();
        cols.sort_unstable();
        cols.dedup();

        rows.iter()
            .flat_map(|&row| cols.iter().map(move |&col| (row, col)))
            .find(|&(row, col)| self.is_free(row, col, span_cols, span_rows))
    }

    /// Mark a block occupied
    pub fn occupy(&mut self, row: usize, col: usize, span_cols: usize, span_rows: usize) {
        if let Some(block) = CellBlock::new(row, col, span_cols, span_rows) {
            self.blocks.push(block);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinGridLayout {
    pub grid_size: f64,
    pub placement: PlacementPolicy,
}

impl BinGridLayout {
    pub fn new(grid_size: f64) -> Self {
        Self {
            grid_size,
            placement: PlacementPolicy::default(),
        }
    }

    pub fn with_placement(mut self, placement: PlacementPolicy) -> Self {
        self.placement = placement;
        self
    }

    /// Number of cells needed to cover `length`, at least one.
    ///
    /// `None` when the count does not fit in `usize`.
    fn cells_for(&self, length: f64) -> Option<usize> {
        let cells = ((length / self.grid_size) - CELL_EPSILON).ceil().max(1.0);
        (cells < usize::MAX as f64).then_some(cells as usize)
    }

    fn span(&self, b: &LayoutBox) -> Option<(usize, usize)> {
        Some((self.cells_for(b.outer_width())?, self.cells_for(b.outer_height())?))
    }

    pub fn layout(&self, boxes: &[LayoutBox], envelope: &Envelope) -> Result<LayoutResult, LayoutError> {
        if !self.grid_size.is_finite() || self.grid_size <= 0.0 {
            return Err(LayoutError::invalid_parameter(
                "bin-grid",
                "grid_size",
                format!("must be a positive number, got {}", self.grid_size),
            ));
        }
        envelope.validate()?;
        validate_boxes(boxes)?;

        let cols = if envelope.has_bounded_width() {
            (envelope.max_width / self.grid_size + CELL_EPSILON).floor() as usize
        } else {
            boxes
                .iter()
                .filter_map(|b| self.span(b))
                .fold(0usize, |total, (span_cols, _)| total.saturating_add(span_cols))
        };
        let max_rows = envelope
            .has_bounded_height()
            .then(|| (envelope.max_height / self.grid_size + CELL_EPSILON).floor() as usize);
        let mut grid = OccupancyGrid::new(cols, max_rows);

        let mut children = Vec::with_capacity(boxes.len());
        let mut unplaced = Vec::new();
        let mut right_col = 0usize;
        let mut bottom_row = 0usize;

        for b in boxes {
            let Some((span_cols, span_rows)) = self.span(b) else {
                warn!(id = %b.id, "box is too large for any grid, leaving it unplaced");
                unplaced.push(b.id.clone());
                continue;
            };
            match self.placement.find_slot(&grid, span_cols, span_rows) {
                Some((row, col)) => {
                    grid.occupy(row, col, span_cols, span_rows);
                    right_col = right_col.max(col.saturating_add(span_cols));
                    bottom_row = bottom_row.max(row.saturating_add(span_rows));

                    let x = col as f64 * self.grid_size + b.margin.left;
                    let y = row as f64 * self.grid_size + b.margin.top;
                    trace!(id = %b.id, row, col, span_cols, span_rows, "grid place");
                    children.push(ChildLayout::new(
                        b.id.clone(),
                        x,
                        y,
                        b.preferred.width,
                        b.preferred.height,
                    ));
                }
                None => {
                    warn!(id = %b.id, span_cols, span_rows, "box does not fit the grid, leaving it unplaced");
                    unplaced.push(b.id.clone());
                }
            }
        }

        debug!(
            cols,
            rows = grid.rows(),
            placed = children.len(),
            unplaced = unplaced.len(),
            "bin grid layout"
        );

        let mut result = LayoutResult::new(
            envelope,
            right_col as f64 * self.grid_size,
            bottom_row as f64 * self.grid_size,
            children,
        );
        result.unplaced = unplaced;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_for_rounds_up() {
        let layout = BinGridLayout::new(20.0);
        assert_eq!(layout.cells_for(60.0), Some(3));
        assert_eq!(layout.cells_for(61.0), Some(4));
        assert_eq!(layout.cells_for(0.0), Some(1));
        assert_eq!(layout.cells_for(1e300), None);
    }

    #[test]
    fn test_second_box_unplaced_in_small_grid() {
        let boxes = vec![LayoutBox::new("a", 60.0, 60.0), LayoutBox::new("b", 60.0, 60.0)];
        let env = Envelope::loose(100.0, 100.0);
        let result = BinGridLayout::new(20.0).layout(&boxes, &env).unwrap();

        assert_eq!(result.child("a"), Some(&ChildLayout::new("a", 0.0, 0.0, 60.0, 60.0)));
        assert!(result.child("b").is_none());
        assert_eq!(result.unplaced, vec!["b".to_string()]);
        assert_eq!(result.height, 60.0);
    }

    #[test]
    fn test_second_box_below_when_room() {
        let boxes = vec![LayoutBox::new("a", 60.0, 60.0), LayoutBox::new("b", 60.0, 60.0)];
        let env = Envelope::loose(100.0, 120.0);
        let result = BinGridLayout::new(20.0).layout(&boxes, &env).unwrap();

        assert_eq!(result.child("b").map(|c| (c.x, c.y)), Some((0.0, 60.0)));
        assert!(result.unplaced.is_empty());
        assert_eq!(result.height, 120.0);
    }

    #[test]
    fn test_first_fit_fills_gaps() {
        let boxes = vec![
            LayoutBox::new("wide", 60.0, 20.0),
            LayoutBox::new("tall", 40.0, 60.0),
            LayoutBox::new("small", 20.0, 20.0),
        ];
        let env = Envelope::loose(100.0, 100.0);
        let result = BinGridLayout::new(20.0).layout(&boxes, &env).unwrap();

        assert_eq!(result.child("tall").map(|c| (c.x, c.y)), Some((60.0, 0.0)));
        assert_eq!(result.child("small").map(|c| (c.x, c.y)), Some((0.0, 20.0)));
    }

    #[test]
    fn test_unbounded_height_grows() {
        let boxes: Vec<_> = (0..4)
            .map(|i| LayoutBox::new(format!("b{}", i), 40.0, 40.0))
            .collect();
        let env = Envelope::loose(80.0, f64::INFINITY);
        let result = BinGridLayout::new(20.0).layout(&boxes, &env).unwrap();

        assert!(result.unplaced.is_empty());
        assert_eq!(result.child("b3").map(|c| (c.x, c.y)), Some((40.0, 40.0)));
        assert_eq!(result.height, 80.0);
    }

    #[test]
    fn test_box_wider_than_grid_unplaced() {
        let boxes = vec![LayoutBox::new("huge", 500.0, 20.0)];
        let env = Envelope::loose(100.0, f64::INFINITY);
        let result = BinGridLayout::new(20.0).layout(&boxes, &env).unwrap();
        assert_eq!(result.unplaced, vec!["huge".to_string()]);
    }

    #[test]
    fn test_invalid_grid_size() {
        let err = BinGridLayout::new(0.0)
            .layout(&[], &Envelope::unbounded())
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidParameter { name: "grid_size", .. }));
    }

    #[test]
    fn test_occupancy_grid_bounds() {
        let mut grid = OccupancyGrid::new(3, Some(2));
        assert!(grid.is_free(0, 0, 3, 2));
        assert!(!grid.is_free(0, 1, 3, 1));
        grid.occupy(0, 0, 1, 1);
        assert!(grid.is_occupied(0, 0));
        assert!(!grid.is_free(0, 0, 2, 1));
        assert_eq!(PlacementPolicy::FirstFit.find_slot(&grid, 2, 1), Some((0, 1)));
    }

    #[test]
    fn test_huge_boxes_unplaced_without_overflow() {
        let boxes = vec![
            LayoutBox::new("huge-1", 1e300, 20.0),
            LayoutBox::new("huge-2", 1e300, 20.0),
            LayoutBox::new("small", 20.0, 20.0),
        ];
        let result = BinGridLayout::new(20.0).layout(&boxes, &Envelope::unbounded()).unwrap();
        assert_eq!(result.unplaced, vec!["huge-1".to_string(), "huge-2".to_string()]);
        assert_eq!(result.child("small").map(|c| (c.x, c.y)), Some((0.0, 0.0)));
    }

    #[test]
    fn test_very_tall_box_in_open_grid() {
        let boxes = vec![LayoutBox::new("tall", 20.0, 2e12), LayoutBox::new("next", 20.0, 20.0)];
        let env = Envelope::loose(20.0, f64::INFINITY);
        let result = BinGridLayout::new(20.0).layout(&boxes, &env).unwrap();

        assert!(result.unplaced.is_empty());
        assert_eq!(result.child("tall").map(|c| (c.x, c.y)), Some((0.0, 0.0)));
        assert_eq!(result.child("next").map(|c| (c.x, c.y)), Some((0.0, 2e12)));
        assert_eq!(result.height, 2e12 + 20.0);
    }

    #[test]
    fn test_tall_box_over_bounded_grid_unplaced() {
        let boxes = vec![LayoutBox::new("tall", 20.0, 2e12)];
        let env = Envelope::loose(20.0, 100.0);
        let result = BinGridLayout::new(20.0).layout(&boxes, &env).unwrap();
        assert_eq!(result.unplaced, vec!["tall".to_string()]);
    }

    #[test]
    fn test_fine_grid_over_large_envelope() {
        let boxes = vec![LayoutBox::new("a", 10.0, 10.0), LayoutBox::new("b", 10.0, 10.0)];
        let env = Envelope::loose(1e5, 1e5);
        let result = BinGridLayout::new(1.0).layout(&boxes, &env).unwrap();

        assert_eq!(result.child("b").map(|c| (c.x, c.y)), Some((10.0, 0.0)));
        assert_eq!(result.width, 20.0);
    }
}
