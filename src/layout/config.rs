//! Configuration for the layout engine

use serde::Deserialize;

/// Tuning values shared by the strategies.
///
/// Breakpoints override `columns` and `spacing`; the rest apply to every
/// breakpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Masonry column count when no breakpoint supplies one
    pub columns: usize,

    /// Gap between boxes (masonry columns, flow items)
    pub spacing: f64,

    /// Cell edge length for the bin grid
    pub grid_size: f64,

    /// Gap between flow lines
    pub line_spacing: f64,

    /// Pass cap for the constraint relaxation
    pub max_iterations: usize,

    /// Smallest change the constraint relaxation counts as a change
    pub epsilon: f64,

    /// Constraint sizes nobody writes read as the preferred size, not 0
    pub preferred_sizes: bool,

    /// Whether flow lines share leftover space by flex grow
    pub flow_grow: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: 2,
            spacing: 8.0,
            grid_size: 20.0,
            line_spacing: 8.0,
            max_iterations: 100,
            epsilon: 0.1,
            preferred_sizes: false,
            flow_grow: false,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the masonry column count
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    /// Set the spacing between boxes
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the bin grid cell size
    pub fn with_grid_size(mut self, grid_size: f64) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Set the spacing between flow lines
    pub fn with_line_spacing(mut self, line_spacing: f64) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    /// Set the solver pass cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Enable leftover-space distribution in flow lines
    pub fn with_flow_grow(mut self, grow: bool) -> Self {
        self.flow_grow = grow;
        self
    }
}
