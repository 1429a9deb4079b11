//! Layout engine for computing box positions and sizes
//!
//! Every strategy takes the boxes of one pass plus an [`Envelope`] and returns
//! a fresh [`LayoutResult`]. Strategies hold only their tuning values, so a
//! pass never observes state from an earlier one.

pub mod bin_grid;
pub mod config;
pub mod constraint;
pub mod error;
pub mod flow;
pub mod lint;
pub mod masonry;
pub mod types;

pub use bin_grid::{BinGridLayout, PlacementPolicy};
pub use config::LayoutConfig;
pub use constraint::{
    Attribute, AttributeRef, ConstraintLayout, LayoutConstraint, Relation, SolverConfig,
};
pub use error::LayoutError;
pub use flow::{FlowDirection, FlowLayout};
pub use masonry::{HeightPolicy, MasonryLayout};
pub use types::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Selector naming one of the packing strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Masonry,
    BinGrid,
    Flow,
    Constraint,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Masonry => "masonry",
            StrategyKind::BinGrid => "bin-grid",
            StrategyKind::Flow => "flow",
            StrategyKind::Constraint => "constraint",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "masonry" => Ok(StrategyKind::Masonry),
            "bin-grid" | "grid" => Ok(StrategyKind::BinGrid),
            "flow" => Ok(StrategyKind::Flow),
            "constraint" => Ok(StrategyKind::Constraint),
            other => Err(format!(
                "unknown strategy '{}' (expected masonry, bin-grid, flow or constraint)",
                other
            )),
        }
    }
}

/// A configured layout strategy
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Masonry(MasonryLayout),
    BinGrid(BinGridLayout),
    Flow(FlowLayout),
    Constraint(ConstraintLayout),
}

impl Strategy {
    /// Build a strategy of the given kind from shared configuration.
    ///
    /// `constraints` is only used by [`StrategyKind::Constraint`].
    pub fn from_config(
        kind: StrategyKind,
        config: &LayoutConfig,
        constraints: &[LayoutConstraint],
    ) -> Self {
        match kind {
            StrategyKind::Masonry => Strategy::Masonry(MasonryLayout::new(config.columns, config.spacing)),
            StrategyKind::BinGrid => Strategy::BinGrid(BinGridLayout::new(config.grid_size)),
            StrategyKind::Flow => Strategy::Flow(
                FlowLayout::new(config.spacing, config.line_spacing).with_grow(config.flow_grow),
            ),
            StrategyKind::Constraint => Strategy::Constraint(
                ConstraintLayout::new(constraints.to_vec()).with_solver(SolverConfig {
                    max_iterations: config.max_iterations,
                    epsilon: config.epsilon,
                    preferred_sizes: config.preferred_sizes,
                }),
            ),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Masonry(_) => StrategyKind::Masonry,
            Strategy::BinGrid(_) => StrategyKind::BinGrid,
            Strategy::Flow(_) => StrategyKind::Flow,
            Strategy::Constraint(_) => StrategyKind::Constraint,
        }
    }

    /// Run one layout pass
    pub fn layout(&self, boxes: &[LayoutBox], envelope: &Envelope) -> Result<LayoutResult, LayoutError> {
        match self {
            Strategy::Masonry(s) => s.layout(boxes, envelope),
            Strategy::BinGrid(s) => s.layout(boxes, envelope),
            Strategy::Flow(s) => s.layout(boxes, envelope),
            Strategy::Constraint(s) => s.layout(boxes, envelope),
        }
    }
}
