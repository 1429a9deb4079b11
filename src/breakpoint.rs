//! Responsive breakpoints
//!
//! A [`BreakpointSet`] maps viewport widths onto named breakpoints, each of
//! which selects a layout strategy and its tuning values. The
//! [`BreakpointManager`] is the only stateful piece of the engine: it owns the
//! active breakpoint and swaps the strategy when a resize crosses a boundary.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::layout::{
    Envelope, LayoutBox, LayoutConfig, LayoutConstraint, LayoutError, LayoutResult, Strategy,
    StrategyKind,
};

/// Widths within this distance of the previous range's end count as
/// contiguous (whole-pixel ranges like `[0, 768]`, `[769, 1024]`).
const SEAM_TOLERANCE: f64 = 1.0;

/// Errors in a breakpoint configuration, detected at setup
#[derive(Debug, Error, PartialEq)]
pub enum BreakpointError {
    #[error("no breakpoints configured")]
    Empty,

    #[error("duplicate breakpoint name '{name}'")]
    DuplicateName { name: String },

    #[error("invalid range for breakpoint '{name}': {reason}")]
    InvalidRange { name: String, reason: String },

    #[error("invalid {setting} for breakpoint '{name}': {reason}")]
    InvalidSetting {
        name: String,
        setting: &'static str,
        reason: String,
    },

    #[error("breakpoints '{first}' and '{second}' overlap")]
    Overlap { first: String, second: String },

    /// A viewport width that no breakpoint covers
    #[error("no breakpoint matches width {width}")]
    NoBreakpointMatch { width: f64 },
}

/// A named viewport-width range with its layout selection
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Breakpoint {
    pub name: String,
    pub min_width: f64,
    #[serde(default = "unbounded")]
    pub max_width: f64,
    #[serde(default = "default_columns")]
    pub columns: usize,
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    #[serde(default = "default_strategy")]
    pub strategy: StrategyKind,
}

fn unbounded() -> f64 {
    f64::INFINITY
}

fn default_columns() -> usize {
    1
}

fn default_spacing() -> f64 {
    LayoutConfig::default().spacing
}

fn default_strategy() -> StrategyKind {
    StrategyKind::Masonry
}

impl Breakpoint {
    pub fn new(name: impl Into<String>, min_width: f64, max_width: f64) -> Self {
        Self {
            name: name.into(),
            min_width,
            max_width,
            columns: default_columns(),
            spacing: default_spacing(),
            strategy: default_strategy(),
        }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn contains(&self, width: f64) -> bool {
        width >= self.min_width && width <= self.max_width
    }

    /// Build the strategy this breakpoint selects, with its own columns and
    /// spacing layered over the shared configuration
    pub fn strategy(&self, config: &LayoutConfig, constraints: &[LayoutConstraint]) -> Strategy {
        let tuned = config
            .clone()
            .with_columns(self.columns)
            .with_spacing(self.spacing);
        Strategy::from_config(self.strategy, &tuned, constraints)
    }
}

/// A validated, sorted list of breakpoints covering `[0, inf)`
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointSet {
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointSet {
    /// Sort by `min_width` and validate coverage
    pub fn new(mut breakpoints: Vec<Breakpoint>) -> Result<Self, BreakpointError> {
        if breakpoints.is_empty() {
            return Err(BreakpointError::Empty);
        }
        breakpoints.sort_by(|a, b| a.min_width.total_cmp(&b.min_width));

        for (i, bp) in breakpoints.iter().enumerate() {
            if breakpoints[..i].iter().any(|other| other.name == bp.name) {
                return Err(BreakpointError::DuplicateName {
                    name: bp.name.clone(),
                });
            }
            if bp.min_width.is_nan() || bp.max_width.is_nan() || bp.min_width < 0.0 {
                return Err(BreakpointError::InvalidRange {
                    name: bp.name.clone(),
                    reason: "bounds must be non-negative numbers".to_string(),
                });
            }
            if bp.min_width > bp.max_width {
                return Err(BreakpointError::InvalidRange {
                    name: bp.name.clone(),
                    reason: format!("min width {} exceeds max width {}", bp.min_width, bp.max_width),
                });
            }
            if bp.columns == 0 {
                return Err(BreakpointError::InvalidSetting {
                    name: bp.name.clone(),
                    setting: "columns",
                    reason: "at least one column is required".to_string(),
                });
            }
            if !bp.spacing.is_finite() || bp.spacing < 0.0 {
                return Err(BreakpointError::InvalidSetting {
                    name: bp.name.clone(),
                    setting: "spacing",
                    reason: format!("must be a non-negative number, got {}", bp.spacing),
                });
            }
        }

        if breakpoints[0].min_width > 0.0 {
            return Err(BreakpointError::NoBreakpointMatch { width: 0.0 });
        }
        for pair in breakpoints.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.min_width <= prev.max_width {
                return Err(BreakpointError::Overlap {
                    first: prev.name.clone(),
                    second: next.name.clone(),
                });
            }
            if next.min_width - prev.max_width > SEAM_TOLERANCE {
                return Err(BreakpointError::NoBreakpointMatch {
                    width: prev.max_width + SEAM_TOLERANCE,
                });
            }
        }
        let last = &breakpoints[breakpoints.len() - 1];
        if last.max_width.is_finite() {
            return Err(BreakpointError::NoBreakpointMatch {
                width: last.max_width + SEAM_TOLERANCE,
            });
        }

        Ok(Self { breakpoints })
    }

    /// The breakpoint covering `width`.
    ///
    /// Total on a validated set: a width inside a one-pixel seam resolves to
    /// the breakpoint below it, and negative or NaN widths resolve like 0.
    pub fn resolve(&self, width: f64) -> &Breakpoint {
        let width = if width.is_nan() { 0.0 } else { width.max(0.0) };
        self.breakpoints
            .iter()
            .rev()
            .find(|bp| bp.min_width <= width)
            .unwrap_or(&self.breakpoints[0])
    }

    pub fn get(&self, name: &str) -> Option<&Breakpoint> {
        self.breakpoints.iter().find(|bp| bp.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }
}

/// Outcome of a viewport update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointUpdate {
    pub changed: bool,
    pub name: String,
}

/// Owns the active breakpoint and its strategy
#[derive(Debug)]
pub struct BreakpointManager {
    breakpoints: BreakpointSet,
    config: LayoutConfig,
    constraints: Vec<LayoutConstraint>,
    active: Option<(String, Strategy)>,
}

impl BreakpointManager {
    /// Create a manager with no active breakpoint.
    ///
    /// `constraints` feeds breakpoints that select the constraint strategy.
    pub fn new(
        breakpoints: BreakpointSet,
        config: LayoutConfig,
        constraints: Vec<LayoutConstraint>,
    ) -> Self {
        Self {
            breakpoints,
            config,
            constraints,
            active: None,
        }
    }

    /// Apply a new viewport width. Call once per size-change notification.
    pub fn update(&mut self, width: f64) -> BreakpointUpdate {
        let bp = self.breakpoints.resolve(width);
        let previous = self.active.as_ref().map(|(name, _)| name.as_str());

        if previous == Some(bp.name.as_str()) {
            debug!(width, breakpoint = %bp.name, "viewport update within breakpoint");
            return BreakpointUpdate {
                changed: false,
                name: bp.name.clone(),
            };
        }

        info!(
            width,
            from = previous.unwrap_or("<none>"),
            to = %bp.name,
            strategy = %bp.strategy,
            "breakpoint changed"
        );
        let strategy = bp.strategy(&self.config, &self.constraints);
        let name = bp.name.clone();
        self.active = Some((name.clone(), strategy));
        BreakpointUpdate {
            changed: true,
            name,
        }
    }

    /// The active breakpoint, if `update` has been called
    pub fn active(&self) -> Option<&Breakpoint> {
        self.active
            .as_ref()
            .and_then(|(name, _)| self.breakpoints.get(name))
    }

    /// The strategy of the active breakpoint
    pub fn strategy(&self) -> Option<&Strategy> {
        self.active.as_ref().map(|(_, strategy)| strategy)
    }

    pub fn breakpoints(&self) -> &BreakpointSet {
        &self.breakpoints
    }

    /// Lay out with the active strategy
    pub fn layout(&self, boxes: &[LayoutBox], envelope: &Envelope) -> Result<LayoutResult, LayoutError> {
        self.strategy()
            .ok_or(LayoutError::NoActiveStrategy)?
            .layout(boxes, envelope)
    }

    /// Tear the manager down, returning its breakpoint set
    pub fn dispose(self) -> BreakpointSet {
        debug!(active = ?self.active.as_ref().map(|(name, _)| name), "breakpoint manager disposed");
        self.breakpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> BreakpointSet {
        BreakpointSet::new(vec![
            Breakpoint::new("mobile", 0.0, 768.0),
            Breakpoint::new("tablet", 769.0, 1024.0).with_columns(2),
            Breakpoint::new("desktop", 1025.0, f64::INFINITY).with_columns(3),
        ])
        .expect("valid breakpoints")
    }

    #[test]
    fn test_resolve() {
        let set = standard();
        assert_eq!(set.resolve(800.0).name, "tablet");
        assert_eq!(set.resolve(2000.0).name, "desktop");
        assert_eq!(set.resolve(0.0).name, "mobile");
        assert_eq!(set.resolve(768.0).name, "mobile");
        assert_eq!(set.resolve(768.5).name, "mobile");
        assert_eq!(set.resolve(1024.0).name, "tablet");
        assert_eq!(set.resolve(-5.0).name, "mobile");
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let set = BreakpointSet::new(vec![
            Breakpoint::new("wide", 500.0, f64::INFINITY),
            Breakpoint::new("narrow", 0.0, 499.0),
        ])
        .unwrap();
        let names: Vec<_> = set.iter().map(|bp| bp.name.as_str()).collect();
        assert_eq!(names, vec!["narrow", "wide"]);
    }

    #[test]
    fn test_gap_rejected() {
        let err = BreakpointSet::new(vec![
            Breakpoint::new("a", 0.0, 100.0),
            Breakpoint::new("b", 200.0, f64::INFINITY),
        ])
        .unwrap_err();
        assert_eq!(err, BreakpointError::NoBreakpointMatch { width: 101.0 });
    }

    #[test]
    fn test_bounded_top_rejected() {
        let err = BreakpointSet::new(vec![Breakpoint::new("a", 0.0, 100.0)]).unwrap_err();
        assert!(matches!(err, BreakpointError::NoBreakpointMatch { .. }));
    }

    #[test]
    fn test_missing_zero_rejected() {
        let err = BreakpointSet::new(vec![Breakpoint::new("a", 10.0, f64::INFINITY)]).unwrap_err();
        assert_eq!(err, BreakpointError::NoBreakpointMatch { width: 0.0 });
    }

    #[test]
    fn test_overlap_rejected() {
        let err = BreakpointSet::new(vec![
            Breakpoint::new("a", 0.0, 500.0),
            Breakpoint::new("b", 400.0, f64::INFINITY),
        ])
        .unwrap_err();
        assert!(matches!(err, BreakpointError::Overlap { .. }));
    }

    #[test]
    fn test_duplicate_and_empty_rejected() {
        assert_eq!(BreakpointSet::new(vec![]).unwrap_err(), BreakpointError::Empty);
        let err = BreakpointSet::new(vec![
            Breakpoint::new("a", 0.0, 10.0),
            Breakpoint::new("a", 11.0, f64::INFINITY),
        ])
        .unwrap_err();
        assert!(matches!(err, BreakpointError::DuplicateName { .. }));
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut manager = BreakpointManager::new(standard(), LayoutConfig::default(), vec![]);
        assert!(manager.active().is_none());

        let first = manager.update(800.0);
        assert_eq!(first, BreakpointUpdate { changed: true, name: "tablet".to_string() });
        let second = manager.update(800.0);
        assert_eq!(second, BreakpointUpdate { changed: false, name: "tablet".to_string() });
        let third = manager.update(900.0);
        assert!(!third.changed);
        let fourth = manager.update(300.0);
        assert_eq!(fourth.name, "mobile");
        assert!(fourth.changed);
    }

    #[test]
    fn test_update_swaps_strategy() {
        let mut manager = BreakpointManager::new(standard(), LayoutConfig::default(), vec![]);
        manager.update(1200.0);
        match manager.strategy() {
            Some(Strategy::Masonry(m)) => assert_eq!(m.columns, 3),
            other => panic!("Expected masonry, got: {:?}", other),
        }
        manager.update(800.0);
        match manager.strategy() {
            Some(Strategy::Masonry(m)) => assert_eq!(m.columns, 2),
            other => panic!("Expected masonry, got: {:?}", other),
        }
    }

    #[test]
    fn test_layout_before_update_fails() {
        let manager = BreakpointManager::new(standard(), LayoutConfig::default(), vec![]);
        let err = manager.layout(&[], &Envelope::unbounded()).unwrap_err();
        assert!(matches!(err, LayoutError::NoActiveStrategy));
    }

    #[test]
    fn test_dispose_returns_set() {
        let mut manager = BreakpointManager::new(standard(), LayoutConfig::default(), vec![]);
        manager.update(100.0);
        let set = manager.dispose();
        assert_eq!(set.len(), 3);
    }
}
