//! Responsive Layout - box packing strategies switched by viewport breakpoints
//!
//! This library provides masonry, bin-grid, flow and constraint layout
//! strategies, a breakpoint manager that picks one per viewport width, and a
//! TOML scene format tying boxes, constraints and breakpoints together.
//!
//! # Example
//!
//! ```rust
//! use responsive_layout::compute_str;
//!
//! let layout = compute_str(
//!     r#"
//!     [[boxes]]
//!     id = "a"
//!     width = 100
//!     height = 100
//!     "#,
//!     1024.0,
//! )
//! .unwrap();
//! assert_eq!(layout.breakpoint, "tablet");
//! assert!(layout.result.child("a").is_some());
//! ```

pub mod breakpoint;
pub mod error;
pub mod layout;
pub mod parser;
pub mod report;
pub mod scene;

pub use breakpoint::{Breakpoint, BreakpointError, BreakpointManager, BreakpointSet, BreakpointUpdate};
pub use error::ParseError;
pub use layout::{
    Envelope, LayoutBox, LayoutConfig, LayoutConstraint, LayoutError, LayoutResult, Strategy,
    StrategyKind,
};
pub use parser::{parse_constraint, parse_constraints};
pub use scene::{Scene, SceneError};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during the compute pipeline
#[derive(Debug, Error)]
pub enum EngineError {
    /// Error while loading the scene
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Error in constraint expressions
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Error in the breakpoint set
    #[error("breakpoint error: {0}")]
    Breakpoint(#[from] BreakpointError),

    /// Error during layout
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

impl From<Vec<ParseError>> for EngineError {
    fn from(errors: Vec<ParseError>) -> Self {
        EngineError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A scene laid out at one viewport width
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLayout {
    /// Name of the breakpoint that covered the viewport
    pub breakpoint: String,
    pub strategy: StrategyKind,
    pub result: LayoutResult,
}

/// Lay out a scene at a viewport width
///
/// # Example
///
/// ```rust
/// use responsive_layout::{compute, Scene, StrategyKind};
///
/// let scene = Scene::from_str(r#"
///     [[boxes]]
///     id = "a"
///     width = 100
///     height = 100
///
///     [[boxes]]
///     id = "b"
///     width = 100
///     height = 50
/// "#).unwrap();
///
/// let layout = compute(&scene, 400.0).unwrap();
/// assert_eq!(layout.breakpoint, "mobile");
/// assert_eq!(layout.strategy, StrategyKind::Masonry);
/// ```
pub fn compute(scene: &Scene, viewport_width: f64) -> Result<SceneLayout, EngineError> {
    let mut manager = scene.manager();
    let update = manager.update(viewport_width);
    let strategy = manager
        .strategy()
        .map(Strategy::kind)
        .ok_or(LayoutError::NoActiveStrategy)?;

    let envelope = scene.envelope_for(viewport_width);
    let result = manager.layout(&scene.boxes, &envelope)?;
    debug!(
        viewport_width,
        breakpoint = %update.name,
        %strategy,
        boxes = scene.boxes.len(),
        "scene laid out"
    );

    Ok(SceneLayout {
        breakpoint: update.name,
        strategy,
        result,
    })
}

/// Parse a TOML scene and lay it out at a viewport width
pub fn compute_str(source: &str, viewport_width: f64) -> Result<SceneLayout, EngineError> {
    let scene = Scene::from_str(source)?;
    compute(&scene, viewport_width)
}
