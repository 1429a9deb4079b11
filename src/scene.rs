//! Scene files: boxes, constraints, breakpoints and tuning in one TOML document
//!
//! ```toml
//! [layout]
//! grid_size = 20
//!
//! [envelope]
//! max_width = 1200
//!
//! [[boxes]]
//! id = "a"
//! width = 100
//! height = 100
//! constraints = ["a.left = 0"]
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::breakpoint::{Breakpoint, BreakpointError, BreakpointManager, BreakpointSet};
use crate::layout::{
    validate_boxes, Envelope, Insets, LayoutBox, LayoutConfig, LayoutConstraint, LayoutError,
    StrategyKind,
};
use crate::parser::parse_constraints;

/// Errors that can occur when loading or parsing scenes
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse scene TOML: {0}")]
    Toml(#[from] toml::de::Error),
    /// `report` holds the rendered diagnostics for `expr`
    #[error("Invalid constraint `{expr}`:\n{report}")]
    Constraint { expr: String, report: String },
    #[error("Invalid breakpoints: {0}")]
    Breakpoint(#[from] BreakpointError),
    #[error("Invalid scene: {0}")]
    Layout(#[from] LayoutError),
}

/// Built-in mobile / tablet / desktop breakpoints
const DEFAULT_BREAKPOINTS: &str = r#"
[[breakpoints]]
name = "mobile"
min_width = 0
max_width = 768
columns = 1

[[breakpoints]]
name = "tablet"
min_width = 769
max_width = 1024
columns = 2

[[breakpoints]]
name = "desktop"
min_width = 1025
columns = 3
"#;

/// Partial envelope; missing bounds come from the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct EnvelopeBounds {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
}

impl EnvelopeBounds {
    /// Check the bounds as given, treating missing ones as open
    pub fn validate(&self) -> Result<(), LayoutError> {
        Envelope::new(
            self.min_width.unwrap_or(0.0),
            self.max_width.unwrap_or(f64::INFINITY),
            self.min_height.unwrap_or(0.0),
            self.max_height.unwrap_or(f64::INFINITY),
        )
        .validate()
    }
}

/// A loaded, validated scene
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: Option<String>,
    pub config: LayoutConfig,
    pub envelope: EnvelopeBounds,
    pub breakpoints: BreakpointSet,
    pub boxes: Vec<LayoutBox>,
    pub constraints: Vec<LayoutConstraint>,
}

/// TOML structure for deserializing scenes
#[derive(Deserialize)]
struct TomlScene {
    name: Option<String>,
    /// Applies one strategy to every breakpoint
    strategy: Option<StrategyKind>,
    #[serde(default)]
    layout: LayoutConfig,
    #[serde(default)]
    envelope: EnvelopeBounds,
    breakpoints: Option<Vec<Breakpoint>>,
    #[serde(default)]
    boxes: Vec<TomlBox>,
    #[serde(default)]
    constraints: Vec<String>,
}

#[derive(Deserialize)]
struct TomlBreakpoints {
    breakpoints: Vec<Breakpoint>,
}

#[derive(Deserialize)]
struct TomlBox {
    id: String,
    width: f64,
    height: f64,
    #[serde(default)]
    min_width: f64,
    #[serde(default)]
    min_height: f64,
    #[serde(default)]
    flex_grow: f64,
    #[serde(default)]
    flex_shrink: f64,
    #[serde(default)]
    margin: TomlInsets,
    #[serde(default)]
    padding: TomlInsets,
    /// Constraint expressions listed alongside this box
    #[serde(default)]
    constraints: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TomlInsets {
    top: f64,
    right: f64,
    bottom: f64,
    left: f64,
}

impl From<TomlInsets> for Insets {
    fn from(i: TomlInsets) -> Self {
        Insets::new(i.top, i.right, i.bottom, i.left)
    }
}

impl Scene {
    /// Load scene from TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load scene from TOML string
    pub fn from_str(content: &str) -> Result<Self, SceneError> {
        let parsed: TomlScene = toml::from_str(content)?;

        let mut expressions = Vec::new();
        let mut boxes = Vec::with_capacity(parsed.boxes.len());
        for b in parsed.boxes {
            expressions.extend(b.constraints);
            boxes.push(
                LayoutBox::new(b.id, b.width, b.height)
                    .with_min(b.min_width, b.min_height)
                    .with_flex(b.flex_grow, b.flex_shrink)
                    .with_margin(b.margin.into())
                    .with_padding(b.padding.into()),
            );
        }
        expressions.extend(parsed.constraints);
        validate_boxes(&boxes)?;

        let constraints = expressions
            .iter()
            .map(|expr| parse_expression(expr))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect();

        let mut breakpoints = match parsed.breakpoints {
            Some(list) => list,
            None => default_breakpoint_list()?,
        };
        if let Some(kind) = parsed.strategy {
            for bp in &mut breakpoints {
                bp.strategy = kind;
            }
        }

        let scene = Scene {
            name: parsed.name,
            config: parsed.layout,
            envelope: parsed.envelope,
            breakpoints: BreakpointSet::new(breakpoints)?,
            boxes,
            constraints,
        };
        scene.envelope.validate()?;
        Ok(scene)
    }

    /// Replace the strategy of every breakpoint
    pub fn with_strategy(mut self, kind: StrategyKind) -> Result<Self, SceneError> {
        let breakpoints = self
            .breakpoints
            .iter()
            .cloned()
            .map(|bp| bp.with_strategy(kind))
            .collect();
        self.breakpoints = BreakpointSet::new(breakpoints)?;
        Ok(self)
    }

    /// The envelope for a viewport width.
    ///
    /// Width is capped by the viewport; unspecified bounds are open.
    pub fn envelope_for(&self, viewport_width: f64) -> Envelope {
        let bounds = &self.envelope;
        let viewport = if viewport_width.is_nan() || viewport_width < 0.0 {
            0.0
        } else {
            viewport_width
        };
        let max_width = bounds.max_width.map_or(viewport, |w| w.min(viewport));
        let min_width = bounds.min_width.unwrap_or(0.0).min(max_width);
        Envelope::new(
            min_width,
            max_width,
            bounds.min_height.unwrap_or(0.0),
            bounds.max_height.unwrap_or(f64::INFINITY),
        )
    }

    /// A breakpoint manager over this scene's breakpoints, tuning and constraints
    pub fn manager(&self) -> BreakpointManager {
        BreakpointManager::new(
            self.breakpoints.clone(),
            self.config.clone(),
            self.constraints.clone(),
        )
    }
}

/// The built-in mobile / tablet / desktop breakpoints
pub fn default_breakpoints() -> BreakpointSet {
    default_breakpoint_list()
        .and_then(|list| BreakpointSet::new(list).map_err(SceneError::from))
        .expect("Default breakpoints should be valid")
}

fn default_breakpoint_list() -> Result<Vec<Breakpoint>, SceneError> {
    let parsed: TomlBreakpoints = toml::from_str(DEFAULT_BREAKPOINTS)?;
    Ok(parsed.breakpoints)
}

fn parse_expression(expr: &str) -> Result<Vec<LayoutConstraint>, SceneError> {
    parse_constraints(expr).map_err(|errors| SceneError::Constraint {
        expr: expr.to_string(),
        report: errors
            .iter()
            .map(|e| e.format(expr, "constraint"))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}
