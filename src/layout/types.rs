//! Core types for the layout engine

use std::collections::HashSet;

use serde::Serialize;

use super::error::LayoutError;

/// A width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Edge insets (top, right, bottom, left)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same inset on every edge
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn zero() -> Self {
        Self::uniform(0.0)
    }

    /// Left + right
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Top + bottom
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    fn values(&self) -> [(&'static str, f64); 4] {
        [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ]
    }
}

/// One layout participant with its sizing preferences.
///
/// Boxes are built by the caller before each pass and never retained by the
/// engine. Margin is consumed by the strategies when positioning; padding is
/// carried for the host and never altered by layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub id: String,
    pub preferred: Size,
    pub min: Size,
    pub flex_grow: f64,
    pub flex_shrink: f64,
    pub margin: Insets,
    pub padding: Insets,
}

impl LayoutBox {
    /// Create a box with a preferred size and no minimum, flex or insets
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            preferred: Size::new(width, height),
            min: Size::zero(),
            flex_grow: 0.0,
            flex_shrink: 0.0,
            margin: Insets::zero(),
            padding: Insets::zero(),
        }
    }

    /// Set the minimum size
    pub fn with_min(mut self, width: f64, height: f64) -> Self {
        self.min = Size::new(width, height);
        self
    }

    /// Set the flex grow/shrink weights
    pub fn with_flex(mut self, grow: f64, shrink: f64) -> Self {
        self.flex_grow = grow;
        self.flex_shrink = shrink;
        self
    }

    /// Set the margin
    pub fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    /// Set the padding
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    /// Preferred width including horizontal margins
    pub fn outer_width(&self) -> f64 {
        self.preferred.width + self.margin.horizontal()
    }

    /// Preferred height including vertical margins
    pub fn outer_height(&self) -> f64 {
        self.preferred.height + self.margin.vertical()
    }

    /// Check the box invariants: non-negative finite values and min <= preferred
    pub fn validate(&self) -> Result<(), LayoutError> {
        let scalars = [
            ("preferred width", self.preferred.width),
            ("preferred height", self.preferred.height),
            ("min width", self.min.width),
            ("min height", self.min.height),
            ("flex grow", self.flex_grow),
            ("flex shrink", self.flex_shrink),
        ];
        for (name, value) in scalars {
            check_non_negative(&self.id, name, value)?;
        }
        for (edge, value) in self.margin.values() {
            check_non_negative(&self.id, &format!("margin {}", edge), value)?;
        }
        for (edge, value) in self.padding.values() {
            check_non_negative(&self.id, &format!("padding {}", edge), value)?;
        }

        if self.min.width > self.preferred.width {
            return Err(LayoutError::invalid_box(
                &self.id,
                format!(
                    "min width {} exceeds preferred width {}",
                    self.min.width, self.preferred.width
                ),
            ));
        }
        if self.min.height > self.preferred.height {
            return Err(LayoutError::invalid_box(
                &self.id,
                format!(
                    "min height {} exceeds preferred height {}",
                    self.min.height, self.preferred.height
                ),
            ));
        }
        Ok(())
    }
}

fn check_non_negative(id: &str, name: &str, value: f64) -> Result<(), LayoutError> {
    if !value.is_finite() {
        return Err(LayoutError::invalid_box(
            id,
            format!("{} must be finite, got {}", name, value),
        ));
    }
    if value < 0.0 {
        return Err(LayoutError::invalid_box(
            id,
            format!("{} must be non-negative, got {}", name, value),
        ));
    }
    Ok(())
}

/// Validate every box and reject duplicate ids
pub fn validate_boxes(boxes: &[LayoutBox]) -> Result<(), LayoutError> {
    let mut seen = HashSet::new();
    for b in boxes {
        b.validate()?;
        if !seen.insert(b.id.as_str()) {
            return Err(LayoutError::DuplicateBoxId { id: b.id.clone() });
        }
    }
    Ok(())
}

/// Min/max bounds a layout result must respect.
///
/// Maximums may be `f64::INFINITY` for an unbounded axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl Envelope {
    pub fn new(min_width: f64, max_width: f64, min_height: f64, max_height: f64) -> Self {
        Self {
            min_width,
            max_width,
            min_height,
            max_height,
        }
    }

    /// No bounds on either axis
    pub fn unbounded() -> Self {
        Self::new(0.0, f64::INFINITY, 0.0, f64::INFINITY)
    }

    /// Exactly this size
    pub fn tight(width: f64, height: f64) -> Self {
        Self::new(width, width, height, height)
    }

    /// Anything from zero up to this size
    pub fn loose(max_width: f64, max_height: f64) -> Self {
        Self::new(0.0, max_width, 0.0, max_height)
    }

    /// Replace the maximum width
    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn has_bounded_width(&self) -> bool {
        self.max_width.is_finite()
    }

    pub fn has_bounded_height(&self) -> bool {
        self.max_height.is_finite()
    }

    pub fn clamp_width(&self, width: f64) -> f64 {
        width.max(self.min_width).min(self.max_width)
    }

    pub fn clamp_height(&self, height: f64) -> f64 {
        height.max(self.min_height).min(self.max_height)
    }

    /// Check that bounds are non-negative, minimums finite and min <= max
    pub fn validate(&self) -> Result<(), LayoutError> {
        let bounds = [
            ("min width", self.min_width),
            ("max width", self.max_width),
            ("min height", self.min_height),
            ("max height", self.max_height),
        ];
        for (name, value) in bounds {
            if value.is_nan() || value < 0.0 {
                return Err(LayoutError::invalid_envelope(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if !self.min_width.is_finite() || !self.min_height.is_finite() {
            return Err(LayoutError::invalid_envelope("minimums must be finite"));
        }
        if self.min_width > self.max_width {
            return Err(LayoutError::invalid_envelope(format!(
                "min width {} exceeds max width {}",
                self.min_width, self.max_width
            )));
        }
        if self.min_height > self.max_height {
            return Err(LayoutError::invalid_envelope(format!(
                "min height {} exceeds max height {}",
                self.min_height, self.max_height
            )));
        }
        Ok(())
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Resolved rectangle for one input box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildLayout {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ChildLayout {
    pub fn new(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if this rectangle overlaps another (shared edges do not count)
    pub fn intersects(&self, other: &ChildLayout) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Outcome of a constraint relaxation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolverReport {
    pub converged: bool,
    pub iterations: usize,
}

/// Output of one layout pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    /// Content width, clamped into the envelope
    pub width: f64,
    /// Content height, clamped into the envelope
    pub height: f64,
    /// Boxes a grid strategy could not place
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unplaced: Vec<String>,
    pub children: Vec<ChildLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverReport>,
}

impl LayoutResult {
    /// Empty result with clamped content size
    pub fn empty(envelope: &Envelope) -> Self {
        Self::new(envelope, 0.0, 0.0, Vec::new())
    }

    /// Build a result, clamping the content size into the envelope
    pub fn new(envelope: &Envelope, width: f64, height: f64, children: Vec<ChildLayout>) -> Self {
        Self {
            width: envelope.clamp_width(width),
            height: envelope.clamp_height(height),
            children,
            unplaced: Vec::new(),
            solver: None,
        }
    }

    /// Look up a child by box id
    pub fn child(&self, id: &str) -> Option<&ChildLayout> {
        self.children.iter().find(|c| c.id == id)
    }

    /// False only when a constraint solve hit its iteration cap
    pub fn converged(&self) -> bool {
        self.solver.map_or(true, |s| s.converged)
    }
}
