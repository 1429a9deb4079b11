//! Column-balanced masonry packing
//!
//! Boxes are dropped one by one into the currently shortest of `columns`
//! equal-width columns. Input order is the only tie-break: among equally
//! short columns the lowest index wins.

use tracing::{debug, trace};

use super::error::LayoutError;
use super::types::{validate_boxes, ChildLayout, Envelope, LayoutBox, LayoutResult};

/// How a box's height is derived once its width is fixed by the column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeightPolicy {
    /// Scale the preferred aspect ratio to the column width
    #[default]
    AspectRatio,
    /// Keep the preferred height
    Preferred,
}

impl HeightPolicy {
    fn height_for(self, b: &LayoutBox, width: f64) -> f64 {
        let height = match self {
            HeightPolicy::AspectRatio if b.preferred.width > 0.0 => {
                width * b.preferred.height / b.preferred.width
            }
            _ => b.preferred.height,
        };
        height.max(b.min.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MasonryLayout {
    pub columns: usize,
    pub spacing: f64,
    pub height_policy: HeightPolicy,
}

impl MasonryLayout {
    pub fn new(columns: usize, spacing: f64) -> Self {
        Self {
            columns,
            spacing,
            height_policy: HeightPolicy::default(),
        }
    }

    pub fn with_height_policy(mut self, policy: HeightPolicy) -> Self {
        self.height_policy = policy;
        self
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if self.columns == 0 {
            return Err(LayoutError::invalid_parameter(
                "masonry",
                "columns",
                "at least one column is required",
            ));
        }
        if !self.spacing.is_finite() || self.spacing < 0.0 {
            return Err(LayoutError::invalid_parameter(
                "masonry",
                "spacing",
                format!("must be a non-negative number, got {}", self.spacing),
            ));
        }
        Ok(())
    }

    /// Width of one column, or `InsufficientWidth` when the gaps alone overflow.
    ///
    /// An unbounded envelope sizes columns to the widest box.
    pub fn column_width(&self, boxes: &[LayoutBox], envelope: &Envelope) -> Result<f64, LayoutError> {
        let gaps = (self.columns - 1) as f64 * self.spacing;
        if !envelope.has_bounded_width() {
            return Ok(boxes.iter().map(LayoutBox::outer_width).fold(0.0, f64::max));
        }
        let width = (envelope.max_width - gaps) / self.columns as f64;
        if width < 0.0 {
            return Err(LayoutError::InsufficientWidth {
                columns: self.columns,
                available: envelope.max_width,
                required: gaps,
            });
        }
        Ok(width)
    }

    pub fn layout(&self, boxes: &[LayoutBox], envelope: &Envelope) -> Result<LayoutResult, LayoutError> {
        self.validate()?;
        envelope.validate()?;
        validate_boxes(boxes)?;

        if boxes.is_empty() {
            return Ok(LayoutResult::empty(envelope));
        }

        let column_width = self.column_width(boxes, envelope)?;
        let mut heights = vec![0.0f64; self.columns];
        let mut children = Vec::with_capacity(boxes.len());

        for b in boxes {
            let width = column_width - b.margin.horizontal();
            if width < b.min.width {
                return Err(LayoutError::InsufficientWidth {
                    columns: self.columns,
                    available: column_width,
                    required: b.min.width + b.margin.horizontal(),
                });
            }
            let height = self.height_policy.height_for(b, width);

            let column = shortest_column(&heights);
            let x = column as f64 * (column_width + self.spacing) + b.margin.left;
            let y = heights[column] + b.margin.top;
            trace!(id = %b.id, column, x, y, width, height, "masonry place");

            heights[column] += b.margin.top + height + b.margin.bottom + self.spacing;
            children.push(ChildLayout::new(b.id.clone(), x, y, width, height));
        }

        let content_width =
            column_width * self.columns as f64 + (self.columns - 1) as f64 * self.spacing;
        let content_height = heights.iter().copied().fold(0.0, f64::max) - self.spacing;
        debug!(
            columns = self.columns,
            column_width,
            boxes = boxes.len(),
            content_height,
            "masonry layout"
        );

        Ok(LayoutResult::new(envelope, content_width, content_height, children))
    }
}

/// Index of the shortest column; the lowest index wins ties
fn shortest_column(heights: &[f64]) -> usize {
    let mut best = 0;
    for (i, &h) in heights.iter().enumerate().skip(1) {
        if h < heights[best] {
            best = i;
        }
    }
    best
}
