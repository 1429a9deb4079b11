//! Line-wrapping flow packing, the way inline text wraps

use tracing::{debug, trace};

use super::error::LayoutError;
use super::types::{validate_boxes, ChildLayout, Envelope, LayoutBox, LayoutResult};

/// Main axis of the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowDirection {
    /// Left-to-right lines stacked top-to-bottom
    #[default]
    Horizontal,
    /// Top-to-bottom columns; not implemented
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowLayout {
    pub spacing: f64,
    pub line_spacing: f64,
    pub direction: FlowDirection,
    /// Share leftover line space among boxes by flex grow
    pub grow: bool,
}

/// A box assigned to a line, with its resolved width
struct LineItem<'a> {
    source: &'a LayoutBox,
    width: f64,
}

impl LineItem<'_> {
    fn outer_width(&self) -> f64 {
        self.width + self.source.margin.horizontal()
    }
}

#[derive(Default)]
struct Line<'a> {
    items: Vec<LineItem<'a>>,
}

impl Line<'_> {
    fn width(&self, spacing: f64) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        let outer: f64 = self.items.iter().map(LineItem::outer_width).sum();
        outer + (self.items.len() - 1) as f64 * spacing
    }

    fn height(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.source.outer_height())
            .fold(0.0, f64::max)
    }

    /// Widen items by their share of `leftover`, weighted by flex grow
    fn distribute(&mut self, leftover: f64) {
        let total: f64 = self.items.iter().map(|i| i.source.flex_grow).sum();
        if leftover <= 0.0 || total <= 0.0 {
            return;
        }
        for item in &mut self.items {
            item.width += leftover * item.source.flex_grow / total;
        }
    }
}

impl FlowLayout {
    pub fn new(spacing: f64, line_spacing: f64) -> Self {
        Self {
            spacing,
            line_spacing,
            direction: FlowDirection::default(),
            grow: false,
        }
    }

    pub fn with_direction(mut self, direction: FlowDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_grow(mut self, grow: bool) -> Self {
        self.grow = grow;
        self
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if self.direction == FlowDirection::Vertical {
            return Err(LayoutError::Unsupported {
                strategy: "flow",
                feature: "vertical direction",
            });
        }
        for (name, value) in [("spacing", self.spacing), ("line_spacing", self.line_spacing)] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::invalid_parameter(
                    "flow",
                    name,
                    format!("must be a non-negative number, got {}", value),
                ));
            }
        }
        Ok(())
    }

    /// Width a box takes on a line. Oversized boxes that may shrink give up
    /// width down to their minimum; the rest keep their preferred width and
    /// overflow.
    fn resolved_width(b: &LayoutBox, max_width: f64) -> f64 {
        if b.flex_shrink > 0.0 && b.outer_width() > max_width {
            (max_width - b.margin.horizontal()).max(b.min.width)
        } else {
            b.preferred.width
        }
    }

    fn break_lines<'a>(&self, boxes: &'a [LayoutBox], max_width: f64) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        let mut current = Line::default();

        for b in boxes {
            let item = LineItem {
                source: b,
                width: Self::resolved_width(b, max_width),
            };
            let line_width = current.width(self.spacing);
            if !current.items.is_empty() && line_width + item.outer_width() + self.spacing > max_width {
                lines.push(std::mem::take(&mut current));
            }
            current.items.push(item);
        }
        if !current.items.is_empty() {
            lines.push(current);
        }
        lines
    }

    pub fn layout(&self, boxes: &[LayoutBox], envelope: &Envelope) -> Result<LayoutResult, LayoutError> {
        self.validate()?;
        envelope.validate()?;
        validate_boxes(boxes)?;

        let max_width = envelope.max_width;
        let mut lines = self.break_lines(boxes, max_width);

        let mut children = Vec::with_capacity(boxes.len());
        let mut content_width = 0.0f64;
        let mut y = 0.0;

        for (index, line) in lines.iter_mut().enumerate() {
            if self.grow && envelope.has_bounded_width() {
                line.distribute(max_width - line.width(self.spacing));
            }
            if index > 0 {
                y += self.line_spacing;
            }

            let mut x = 0.0;
            for item in &line.items {
                let b = item.source;
                trace!(id = %b.id, line = index, x, y, width = item.width, "flow place");
                children.push(ChildLayout::new(
                    b.id.clone(),
                    x + b.margin.left,
                    y + b.margin.top,
                    item.width,
                    b.preferred.height,
                ));
                x += item.outer_width() + self.spacing;
            }
            content_width = content_width.max(line.width(self.spacing));
            y += line.height();
        }

        debug!(lines = lines.len(), boxes = boxes.len(), content_width, content_height = y, "flow layout");
        Ok(LayoutResult::new(envelope, content_width, y, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::Insets;

    fn positions(result: &LayoutResult) -> Vec<(&str, f64, f64)> {
        result
            .children
            .iter()
            .map(|c| (c.id.as_str(), c.x, c.y))
            .collect()
    }

    #[test]
    fn test_wraps_when_line_full() {
        let boxes = vec![
            LayoutBox::new("a", 40.0, 10.0),
            LayoutBox::new("b", 40.0, 20.0),
            LayoutBox::new("c", 40.0, 10.0),
        ];
        let env = Envelope::loose(100.0, f64::INFINITY);
        let result = FlowLayout::new(10.0, 5.0).layout(&boxes, &env).unwrap();

        assert_eq!(
            positions(&result),
            vec![("a", 0.0, 0.0), ("b", 50.0, 0.0), ("c", 0.0, 25.0)]
        );
        assert_eq!(result.width, 90.0);
        assert_eq!(result.height, 35.0);
    }

    #[test]
    fn test_oversized_box_gets_own_line() {
        let boxes = vec![
            LayoutBox::new("a", 30.0, 10.0),
            LayoutBox::new("big", 150.0, 10.0),
            LayoutBox::new("c", 30.0, 10.0),
        ];
        let env = Envelope::loose(100.0, f64::INFINITY);
        let result = FlowLayout::new(0.0, 0.0).layout(&boxes, &env).unwrap();

        assert_eq!(
            positions(&result),
            vec![("a", 0.0, 0.0), ("big", 0.0, 10.0), ("c", 0.0, 20.0)]
        );
        assert_eq!(result.child("big").map(|c| c.width), Some(150.0));
        assert_eq!(result.width, 100.0);
    }

    #[test]
    fn test_shrinkable_box_fits_envelope() {
        let boxes = vec![LayoutBox::new("big", 150.0, 10.0)
            .with_min(60.0, 0.0)
            .with_flex(0.0, 1.0)];
        let env = Envelope::loose(100.0, f64::INFINITY);
        let result = FlowLayout::new(0.0, 0.0).layout(&boxes, &env).unwrap();
        assert_eq!(result.children[0].width, 100.0);
    }

    #[test]
    fn test_shrink_stops_at_min_width() {
        let boxes = vec![LayoutBox::new("big", 150.0, 10.0)
            .with_min(120.0, 0.0)
            .with_flex(0.0, 1.0)];
        let env = Envelope::loose(100.0, f64::INFINITY);
        let result = FlowLayout::new(0.0, 0.0).layout(&boxes, &env).unwrap();
        assert_eq!(result.children[0].width, 120.0);
    }

    #[test]
    fn test_grow_distributes_leftover() {
        let boxes = vec![
            LayoutBox::new("a", 20.0, 10.0).with_flex(1.0, 0.0),
            LayoutBox::new("b", 20.0, 10.0).with_flex(3.0, 0.0),
        ];
        let env = Envelope::loose(100.0, f64::INFINITY);
        let result = FlowLayout::new(0.0, 0.0)
            .with_grow(true)
            .layout(&boxes, &env)
            .unwrap();

        assert_eq!(result.child("a").map(|c| c.width), Some(35.0));
        assert_eq!(result.child("b").map(|c| (c.x, c.width)), Some((35.0, 65.0)));
        assert_eq!(result.width, 100.0);
    }

    #[test]
    fn test_margins_count_toward_line() {
        let boxes = vec![
            LayoutBox::new("a", 40.0, 10.0).with_margin(Insets::new(2.0, 5.0, 2.0, 5.0)),
            LayoutBox::new("b", 40.0, 10.0),
        ];
        let env = Envelope::loose(90.0, f64::INFINITY);
        let result = FlowLayout::new(0.0, 0.0).layout(&boxes, &env).unwrap();

        assert_eq!(positions(&result), vec![("a", 5.0, 2.0), ("b", 50.0, 0.0)]);
        assert_eq!(result.height, 14.0);
    }

    #[test]
    fn test_vertical_unsupported() {
        let err = FlowLayout::new(0.0, 0.0)
            .with_direction(FlowDirection::Vertical)
            .layout(&[], &Envelope::unbounded())
            .unwrap_err();
        assert!(matches!(err, LayoutError::Unsupported { .. }));
    }

    #[test]
    fn test_unbounded_single_line() {
        let boxes: Vec<_> = (0..5)
            .map(|i| LayoutBox::new(format!("b{}", i), 10.0, 10.0))
            .collect();
        let result = FlowLayout::new(2.0, 2.0)
            .layout(&boxes, &Envelope::unbounded())
            .unwrap();
        assert!(result.children.iter().all(|c| c.y == 0.0));
        assert_eq!(result.width, 58.0);
    }
}
