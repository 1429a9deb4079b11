//! Lint checks for finished layouts.
//!
//! Runs after a strategy has produced a result and flags mechanical issues
//! the host may want to act on: children spilling past the content box,
//! overlaps, boxes squeezed under their minimum size, content that was
//! dropped, and a constraint solve that never settled.

use std::fmt;

use super::types::{Envelope, LayoutBox, LayoutResult};

/// Geometry comparisons tolerate this much float noise
const TOLERANCE: f64 = 0.01;

/// A lint warning about a layout defect
#[derive(Debug)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    Overflow,
    Overlap,
    MinSize,
    Unplaced,
    Convergence,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Overflow => write!(f, "overflow"),
            LintCategory::Overlap => write!(f, "overlap"),
            LintCategory::MinSize => write!(f, "min-size"),
            LintCategory::Unplaced => write!(f, "unplaced"),
            LintCategory::Convergence => write!(f, "convergence"),
        }
    }
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// Run all lint checks on a completed layout.
pub fn check(result: &LayoutResult, boxes: &[LayoutBox], envelope: &Envelope) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    check_overflow(result, envelope, &mut warnings);
    check_overlaps(result, &mut warnings);
    check_min_size(result, boxes, &mut warnings);
    check_unplaced(result, &mut warnings);
    check_convergence(result, &mut warnings);
    warnings
}

fn check_overflow(result: &LayoutResult, envelope: &Envelope, warnings: &mut Vec<LintWarning>) {
    if result.width > envelope.max_width + TOLERANCE {
        warnings.push(LintWarning {
            category: LintCategory::Overflow,
            message: format!(
                "content width {} exceeds envelope max width {}",
                result.width, envelope.max_width
            ),
        });
    }
    for child in &result.children {
        if child.right() > result.width + TOLERANCE {
            warnings.push(LintWarning {
                category: LintCategory::Overflow,
                message: format!(
                    "\"{}\" extends to x={} past content width {}",
                    child.id,
                    child.right(),
                    result.width
                ),
            });
        }
    }
}

fn check_overlaps(result: &LayoutResult, warnings: &mut Vec<LintWarning>) {
    for (i, a) in result.children.iter().enumerate() {
        for b in &result.children[i + 1..] {
            if a.intersects(b) {
                warnings.push(LintWarning {
                    category: LintCategory::Overlap,
                    message: format!("\"{}\" overlaps \"{}\"", a.id, b.id),
                });
            }
        }
    }
}

fn check_min_size(result: &LayoutResult, boxes: &[LayoutBox], warnings: &mut Vec<LintWarning>) {
    for b in boxes {
        let Some(child) = result.child(&b.id) else {
            continue;
        };
        if child.width + TOLERANCE < b.min.width || child.height + TOLERANCE < b.min.height {
            warnings.push(LintWarning {
                category: LintCategory::MinSize,
                message: format!(
                    "\"{}\" resolved to {}x{}, below its minimum {}x{}",
                    b.id, child.width, child.height, b.min.width, b.min.height
                ),
            });
        }
    }
}

fn check_unplaced(result: &LayoutResult, warnings: &mut Vec<LintWarning>) {
    for id in &result.unplaced {
        warnings.push(LintWarning {
            category: LintCategory::Unplaced,
            message: format!("\"{}\" did not fit and was left out", id),
        });
    }
}

fn check_convergence(result: &LayoutResult, warnings: &mut Vec<LintWarning>) {
    if let Some(report) = result.solver {
        if !report.converged {
            warnings.push(LintWarning {
                category: LintCategory::Convergence,
                message: format!(
                    "constraints still changing after {} passes",
                    report.iterations
                ),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{ChildLayout, SolverReport};

    fn categories(warnings: &[LintWarning]) -> Vec<LintCategory> {
        warnings.iter().map(|w| w.category).collect()
    }

    #[test]
    fn test_clean_layout_has_no_warnings() {
        let env = Envelope::loose(100.0, 100.0);
        let result = LayoutResult::new(
            &env,
            100.0,
            50.0,
            vec![
                ChildLayout::new("a", 0.0, 0.0, 50.0, 50.0),
                ChildLayout::new("b", 50.0, 0.0, 50.0, 50.0),
            ],
        );
        let boxes = vec![LayoutBox::new("a", 50.0, 50.0), LayoutBox::new("b", 50.0, 50.0)];
        assert!(check(&result, &boxes, &env).is_empty());
    }

    #[test]
    fn test_overflow_and_overlap() {
        let env = Envelope::loose(100.0, 100.0);
        let result = LayoutResult::new(
            &env,
            100.0,
            50.0,
            vec![
                ChildLayout::new("a", 0.0, 0.0, 150.0, 50.0),
                ChildLayout::new("b", 50.0, 0.0, 50.0, 50.0),
            ],
        );
        let warnings = check(&result, &[], &env);
        assert_eq!(categories(&warnings), vec![LintCategory::Overflow, LintCategory::Overlap]);
        assert!(warnings[1].to_string().starts_with("[overlap]"));
    }

    #[test]
    fn test_min_size_unplaced_and_convergence() {
        let env = Envelope::unbounded();
        let mut result = LayoutResult::new(&env, 10.0, 10.0, vec![ChildLayout::new("a", 0.0, 0.0, 5.0, 10.0)]);
        result.unplaced.push("b".to_string());
        result.solver = Some(SolverReport {
            converged: false,
            iterations: 100,
        });
        let boxes = vec![LayoutBox::new("a", 20.0, 10.0).with_min(8.0, 0.0)];
        let warnings = check(&result, &boxes, &env);
        assert_eq!(
            categories(&warnings),
            vec![LintCategory::MinSize, LintCategory::Unplaced, LintCategory::Convergence]
        );
    }
}
