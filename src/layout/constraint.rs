//! Iterative relaxation solver for declarative positioning
//!
//! Constraints are applied as assignments, highest priority first, in
//! repeated passes until a pass changes nothing or the pass cap is reached.
//!
//! Every attribute starts at 0 until a constraint writes it, sizes included.
//! `SolverConfig::preferred_sizes` switches untouched sizes to the box's
//! preferred size instead.
//!
//! Inequality relations (`>=`, `<=`) are accepted but solved exactly like
//! equalities. Honoring them needs a proper linear-programming solver, which
//! this engine does not have.
//!
//! Children go wherever their constraints put them, so unlike the packing
//! strategies a child may extend past the envelope's maximum width or
//! height. The reported content size is still clamped to the envelope;
//! `lint::check` flags the overflow.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace, warn};

use super::error::LayoutError;
use super::types::{validate_boxes, ChildLayout, Envelope, LayoutBox, LayoutResult, SolverReport};

/// Default priority for constraints that do not state one
pub const DEFAULT_PRIORITY: u32 = 1000;

/// A constrainable attribute of a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Left,
    Right,
    Top,
    Bottom,
    Width,
    Height,
    CenterX,
    CenterY,
}

impl Attribute {
    pub fn all() -> &'static [Attribute] {
        &[
            Self::Left,
            Self::Right,
            Self::Top,
            Self::Bottom,
            Self::Width,
            Self::Height,
            Self::CenterX,
            Self::CenterY,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Width => "width",
            Self::Height => "height",
            Self::CenterX => "center_x",
            Self::CenterY => "center_y",
        }
    }

    /// Read this attribute off a resolved rectangle
    pub fn of(&self, rect: &ChildLayout) -> f64 {
        match self {
            Self::Left => rect.x,
            Self::Right => rect.right(),
            Self::Top => rect.y,
            Self::Bottom => rect.bottom(),
            Self::Width => rect.width,
            Self::Height => rect.height,
            Self::CenterX => rect.x + rect.width / 2.0,
            Self::CenterY => rect.y + rect.height / 2.0,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Attribute::all().iter().map(|a| a.as_str()).collect();
                format!(
                    "'{}' is not a constrainable attribute. Expected one of: {}",
                    s,
                    names.join(", ")
                )
            })
    }
}

/// Relation between a box attribute and its target value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Equal => write!(f, "="),
            Relation::GreaterOrEqual => write!(f, ">="),
            Relation::LessOrEqual => write!(f, "<="),
        }
    }
}

/// `(box id, attribute)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeRef {
    pub id: String,
    pub attribute: Attribute,
}

impl AttributeRef {
    pub fn new(id: impl Into<String>, attribute: Attribute) -> Self {
        Self {
            id: id.into(),
            attribute,
        }
    }
}

/// True for ids the expression lexer reads as a single identifier
fn is_plain_id(id: &str) -> bool {
    let mut chars = id.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_plain_id(&self.id) {
            write!(f, "{}.{}", self.id, self.attribute)
        } else {
            let escaped = self.id.replace('\\', "\\\\").replace('"', "\\\"");
            write!(f, "\"{}\".{}", escaped, self.attribute)
        }
    }
}

/// One linear relation on a box attribute.
///
/// Without an anchor the target value is `constant * multiplier`; with an
/// anchor it is `anchor * multiplier + constant`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConstraint {
    pub target: AttributeRef,
    pub relation: Relation,
    pub anchor: Option<AttributeRef>,
    pub multiplier: f64,
    pub constant: f64,
    pub priority: u32,
}

impl LayoutConstraint {
    /// `target = value`
    pub fn fixed(id: impl Into<String>, attribute: Attribute, value: f64) -> Self {
        Self {
            target: AttributeRef::new(id, attribute),
            relation: Relation::Equal,
            anchor: None,
            multiplier: 1.0,
            constant: value,
            priority: DEFAULT_PRIORITY,
        }
    }

    /// `target = anchor + offset`
    pub fn relative(
        id: impl Into<String>,
        attribute: Attribute,
        anchor: AttributeRef,
        offset: f64,
    ) -> Self {
        Self {
            anchor: Some(anchor),
            ..Self::fixed(id, attribute, offset)
        }
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = relation;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

impl fmt::Display for LayoutConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.target, self.relation)?;
        match &self.anchor {
            Some(anchor) if self.multiplier == 1.0 => write!(f, "{}", anchor)?,
            Some(anchor) => write!(f, "{} * {}", anchor, self.multiplier)?,
            None if self.multiplier == 1.0 => write!(f, "{}", self.constant)?,
            None => write!(f, "{} * {}", self.constant, self.multiplier)?,
        }
        if self.anchor.is_some() && self.constant != 0.0 {
            if self.constant < 0.0 {
                write!(f, " - {}", -self.constant)?;
            } else {
                write!(f, " + {}", self.constant)?;
            }
        }
        if self.priority != DEFAULT_PRIORITY {
            write!(f, " @ {}", self.priority)?;
        }
        Ok(())
    }
}

/// Relaxation limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub max_iterations: usize,
    pub epsilon: f64,
    /// Untouched widths and heights read as the preferred size instead of 0
    pub preferred_sizes: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            epsilon: 0.1,
            preferred_sizes: false,
        }
    }
}

impl SolverConfig {
    fn validate(&self) -> Result<(), LayoutError> {
        if self.max_iterations == 0 {
            return Err(LayoutError::invalid_parameter(
                "constraint",
                "max_iterations",
                "at least one pass is required",
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(LayoutError::invalid_parameter(
                "constraint",
                "epsilon",
                format!("must be a non-negative number, got {}", self.epsilon),
            ));
        }
        Ok(())
    }
}

/// Attribute values written by constraints, keyed by `(box id, attribute)`
#[derive(Debug, Default)]
struct ValueTable {
    values: HashMap<AttributeRef, f64>,
    preferred_sizes: bool,
}

impl ValueTable {
    fn stored(&self, id: &str, attribute: Attribute) -> Option<f64> {
        self.values.get(&AttributeRef::new(id, attribute)).copied()
    }

    /// Resolve a box rectangle from whatever attributes have been written.
    ///
    /// Untouched sizes are 0 (or the preferred size when enabled), untouched
    /// positions the origin.
    fn rect(&self, b: &LayoutBox) -> ChildLayout {
        let get = |a| self.stored(&b.id, a);
        let (default_width, default_height) = if self.preferred_sizes {
            (b.preferred.width, b.preferred.height)
        } else {
            (0.0, 0.0)
        };
        let width = resolve_extent(get(Attribute::Width), get(Attribute::Left), get(Attribute::Right))
            .unwrap_or(default_width);
        let height = resolve_extent(get(Attribute::Height), get(Attribute::Top), get(Attribute::Bottom))
            .unwrap_or(default_height);
        let x = resolve_origin(get(Attribute::Left), get(Attribute::Right), get(Attribute::CenterX), width);
        let y = resolve_origin(get(Attribute::Top), get(Attribute::Bottom), get(Attribute::CenterY), height);
        ChildLayout::new(b.id.clone(), x, y, width, height)
    }

    /// Current value of an attribute, derived from the box rectangle when it
    /// has not been written directly
    fn resolve(&self, attr: &AttributeRef, boxes: &HashMap<&str, &LayoutBox>) -> f64 {
        if let Some(v) = self.values.get(attr) {
            return *v;
        }
        boxes
            .get(attr.id.as_str())
            .map(|b| attr.attribute.of(&self.rect(b)))
            .unwrap_or(0.0)
    }
}

fn resolve_extent(size: Option<f64>, start: Option<f64>, end: Option<f64>) -> Option<f64> {
    match (size, start, end) {
        (Some(size), _, _) => Some(size),
        (None, Some(start), Some(end)) => Some(end - start),
        _ => None,
    }
}

fn resolve_origin(start: Option<f64>, end: Option<f64>, center: Option<f64>, size: f64) -> f64 {
    match (start, end, center) {
        (Some(start), _, _) => start,
        (None, Some(end), _) => end - size,
        (None, None, Some(center)) => center - size / 2.0,
        (None, None, None) => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstraintLayout {
    pub constraints: Vec<LayoutConstraint>,
    pub solver: SolverConfig,
}

impl ConstraintLayout {
    pub fn new(constraints: Vec<LayoutConstraint>) -> Self {
        Self {
            constraints,
            solver: SolverConfig::default(),
        }
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    fn check_references(&self, boxes: &HashMap<&str, &LayoutBox>) -> Result<(), LayoutError> {
        let refs = self
            .constraints
            .iter()
            .flat_map(|c| std::iter::once(&c.target).chain(c.anchor.as_ref()));
        for r in refs {
            if !boxes.contains_key(r.id.as_str()) {
                let known: Vec<&str> = boxes.keys().copied().collect();
                return Err(LayoutError::unknown_box(&r.id, find_similar(&known, &r.id, 2)));
            }
        }
        Ok(())
    }

    pub fn layout(&self, boxes: &[LayoutBox], envelope: &Envelope) -> Result<LayoutResult, LayoutError> {
        self.solver.validate()?;
        envelope.validate()?;
        validate_boxes(boxes)?;

        let by_id: HashMap<&str, &LayoutBox> = boxes.iter().map(|b| (b.id.as_str(), b)).collect();
        self.check_references(&by_id)?;

        // Stable: declaration order breaks priority ties.
        let mut ordered: Vec<&LayoutConstraint> = self.constraints.iter().collect();
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut table = ValueTable {
            values: HashMap::new(),
            preferred_sizes: self.solver.preferred_sizes,
        };
        let mut report = SolverReport {
            converged: false,
            iterations: 0,
        };

        while report.iterations < self.solver.max_iterations {
            report.iterations += 1;
            let mut changed = false;
            let mut written: HashSet<&AttributeRef> = HashSet::new();

            for constraint in &ordered {
                // A higher-priority constraint already owns this pair for the pass.
                if !written.insert(&constraint.target) {
                    continue;
                }
                let value = match &constraint.anchor {
                    Some(anchor) => table.resolve(anchor, &by_id) * constraint.multiplier + constraint.constant,
                    None => constraint.constant * constraint.multiplier,
                };
                let current = table.values.get(&constraint.target).copied();
                let differs = (current.unwrap_or(0.0) - value).abs() > self.solver.epsilon;
                if differs {
                    trace!(constraint = %constraint, to = value, "relax");
                    changed = true;
                }
                // Record first writes even when they match the zero default.
                if differs || current.is_none() {
                    table.values.insert(constraint.target.clone(), value);
                }
            }

            if !changed {
                report.converged = true;
                break;
            }
        }

        if report.converged {
            debug!(iterations = report.iterations, constraints = ordered.len(), "constraints converged");
        } else {
            warn!(
                iterations = report.iterations,
                constraints = ordered.len(),
                "constraints did not converge"
            );
        }

        let children: Vec<ChildLayout> = boxes.iter().map(|b| table.rect(b)).collect();
        let content_width = children.iter().map(ChildLayout::right).fold(0.0, f64::max);
        let content_height = children.iter().map(ChildLayout::bottom).fold(0.0, f64::max);

        let mut result = LayoutResult::new(envelope, content_width, content_height, children);
        result.solver = Some(report);
        Ok(result)
    }
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for (i, ac) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, bc) in b_chars.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Find similar box ids within a maximum edit distance
fn find_similar(known: &[&str], target: &str, max_distance: usize) -> Vec<String> {
    let mut candidates: Vec<(&str, usize)> = known
        .iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist <= max_distance && dist > 0).then_some((*name, dist))
        })
        .collect();

    candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    candidates
        .into_iter()
        .map(|(name, _)| name.to_string())
        .take(3)
        .collect()
}
