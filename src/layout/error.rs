//! Error types for the layout engine

use thiserror::Error;

/// Errors that abort a single layout pass.
///
/// None of these carry a partial result. Soft failures (unplaced grid boxes,
/// a solver that hit its pass cap) are reported on the `LayoutResult` instead.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A box violates its sizing invariants
    #[error("invalid box '{id}': {reason}")]
    InvalidBox { id: String, reason: String },

    /// The envelope bounds are malformed
    #[error("invalid envelope: {reason}")]
    InvalidEnvelope { reason: String },

    /// Two boxes in one pass share an id
    #[error("duplicate box id '{id}'")]
    DuplicateBoxId { id: String },

    /// Requested columns do not fit the available width
    #[error("insufficient width for {columns} column(s): {available} available, {required} required")]
    InsufficientWidth {
        columns: usize,
        available: f64,
        required: f64,
    },

    /// Strategy tuning value out of range
    #[error("invalid {strategy} parameter '{name}': {reason}")]
    InvalidParameter {
        strategy: &'static str,
        name: &'static str,
        reason: String,
    },

    /// Constraint references a box that is not part of the pass
    #[error("unknown box '{name}'")]
    UnknownBox {
        name: String,
        suggestions: Vec<String>,
    },

    /// Named variant that has no implementation
    #[error("{strategy} layout does not support {feature}")]
    Unsupported {
        strategy: &'static str,
        feature: &'static str,
    },

    /// Layout requested before any viewport width was applied
    #[error("no active layout strategy: call update() with a viewport width first")]
    NoActiveStrategy,
}

impl LayoutError {
    /// Create an invalid box error
    pub fn invalid_box(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBox {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid envelope error
    pub fn invalid_envelope(reason: impl Into<String>) -> Self {
        Self::InvalidEnvelope {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        strategy: &'static str,
        name: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            strategy,
            name,
            reason: reason.into(),
        }
    }

    /// Create an unknown box error with suggestions
    pub fn unknown_box(name: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self::UnknownBox {
            name: name.into(),
            suggestions,
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UnknownBox { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_box_display() {
        let err = LayoutError::invalid_box("hero", "min width 10 exceeds preferred width 5");
        assert!(err.to_string().contains("hero"));
    }

    #[test]
    fn test_insufficient_width_display() {
        let err = LayoutError::InsufficientWidth {
            columns: 3,
            available: 10.0,
            required: 16.0,
        };
        assert_eq!(
            err.to_string(),
            "insufficient width for 3 column(s): 10 available, 16 required"
        );
    }

    #[test]
    fn test_unknown_box_suggestions() {
        let err = LayoutError::unknown_box("heder", vec!["header".to_string()]);
        assert_eq!(err.suggestions(), Some(&["header".to_string()][..]));
        assert!(LayoutError::NoActiveStrategy.suggestions().is_none());
    }
}
