//! Plain-text rendering of layout results

use crate::layout::LayoutResult;

/// Render a result as one line per fact.
///
/// ```text
/// size: 208 x 108
/// a: x=0 y=0 w=100 h=100
/// unplaced: c
/// solver: converged after 2 passes
/// ```
pub fn format_result(result: &LayoutResult) -> String {
    let mut lines = Vec::with_capacity(result.children.len() + 3);
    lines.push(format!(
        "size: {} x {}",
        number(result.width),
        number(result.height)
    ));

    for child in &result.children {
        lines.push(format!(
            "{}: x={} y={} w={} h={}",
            child.id,
            number(child.x),
            number(child.y),
            number(child.width),
            number(child.height)
        ));
    }

    if !result.unplaced.is_empty() {
        lines.push(format!("unplaced: {}", result.unplaced.join(", ")));
    }

    if let Some(report) = result.solver {
        let passes = if report.iterations == 1 { "pass" } else { "passes" };
        lines.push(if report.converged {
            format!("solver: converged after {} {}", report.iterations, passes)
        } else {
            format!("solver: not converged after {} {}", report.iterations, passes)
        });
    }

    lines.join("\n")
}

/// Whole numbers without a fraction, others to two decimals
fn number(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.2}", rounded)
            .trim_end_matches('0')
            .to_string()
    }
}
