//! Integration tests for the --lint checks

use responsive_layout::layout::lint::{self, LintCategory};
use responsive_layout::{compute, Scene};

fn lint_scene(source: &str, width: f64) -> Vec<lint::LintWarning> {
    let scene = Scene::from_str(source).expect("Should load");
    let layout = compute(&scene, width).expect("Should lay out");
    lint::check(&layout.result, &scene.boxes, &scene.envelope_for(width))
}

#[test]
fn test_true_positives_unplaced() {
    let warnings = lint_scene(include_str!("fixtures/lint-true-positives.toml"), 1024.0);
    let categories: Vec<_> = warnings.iter().map(|w| w.category).collect();
    assert_eq!(categories, vec![LintCategory::Unplaced]);
    assert!(warnings[0].to_string().contains("second"));
}

#[test]
fn test_true_negatives_clean() {
    let warnings = lint_scene(include_str!("fixtures/lint-true-negatives.toml"), 1024.0);
    assert!(
        warnings.is_empty(),
        "Expected no warnings for true-negatives, got: {:?}",
        warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>()
    );
}

#[test]
fn test_oscillating_constraints() {
    let warnings = lint_scene(
        r#"
        strategy = "constraint"
        constraints = [
            "a.left = b.left + 1",
            "b.left = a.left + 1",
            "a.width = 50; a.height = 50",
            "b.width = 50; b.height = 50",
        ]

        [layout]
        max_iterations = 10

        [envelope]
        max_width = 60

        [[boxes]]
        id = "a"
        width = 50
        height = 50

        [[boxes]]
        id = "b"
        width = 50
        height = 50
        "#,
        1024.0,
    );

    let categories: Vec<String> = warnings.iter().map(|w| w.category.to_string()).collect();
    assert!(
        categories.contains(&"overflow".to_string()),
        "Expected overflow warning, got: {:?}",
        categories
    );
    assert!(
        categories.contains(&"overlap".to_string()),
        "Expected overlap warning, got: {:?}",
        categories
    );
    assert!(
        categories.contains(&"convergence".to_string()),
        "Expected convergence warning, got: {:?}",
        categories
    );
}
