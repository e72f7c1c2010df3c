//! Unit tests for perf module.

use databoard::perf::{measure, StageTimer};

#[test]
fn test_stage_timer_creation() {
    // Threshold is high enough that dropping never warns
    let timer = StageTimer::new("test_stage", 10_000.0);
    assert_eq!(timer.name(), "test_stage");
    assert!(timer.elapsed_ms() >= 0.0);
}

#[test]
fn test_default_threshold_timer() {
    let timer = StageTimer::with_default_threshold("filters");
    assert_eq!(timer.name(), "filters");
}

#[test]
fn test_measure_returns_result() {
    let (sum, elapsed) = measure(|| (1..=10).sum::<i32>());
    assert_eq!(sum, 55);
    assert!(elapsed >= 0.0);
}
