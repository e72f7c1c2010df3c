//! Engine-wide constants.
//!
//! Centralizes magic numbers used by the statistics engine, the pipeline
//! and the collaborator contracts.

// ============================================================================
// Statistics
// ============================================================================

/// A column is numeric when strictly more than `NUMERIC_RATIO_NUM / NUMERIC_RATIO_DEN`
/// of its non-null values parse as finite numbers (80%).
pub const NUMERIC_RATIO_NUM: usize = 4;

/// Denominator of the numeric threshold ratio.
pub const NUMERIC_RATIO_DEN: usize = 5;

/// Number of non-empty values sampled per column for type inference
pub const TYPE_INFERENCE_SAMPLE: usize = 100;

// ============================================================================
// Data Loading
// ============================================================================

/// Maximum number of CSV rows to load
pub const MAX_CSV_ROWS: usize = 100_000;

/// Maximum CSV file size in MB
pub const MAX_CSV_SIZE_MB: usize = 100;

/// Keys searched for a row array when a JSON document is an object
pub const JSON_WRAPPER_KEYS: [&str; 5] = ["data", "rows", "items", "records", "results"];

// ============================================================================
// Formula Sandbox
// ============================================================================

/// Longest formula text accepted by the evaluator
pub const MAX_FORMULA_LENGTH: usize = 1_024;

/// Deepest parenthesis / unary nesting accepted by the evaluator
pub const MAX_FORMULA_DEPTH: usize = 64;

/// Value written to a calculated column when its formula fails
pub const FORMULA_ERROR: &str = "Error";

// ============================================================================
// Collaborators
// ============================================================================

/// Rows included in the request sent to the insights collaborator
pub const INSIGHT_SAMPLE_ROWS: usize = 5;

/// Default time-to-live for persisted values, in days
pub const DEFAULT_PERSISTENCE_TTL_DAYS: u64 = 7;

/// Milliseconds in one day
pub const MS_PER_DAY: u64 = 24 * 60 * 60 * 1_000;

// ============================================================================
// Performance
// ============================================================================

/// A pipeline stage taking longer than this is logged at warn level
pub const SLOW_STAGE_WARN_MS: f64 = 250.0;
