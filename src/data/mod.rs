//! Data ingestion, typing and statistics
//!
//! This module turns raw CSV/JSON content into [`Table`](crate::types::Table)s
//! and derives per-column statistics from them.
//!
//! ## Error Handling
//!
//! Ingestion returns `DataResult<T>` which uses the `DataError` type.
//! Common errors include:
//! - `TooLarge` / `TooManyRows`: input exceeds loading limits
//! - `RowNotObject` / `ColumnMismatch`: input violates the table shape
//! - `Io`: File system errors
//! - `Csv`/`Json`: Parse errors
//!
//! Statistics never fail: an empty table yields empty statistics.

mod csv_parser;
pub mod error;
mod inference;
mod json_parser;
mod statistics;

pub use csv_parser::*;
pub use error::*;
pub use inference::*;
pub use json_parser::*;
pub use statistics::*;
