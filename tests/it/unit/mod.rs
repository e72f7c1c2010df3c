//! Unit tests for Databoard.

mod ingestion_tests;
mod perf_tests;
mod persistence_tests;
mod pipeline_tests;
mod snapshot_tests;
mod statistics_tests;
