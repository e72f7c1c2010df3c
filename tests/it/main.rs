//! Single test binary entry point.
//!
//! This consolidates all tests into a single binary following matklad's best practices,
//! reducing linking overhead.
//!
//! Structure:
//! - integration: Multi-stage pipeline and collaborator workflows
//! - unit: Single-component unit tests

mod helpers;
mod unit;
