//! Search orchestrator: concurrent fan-out, dedup, scoring, ranking.
//!
//! [`pipeline::run_pipeline`] drives one request through every stage.
//! The stages are public so each can be exercised on its own.

pub mod aggregate;
pub mod dedup;
pub mod pipeline;
pub mod scoring;
