//! Calendar snapshot diff engine.
//!
//! Reconciles the current calendar export against the previous one and
//! classifies every event as new, deleted, modified, unchanged or shifted.
//!
//! ## Entry point
//!
//! ```ignore
//! use calendiff_core::diff::engine::reconcile;
//!
//! let events = reconcile(&current, &previous)?;
//! let summary = calendiff_core::diff::human_summary::render_human_summary(&events);
//! ```
//!
//! ## Guarantees
//!
//! - **Completeness**: every input row is traceable to exactly one output row;
//!   a deleted row only disappears when it is absorbed into a shifted one.
//! - **Determinism**: identical inputs produce identical output order.
//! - **Null tolerance**: blank dates, hero slots and ids never raise; they
//!   compare as absent.
//! - **Purity**: no I/O and no shared state. Only a missing required column
//!   is an error.

pub mod engine;
pub mod human_summary;
pub mod model;
