//! # Storage Module
//!
//! Data persistence for the clinic manager. The domain layer talks to the
//! traits in [`traits`]; the concrete adapter is chosen at process start.
//!
//! - **sqlite** — the durable adapter: SQLite through sqlx, with the
//!   email-uniqueness constraint and the patient→appointment cascade
//!   enforced in the schema itself.
//! - **memory** — an in-process adapter behind the same traits, used by
//!   tests and ephemeral runs.

pub mod memory;
pub mod sqlite;
pub mod traits;
