//! `storefront-engine`
//!
//! **Responsibility:** the single authoritative view of "what is in the
//! user's cart and what it costs".
//!
//! This crate provides:
//! - One observable cart snapshot the UI renders from
//! - Guest vs. authenticated delegation behind a single state machine
//! - The one-time guest→authenticated merge at login
//!
//! The engine is a **thin orchestrator** over `storefront-store` (guest mode)
//! and a `CartBackend` (authenticated mode).

pub mod engine;

pub use engine::{CartEngine, EngineError, EngineState, Mode};
