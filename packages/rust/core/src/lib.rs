//! Core batch orchestration for DeckBuilder.
//!
//! This crate ties together notebook discovery and slide conversion into
//! the end-to-end `build_slides` workflow.

pub mod discover;
pub mod pipeline;
