/*
 * This module provides the application logic layer, centered around
 * `FileMergerLogic`, which acts as the controller between the presentation
 * layer and the core `MergeSession`.
 * Unit tests for `FileMergerLogic` are in `handler_tests.rs`.
 */
pub mod handler;


pub use handler::{ActionOutcome, FileMergerLogic};
