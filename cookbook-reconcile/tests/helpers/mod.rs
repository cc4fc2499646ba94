//! Test helper utilities
//!
//! Shared utilities for testing cookbook-reconcile

#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod log_capture;

pub use fixtures::{chapter_page, cut_off, page, record, run, run_with, strings, untitled};
pub use log_capture::LogCapture;
