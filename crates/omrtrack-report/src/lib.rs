//! omrtrack-report — result-sheet rendering.
//!
//! Turns a graded test into a self-contained HTML page.

pub mod html;

pub use html::{generate_html, write_html_report};
