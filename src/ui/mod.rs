//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`editor`] - Editor lookup and launching for cover letters and recipients
//!
//! # Design
//!
//! Commands print their tabular output themselves; diagnostics go through
//! the `log` facade. The only interactive surface is the editor.

pub mod editor;
