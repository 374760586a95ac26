//! # Traveller Development Tools
//!
//! Command-line tools for working with stored builds:
//! - Store validators
//! - Object listing
//! - Manifest printing

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod commands;
