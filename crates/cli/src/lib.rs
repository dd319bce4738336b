// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Review - Command Line
//!
//! Wires the review engine to a configuration file and a live database.
//!
//! ```text
//! sqlreview --config review.yaml --schema app review batch.sql
//! sqlreview --schema app optimize "select * from orders where user_id = 1"
//! sqlreview rules
//! ```
//!
//! A live database needs the `mysql` feature; without it every database call
//! fails with `NotSupported`.

pub mod commands;
pub mod config;

pub use commands::{connect, optimize, render_advice, render_review, render_rules, review};
pub use config::{ConfigError, ConfigResult, ConnectionConfig, ReviewConfig};
