// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for the SQL review engine
//!
//! This crate provides common testing components including:
//! - A scripted in-memory [`MockExecutor`] standing in for a live database
//! - The `exist_db` fixture schema most review tests run against
//! - IR-specific assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_executor;

// Re-exports for convenience
pub use assertions::SqlAssertions;
pub use fixtures::{SqlFixtures, exist_db_executor, exist_db_session};
pub use mock_executor::{MockExecutor, MockExecutorBuilder, row};
