//! # backbench testkit
//!
//! Test utilities for backbench.
//!
//! This crate provides:
//! - An in-memory MySQL stand-in with simulated binary logs
//! - Backup tools that dump from and replay into the stand-in
//! - Scripted CPU samples
//! - Temporary workspaces and harness fixtures
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use backbench_testkit::prelude::*;
//!
//! #[test]
//! fn log_based_round_trip() {
//!     with_workspace(|ws, server| {
//!         let summary = ws.harness(server).unwrap().run(Strategy::LogBased).unwrap();
//!         assert!(summary.is_lossless());
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cpu;
pub mod fixtures;
pub mod generators;
pub mod server;
pub mod tools;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cpu::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::server::*;
    pub use crate::tools::*;
    pub use backbench_core::{BenchError, Database, Strategy};
}

pub use cpu::*;
pub use fixtures::*;
pub use generators::*;
pub use server::*;
pub use tools::*;
