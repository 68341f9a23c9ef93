//! Common test utilities for dotkeep-init
//!
//! - `mocks`: recording git backend, applier, purger and in-memory state
//! - `fixtures`: temporary source/config/destination layout

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
