#![allow(unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: the account-service scenario (catalog, types, manifest files)
//! - `mocks`: recording behaviors and fixed resolvers
//! - `assertions`: assertion helpers with better failure messages

pub mod assertions;
pub mod fixtures;
pub mod mocks;

pub use fixtures::{
    account_service, scenario_catalog, write_manifest, Account, AccountService, SCENARIO_MANIFEST,
};
pub use mocks::{
    failing, overriding, passthrough, recovering, short_circuit, FixedResolver, Handle, Recorder,
};

pub use assertions::{assert_err, assert_error_contains, assert_kinds, assert_ok};
