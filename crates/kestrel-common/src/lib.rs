//! Common utilities for the Kestrel render core.
//!
//! This crate provides shared infrastructure used by all pipeline stages:
//! - **Warning System** - deduplicated, coloured reports of recovered input errors
//! - **URL helpers** - normalization of typed addresses and resolution of relative references

pub mod url;
pub mod warning;
