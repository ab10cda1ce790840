//! `osmtags-core` is the core library of `osmtags`: it turns the hstore tag
//! column that OSM exports carry (conventionally `other_tags`) into one
//! regular text column per tag key.
//!
//! This crate includes:
//! - **Hstore parsing**: [`hstore::parse_hstore`] extracts `"key"=>"value"` pairs.
//! - **Explode pipeline**: [`explode::explode_hstore`] rewrites any
//!   [`Layer`](osmtags_core_common::Layer) in place.
//! - **Driver Registry**: the formats layers can be loaded from and saved to.
//! - **File operations**: read, explode and write whole datasets.

pub mod drivers;
pub mod error;
pub mod explode;
pub mod hstore;
pub mod operations;
pub mod types;
pub mod utils;
