#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street-name correction for free-text addresses.
//!
//! Citizen-submitted addresses rarely match the official street names of a
//! municipality: abbreviations (`"Ote."` for `"Oriente"`), missing accents,
//! stray punctuation and swapped words are the norm. This crate corrects
//! the street-name part of an address against a [`registry::StreetRegistry`]
//! while preserving the house number:
//!
//! 1. [`split::split_address`] peels off the trailing house number.
//! 2. [`normalize::normalize`] reduces the street text to a comparison key.
//! 3. [`fuzzy::best_match`] scores the key against every registry entry.
//! 4. [`correct::correct_address`] applies the best candidate if it clears
//!    the acceptance threshold and recomposes the address.
//!
//! Everything here is pure, in-memory computation.

pub mod correct;
pub mod fuzzy;
pub mod normalize;
pub mod registry;
pub mod split;

pub use correct::{AddressCorrector, correct_address};
pub use geo_gestion_address_models::{
    CorrectedAddress, DEFAULT_THRESHOLD, MAX_SCORE, MatchResult, Scorer, SplitAddress,
    StreetEntry,
};
pub use normalize::normalize;
pub use registry::StreetRegistry;
pub use split::split_address;
