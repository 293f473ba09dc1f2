#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Comparative-market analytics over parcel collections.
//!
//! Every pass is a pure function of the parcels handed to it. Unparseable
//! fields skip only the computation that needs them; one malformed parcel
//! never aborts the rest of the set.

pub mod distress;
pub mod filters;
pub mod stats;
pub mod undervalued;

pub use distress::find_distressed;
pub use filters::{find_large_land_far, find_poor_condition, is_large_land};
pub use stats::mean_std_dev;
pub use undervalued::{find_undervalued, find_undervalued_in_subdivision};
