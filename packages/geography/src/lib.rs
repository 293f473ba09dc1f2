#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate math for parcel analysis.
//!
//! * [`projection`] converts parcel latitude/longitude into the state-plane
//!   system the zoning layers are stored in.
//! * [`distance`] measures great-circle distance and answers radius queries
//!   used to pick comparable neighbors.

pub mod distance;
pub mod projection;

pub use distance::{NeighborIndex, distance_miles};
pub use projection::LambertConformalConic;
