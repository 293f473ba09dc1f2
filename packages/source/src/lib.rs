#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parcel record sources.
//!
//! Analytics never fetch data themselves. They receive parcels from a
//! [`ParcelSource`], which may be backed by a relational store or by the
//! appraisal district's bulk flat files ([`flat_file::FlatFileSource`]).
//! The flat-file path uses the concurrent [`pipeline`] to parse records.

pub mod flat_file;
pub mod pipeline;
pub mod progress;

use acquisitions_parcel_models::Parcel;

/// Errors that can occur while reading parcel records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The delimited file had no header row.
    #[error("File {path} is empty")]
    EmptyFile {
        /// Path of the offending file.
        path: String,
    },

    /// A worker thread panicked while parsing records.
    #[error("Ingestion worker failed: {message}")]
    Worker {
        /// Description of what went wrong.
        message: String,
    },
}

/// Contract every parcel record source implements.
///
/// Address arguments are expected in the form produced by
/// [`acquisitions_parcel_models::normalize_address`].
pub trait ParcelSource: Send + Sync {
    /// Looks up a single parcel by normalized situs address.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backing store cannot be queried.
    fn by_address(&self, normalized_address: &str) -> Result<Option<Parcel>, SourceError>;

    /// Returns every parcel whose subdivision matches `name`
    /// (case-insensitive, trimmed).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backing store cannot be queried.
    fn by_subdivision(&self, name: &str) -> Result<Vec<Parcel>, SourceError>;

    /// Returns every parcel accepted by `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backing store cannot be queried.
    fn filtered(&self, predicate: &dyn Fn(&Parcel) -> bool) -> Result<Vec<Parcel>, SourceError>;
}
