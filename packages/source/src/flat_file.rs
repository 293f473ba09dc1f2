//! In-memory [`ParcelSource`] built from the appraisal district's bulk
//! exports.
//!
//! The primary export carries ownership, valuation and structure fields
//! keyed by `Account_Num`. The optional supplemental export adds
//! coordinates, condition, depreciation and site classification keyed by
//! `AccountNumber`; supplemental rows without a primary record are dropped.
//! After merging, parcels are indexed by normalized situs address.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use acquisitions_parcel_models::{Parcel, normalize_subdivision};

use crate::pipeline::{DelimitedRecord, read_delimited};
use crate::progress::ProgressCallback;
use crate::{ParcelSource, SourceError};

/// Default field delimiter of the appraisal district exports.
pub const DEFAULT_DELIMITER: char = '|';

/// Parcels held in memory, keyed by normalized situs address.
#[derive(Debug, Default)]
pub struct FlatFileSource {
    by_address: BTreeMap<String, Parcel>,
}

impl FlatFileSource {
    /// Builds a source from already-constructed parcels. Later parcels with
    /// the same normalized address replace earlier ones.
    #[must_use]
    pub fn from_parcels(parcels: impl IntoIterator<Item = Parcel>) -> Self {
        let by_address = parcels
            .into_iter()
            .map(|parcel| (parcel.address_key(), parcel))
            .collect();
        Self { by_address }
    }

    /// Loads the primary export and, if given, merges the supplemental
    /// export into it.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if either file cannot be read.
    pub fn load(
        primary: &Path,
        supplemental: Option<&Path>,
        delimiter: char,
        progress: &dyn ProgressCallback,
    ) -> Result<Self, SourceError> {
        progress.set_message(format!("Reading {}", primary.display()));
        let by_account = Mutex::new(BTreeMap::<String, Parcel>::new());
        read_delimited(primary, delimiter, progress, |record| {
            let parcel = primary_parcel(&record);
            if let Ok(mut map) = by_account.lock() {
                map.insert(parcel.account_num.clone(), parcel);
            }
        })?;

        if let Some(supplemental) = supplemental {
            progress.set_message(format!("Merging {}", supplemental.display()));
            read_delimited(supplemental, delimiter, progress, |record| {
                let account = record.get("AccountNumber");
                if let Ok(mut map) = by_account.lock()
                    && let Some(parcel) = map.get_mut(account)
                {
                    merge_supplemental(parcel, &record);
                }
            })?;
        }

        let by_account = by_account
            .into_inner()
            .map_err(|e| SourceError::Worker {
                message: format!("Parcel map poisoned: {e}"),
            })?;
        let source = Self::from_parcels(by_account.into_values());

        progress.finish(format!(
            "Loaded {} parcels from {}",
            source.len(),
            primary.display()
        ));
        log::info!(
            "Loaded {} parcels from {}",
            source.len(),
            primary.display()
        );

        Ok(source)
    }

    /// Number of distinct addresses held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    /// Whether the source holds no parcels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }

    /// Iterates over every parcel in address order.
    pub fn parcels(&self) -> impl Iterator<Item = &Parcel> {
        self.by_address.values()
    }
}

impl ParcelSource for FlatFileSource {
    fn by_address(&self, normalized_address: &str) -> Result<Option<Parcel>, SourceError> {
        Ok(self.by_address.get(normalized_address).cloned())
    }

    fn by_subdivision(&self, name: &str) -> Result<Vec<Parcel>, SourceError> {
        let key = normalize_subdivision(name);
        Ok(self
            .parcels()
            .filter(|parcel| parcel.subdivision_key() == key)
            .cloned()
            .collect())
    }

    fn filtered(&self, predicate: &dyn Fn(&Parcel) -> bool) -> Result<Vec<Parcel>, SourceError> {
        Ok(self
            .parcels()
            .filter(|parcel| predicate(parcel))
            .cloned()
            .collect())
    }
}

fn primary_parcel(record: &DelimitedRecord<'_>) -> Parcel {
    Parcel {
        account_num: record.get_owned("Account_Num"),
        situs_address: record.get_owned("Situs_Address"),
        owner_name: record.get_owned("Owner_Name"),
        owner_address: record.get_owned("Owner_Address"),
        owner_city_state: record.get_owned("Owner_CityState"),
        owner_zip: record.get_owned("Owner_Zip"),
        subdivision: record.get_owned("SubdivisionName"),
        county: record.get_owned("County"),
        city: record.get_owned("City"),
        school_district: record.get_owned("School"),
        land_value: record.get_owned("Land_Value"),
        improvement_value: record.get_owned("Improvement_Value"),
        total_value: record.get_owned("Total_Value"),
        deed_date: record.get_owned("Deed_Date"),
        arb_indicator: record.get_owned("ARB_Indicator"),
        year_built: record.get_owned("Year_Built"),
        living_area: record.get_owned("Living_Area"),
        num_bedrooms: record.get_owned("Num_Bedrooms"),
        num_bathrooms: record.get_owned("Num_Bathrooms"),
        property_class: record.get_owned("Property_Class"),
        state_use_code: record.get_owned("State_Use_Code"),
        land_acres: record.get_owned("Land_Acres"),
        land_sq_ft: record.get_owned("Land_SqFt"),
        ..Parcel::default()
    }
}

fn merge_supplemental(parcel: &mut Parcel, record: &DelimitedRecord<'_>) {
    parcel.latitude = record.get_owned("Latitude");
    parcel.longitude = record.get_owned("Longitude");
    parcel.quality = record.get_owned("Quality");
    parcel.last_sale_date = record.get_owned("LastSaleDate");
    parcel.condition = record.get_owned("Condition");
    parcel.depreciation_percent = record.get_owned("DepreciationPercent");
    parcel.subdivision = record.get_owned("SubdivisionName");
    parcel.site_class_cd = record.get_owned("SiteClassCd");
    parcel.site_class_descr = record.get_owned("SiteClassDescr");
    parcel.land_use_code = record.get_owned("LandUseCode");
}
