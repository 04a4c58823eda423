use std::collections::BTreeMap;

use crate::models::CropException;

/// What has to happen upstream to flip a crop's exclusion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionToggle {
    /// Crop is currently selectable; create an exception record for it
    Exclude,
    /// Crop is currently excluded; delete the record that excludes it
    Include { exception_id: i64 },
}

/// Crops an operator has excluded, with the upstream record id behind each one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionSet {
    by_crop: BTreeMap<String, i64>,
}

impl ExceptionSet {
    pub fn from_entries(entries: impl IntoIterator<Item = CropException>) -> Self {
        Self {
            by_crop: entries.into_iter().map(|e| (e.crop, e.id)).collect(),
        }
    }

    pub fn contains(&self, crop: &str) -> bool {
        self.by_crop.contains_key(crop)
    }

    pub fn len(&self) -> usize {
        self.by_crop.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_crop.is_empty()
    }

    pub fn toggle(&self, crop: &str) -> ExceptionToggle {
        match self.by_crop.get(crop) {
            Some(&exception_id) => ExceptionToggle::Include { exception_id },
            None => ExceptionToggle::Exclude,
        }
    }
}
