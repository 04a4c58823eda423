use chrono::{Datelike, Local};
use serde::Deserialize;

/// How many seasons back the selector offers, the current one included
pub const SEASON_HISTORY: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("A farm was selected without a crop")]
    FarmWithoutCrop,
    #[error("A field was selected without a farm")]
    FieldWithoutFarm,
}

/// Season plus the crop/farm/field drill-down a view is built for.
///
/// This is passed into the service explicitly; nothing in the crate keeps a current
/// selection around between calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectionContext {
    pub season: i32,
    #[serde(default)]
    pub crop: Option<String>,
    #[serde(default)]
    pub farm: Option<String>,
    #[serde(default)]
    pub field_id: Option<i64>,
}

/// Resolved drill-down level of a [`SelectionContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Crops,
    Crop(&'a str),
    Farm { crop: &'a str, farm: &'a str },
    Field { crop: &'a str, farm: &'a str, field_id: i64 },
}

impl SelectionContext {
    pub fn scope(&self) -> Result<Scope<'_>, SelectionError> {
        match (self.crop.as_deref(), self.farm.as_deref(), self.field_id) {
            (None, None, None) => Ok(Scope::Crops),
            (Some(crop), None, None) => Ok(Scope::Crop(crop)),
            (Some(crop), Some(farm), None) => Ok(Scope::Farm { crop, farm }),
            (Some(crop), Some(farm), Some(field_id)) => Ok(Scope::Field {
                crop,
                farm,
                field_id,
            }),
            (_, None, Some(_)) => Err(SelectionError::FieldWithoutFarm),
            (None, Some(_), _) => Err(SelectionError::FarmWithoutCrop),
        }
    }
}

pub fn current_season() -> i32 {
    Local::now().year()
}

/// Seasons offered for selection, newest first
pub fn available_seasons(current: i32) -> Vec<i32> {
    (0..SEASON_HISTORY).map(|offset| current - offset).collect()
}
