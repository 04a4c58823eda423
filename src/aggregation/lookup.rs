use std::collections::BTreeSet;

use crate::aggregation::humidity_merger::HumidityField;
use crate::exceptions::ExceptionSet;
use crate::models::{Farm, Field, FieldsWeatherResponse};

/// Every crop any farm reports averages for, sorted by name
pub fn crop_names(dataset: &FieldsWeatherResponse) -> Vec<String> {
    let crops: BTreeSet<&String> = dataset
        .values()
        .flat_map(|farm| farm.avg_weather_periods.keys())
        .collect();

    crops.into_iter().cloned().collect()
}

/// Crops available for selection once operator exceptions are removed
pub fn selectable_crops(dataset: &FieldsWeatherResponse, exceptions: &ExceptionSet) -> Vec<String> {
    crop_names(dataset)
        .into_iter()
        .filter(|crop| !exceptions.contains(crop))
        .collect()
}

/// Names of the farms that report averages for `crop`
pub fn farms_for_crop<'a>(dataset: &'a FieldsWeatherResponse, crop: &str) -> Vec<&'a str> {
    dataset
        .iter()
        .filter(|(_, farm)| farm.avg_weather_periods.contains_key(crop))
        .map(|(name, _)| name.as_str())
        .collect()
}

/// Find a field by its shape id, falling back to the map key it is stored under
pub fn find_field(farm: &Farm, field_id: i64) -> Option<&Field> {
    farm.fields
        .values()
        .find(|field| field.field_shape_id == field_id)
        .or_else(|| farm.fields.get(&field_id.to_string()))
}

/// Fields of `farm` that grow `crop`, in map order
pub fn crop_fields<'a>(farm: &'a Farm, crop: &str) -> Vec<&'a Field> {
    farm.fields
        .values()
        .filter(|field| field.crop_name == crop)
        .collect()
}

/// Weight a farm carries for `crop`: the tillable area of its fields growing that crop.
///
/// `None` when no field of the farm grows the crop; such a farm contributes neither
/// weight nor values to a crop rollup.
pub fn crop_weight(farm: &Farm, crop: &str) -> Option<f64> {
    let fields = crop_fields(farm, crop);
    if fields.is_empty() {
        return None;
    }

    Some(fields.iter().map(|field| field.tillable_area).sum())
}

/// Candidate fields for the humidity merger: the selected field alone, or every
/// field of the farm growing `crop`
pub fn humidity_candidates(farm: &Farm, crop: &str, field_id: Option<i64>) -> Vec<HumidityField> {
    match field_id {
        Some(id) => find_field(farm, id)
            .map(|field| vec![HumidityField::from(field)])
            .unwrap_or_default(),
        None => crop_fields(farm, crop)
            .into_iter()
            .map(HumidityField::from)
            .collect(),
    }
}
