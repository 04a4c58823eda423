//! Build a field weather view from snapshot files saved off the upstream API
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use field_weather_service::exceptions::ExceptionSet;
use field_weather_service::models::{
    CropException, FieldsWeatherResponse, WeatherStationRecord, WeatherStationsResponse,
};
use field_weather_service::selection::{current_season, SelectionContext};
use field_weather_service::services::Snapshot;

#[derive(Parser, Debug)]
#[command(name = "summarize-snapshot")]
#[command(about = "Aggregate a saved fields_weather snapshot into area-weighted views")]
struct Args {
    /// `fields_weather` response saved as JSON
    #[arg(long)]
    fields: PathBuf,

    /// `weather_stations` response saved as JSON (wrapped in `data` or a bare array)
    #[arg(long)]
    stations: Option<PathBuf>,

    /// `weather_exception` list saved as JSON
    #[arg(long)]
    exceptions: Option<PathBuf>,

    /// Season the snapshot belongs to
    #[arg(long, env = "SEASON")]
    season: Option<i32>,

    #[arg(long)]
    crop: Option<String>,

    #[arg(long)]
    farm: Option<String>,

    /// Field shape id within the selected farm
    #[arg(long)]
    field_id: Option<i64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn read_stations(path: &Path) -> Result<Vec<WeatherStationRecord>, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    match serde_json::from_str::<WeatherStationsResponse>(&raw) {
        Ok(wrapped) => Ok(wrapped.data),
        Err(_) => Ok(serde_json::from_str(&raw)?),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let dataset: FieldsWeatherResponse = serde_json::from_str(&fs::read_to_string(&args.fields)?)?;
    let stations = match &args.stations {
        Some(path) => read_stations(path)?,
        None => Vec::new(),
    };
    let exceptions: Vec<CropException> = match &args.exceptions {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    let season = args.season.unwrap_or_else(current_season);
    eprintln!(
        "Loaded {} farms, {} station records, {} exceptions for season {season}",
        dataset.len(),
        stations.len(),
        exceptions.len()
    );

    let snapshot = Snapshot::new(season, dataset, stations, ExceptionSet::from_entries(exceptions));
    let selection = SelectionContext {
        season,
        crop: args.crop,
        farm: args.farm,
        field_id: args.field_id,
    };

    let view = snapshot.view(&selection)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    println!("{json}");

    Ok(())
}
