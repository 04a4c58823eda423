pub mod weather_view_service;

pub use weather_view_service::{ServiceError, Snapshot, WeatherViewService};
