pub mod aggregation;
pub mod api;
pub mod app;
pub mod config;
pub mod exceptions;
pub mod fetch_error;
pub mod fetcher;
pub mod models;
pub mod selection;
pub mod services;
pub mod utils;
