pub mod humidity_merger;
pub mod lookup;
pub mod period_aggregator;
pub mod progress;

pub use humidity_merger::{merge_humidity, HumidityField};
pub use period_aggregator::{aggregate_crop, aggregate_periods, AggregationScope};
pub use progress::{field_progress, period_totals, FieldProgress, NormProgress, PeriodTotals};
