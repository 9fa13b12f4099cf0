//! Core series engine and provider abstractions

pub mod adapter;
pub mod analytics;
pub mod cache;
pub mod calendar;
pub mod currency;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod price;
pub mod series;
pub mod window;

// Re-export main types for cleaner imports
pub use error::SeriesError;
pub use price::{HistoryProvider, PriceHistory, RawObservation};
pub use series::{DailyPoint, DateWindow, ForexPair, Series};
pub use window::{RebasedSeries, ValueConvention};
