pub mod yahoo_finance;

// Re-export the shared cache so providers can be constructed from one import
pub use crate::core::cache::Cache;
pub use yahoo_finance::YahooHistoryProvider;
