//! TRENDSCRAP
//! Batch scraper for Google Trends "rising" related queries.
//!
//! Each run picks a random batch of seed keywords, fetches the rising
//! related-query table for every seed, merges the results into a JSON
//! knowledge base on disk, and paces itself with long random sleeps
//! between requests to stay under the rate limit.

mod macros;

pub mod config;
mod error;
pub mod process;
pub mod record;
pub mod request;
pub mod seeds;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
