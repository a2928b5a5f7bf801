use std::path::PathBuf;
use std::time::Duration;

/// Everything a run needs to know up front. The defaults are deliberately
/// very conservative: a small batch with 15-40 second gaps between requests
/// looks like a human idly browsing, not a scraper.
#[derive(Debug, Clone)]
pub struct Config {
    /// How many seeds to sample for one run.
    pub batch_size: usize,
    /// Bounds of the random pacing sleep between successful fetches.
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Sleep after the provider rate-limits us.
    pub cooldown: Duration,
    /// Sleep after any other per-keyword failure.
    pub recovery_delay: Duration,
    /// Abort the batch after this many consecutive throttles.
    pub throttle_limit: usize,

    // Parameters forwarded to the trends provider.
    pub hl: String,
    pub tz: i32,
    pub geo: String,
    pub category: u32,
    pub timeframe: String,
    pub property: String,

    /// Connect / total request timeouts for the HTTP client.
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Transport-level retries per request, with linear backoff.
    pub retries: u32,

    pub output_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            batch_size: 20,
            min_delay: Duration::from_secs(15),
            max_delay: Duration::from_secs(40),
            cooldown: Duration::from_secs(120),
            recovery_delay: Duration::from_secs(10),
            throttle_limit: 3,
            hl: "en-US".into(),
            // US CST
            tz: 360,
            geo: String::new(),
            category: 0,
            timeframe: "now 7-d".into(),
            property: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(25),
            retries: 3,
            output_path: PathBuf::from("trending_data.json"),
        }
    }
}
