use chrono::Local;
use trendscrap::{info_time, process::run, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Local::now();
    let report = run().await?;
    info_time!(
        start_time,
        "Full program time: ({} updated / {} failed)",
        report.updated,
        report.failed
    );

    Ok(())
}
