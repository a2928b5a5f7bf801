use std::collections::HashMap;
use std::path::Path;

use chrono::Local;
use serde::Serialize;
use tokio::fs;

use crate::record::RisingRecord;
use crate::{warn_time, Result};

/// The cumulative mapping from seed keyword to its most recently fetched
/// rising-record list. Loaded fully at the start of a run, rewritten at the end.
pub type KnowledgeBase = HashMap<String, Vec<RisingRecord>>;

/// On-disk document wrapping the knowledge base with run metadata.
#[derive(Serialize)]
struct Snapshot<'a> {
    last_updated: String,
    total_seeds_tracked: usize,
    active_data_count: usize,
    data: &'a KnowledgeBase,
}

/// Loads the knowledge base from a prior run. A missing, unreadable or
/// corrupt file just means we start from scratch, never an error.
pub async fn load(path: &Path) -> KnowledgeBase {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(_) => return KnowledgeBase::new(),
    };
    match parse_snapshot(&raw) {
        Some(kb) => kb,
        None => {
            warn_time!("Couldn't parse {}, starting fresh.", path.display());
            KnowledgeBase::new()
        }
    }
}

/// Accepts both the wrapped snapshot shape and the legacy shape where the
/// top-level object is the mapping itself.
fn parse_snapshot(raw: &str) -> Option<KnowledgeBase> {
    let mut value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let mapping = match value.get_mut("data") {
        Some(data) => data.take(),
        None => value,
    };
    serde_json::from_value(mapping).ok()
}

/// Rewrites the snapshot file with the merged knowledge base and a fresh
/// timestamp. Full replace, no partial writes during the run.
pub async fn save(path: &Path, kb: &KnowledgeBase, total_seeds: usize) -> Result<()> {
    let snapshot = Snapshot {
        last_updated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        total_seeds_tracked: total_seeds,
        active_data_count: kb.len(),
        data: kb,
    };
    fs::write(path, serde_json::to_vec_pretty(&snapshot)?).await?;
    Ok(())
}
