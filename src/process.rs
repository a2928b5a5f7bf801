use std::time::Duration;

use chrono::Local;
use rand::Rng;

use crate::request::{RisingProvider, TrendsClient};
use crate::store::{self, KnowledgeBase};
use crate::{info_time, seeds, warn_time, Config, Error, Result};

/// Sleeps between requests. Abstracted so tests can count pacing calls
/// instead of waiting out real minutes.
#[allow(async_fn_in_trait)]
pub trait Pacer {
    /// Random pacing sleep drawn uniformly from `[min, max]`.
    async fn pace(&self, min: Duration, max: Duration);
    /// Fixed sleep after a failure.
    async fn cooldown(&self, duration: Duration);
}

/// Production pacer, actually sleeps on the tokio timer.
pub struct TokioPacer;

impl Pacer for TokioPacer {
    async fn pace(&self, min: Duration, max: Duration) {
        let secs = {
            let mut rng = rand::thread_rng();
            rng.gen_range(min.as_secs_f64()..=max.as_secs_f64())
        };
        info_time!("Pacing sleep for {:.1} sec...", secs);
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }

    async fn cooldown(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub updated: usize,
    pub failed: usize,
}

/// One full run: load the knowledge base, scrape a random batch of seeds,
/// persist the merged result. Per-keyword failures are counted, never fatal.
pub async fn run() -> Result<RunReport> {
    let start_time = Local::now();
    let config = Config::default();

    info_time!("Started a scrape run");

    let mut kb = store::load(&config.output_path).await;
    info_time!("Knowledge base holds {} keywords", kb.len());

    let batch = seeds::sample_batch(&config);
    info_time!("This run targets {} seeds: {:?}", batch.len(), batch);

    let provider = TrendsClient::new(&config)?;
    let report = run_batch(&config, &batch, &mut kb, &provider, &TokioPacer).await;

    store::save(&config.output_path, &kb, seeds::ALL_SEEDS.len()).await?;
    info_time!(
        start_time,
        "Run done. Updated: {}, failed: {}, knowledge base now holds {} keywords",
        report.updated,
        report.failed,
        kb.len()
    );

    Ok(report)
}

/// The fetch-merge-persist loop's fetch-merge half. For every seed, fetch the
/// rising table and replace the seed's entry on success (an empty table is a
/// success, stored as `[]` so the seed isn't treated as unknown next run).
/// Throttles and other errors leave the entry untouched and sleep their own
/// cooldown; successes pace with a random sleep unless they're the last seed.
pub async fn run_batch<P, S>(
    config: &Config,
    batch: &[String],
    kb: &mut KnowledgeBase,
    provider: &P,
    pacer: &S,
) -> RunReport
where
    P: RisingProvider,
    S: Pacer,
{
    let total = batch.len();
    let mut report = RunReport::default();
    let mut consecutive_throttles = 0;

    for (i, keyword) in batch.iter().enumerate() {
        info_time!("[{}/{}] Fetching rising queries for {:?}", i + 1, total, keyword);

        match provider.fetch_rising(keyword).await {
            Ok(records) => {
                consecutive_throttles = 0;
                if records.is_empty() {
                    info_time!("No rising data for {:?}", keyword);
                } else {
                    info_time!("Found {} rising queries for {:?}", records.len(), keyword);
                }
                kb.insert(keyword.clone(), records);
                report.updated += 1;

                if i + 1 < total {
                    pacer.pace(config.min_delay, config.max_delay).await;
                }
            }
            Err(Error::Throttled) => {
                report.failed += 1;
                consecutive_throttles += 1;
                if consecutive_throttles >= config.throttle_limit {
                    warn_time!(
                        "Throttled {} times in a row, aborting the batch.",
                        consecutive_throttles
                    );
                    break;
                }
                warn_time!(
                    "Throttled on {:?}, cooling down for {} sec...",
                    keyword,
                    config.cooldown.as_secs()
                );
                pacer.cooldown(config.cooldown).await;
            }
            Err(err) => {
                report.failed += 1;
                consecutive_throttles = 0;
                warn_time!("Fetch failed for {:?}: {}", keyword, err);
                pacer.cooldown(config.recovery_delay).await;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::record::{RisingRecord, SurgeValue};

    /// Scripted provider: every keyword maps to a canned outcome, and the
    /// total number of fetch attempts is recorded.
    struct ScriptedProvider {
        outcomes: Mutex<HashMap<String, Outcome>>,
        attempts: AtomicUsize,
    }

    #[derive(Clone)]
    enum Outcome {
        Rows(Vec<RisingRecord>),
        Throttle,
        Fail,
    }

    impl ScriptedProvider {
        fn new(outcomes: impl IntoIterator<Item = (&'static str, Outcome)>) -> Self {
            ScriptedProvider {
                outcomes: Mutex::new(
                    outcomes
                        .into_iter()
                        .map(|(k, o)| (k.to_string(), o))
                        .collect(),
                ),
                attempts: AtomicUsize::new(0),
            }
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl RisingProvider for ScriptedProvider {
        async fn fetch_rising(&self, keyword: &str) -> Result<Vec<RisingRecord>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            match self.outcomes.lock().unwrap().get(keyword).cloned() {
                Some(Outcome::Rows(rows)) => Ok(rows),
                Some(Outcome::Throttle) => Err(Error::Throttled),
                Some(Outcome::Fail) => Err(Error::UnexpectedPayload("scripted failure")),
                None => Ok(vec![]),
            }
        }
    }

    /// Pacer that only counts, never sleeps.
    #[derive(Default)]
    struct CountingPacer {
        paces: AtomicUsize,
        cooldowns: AtomicUsize,
    }

    impl Pacer for CountingPacer {
        async fn pace(&self, _min: Duration, _max: Duration) {
            self.paces.fetch_add(1, Ordering::SeqCst);
        }

        async fn cooldown(&self, _duration: Duration) {
            self.cooldowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn record(query: &str, value: SurgeValue) -> RisingRecord {
        RisingRecord {
            query: query.into(),
            value,
        }
    }

    fn batch(seeds: &[&str]) -> Vec<String> {
        seeds.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn successful_fetch_replaces_prior_entry() {
        let mut kb = KnowledgeBase::new();
        kb.insert("ai".into(), vec![record("old", SurgeValue::Percent(10))]);

        let fresh = vec![record("ai tools", SurgeValue::Percent(250))];
        let provider = ScriptedProvider::new([("ai", Outcome::Rows(fresh.clone()))]);
        let pacer = CountingPacer::default();

        let report =
            run_batch(&Config::default(), &batch(&["ai"]), &mut kb, &provider, &pacer).await;

        assert_eq!(kb["ai"], fresh);
        assert_eq!(report, RunReport { updated: 1, failed: 0 });
    }

    #[tokio::test]
    async fn empty_result_is_a_success_stored_as_empty_list() {
        let mut kb = KnowledgeBase::new();
        let provider = ScriptedProvider::new([
            ("ai", Outcome::Rows(vec![record("ai tools", SurgeValue::Percent(250))])),
            ("crypto", Outcome::Rows(vec![])),
        ]);
        let pacer = CountingPacer::default();

        let report = run_batch(
            &Config::default(),
            &batch(&["ai", "crypto"]),
            &mut kb,
            &provider,
            &pacer,
        )
        .await;

        assert_eq!(kb["ai"], vec![record("ai tools", SurgeValue::Percent(250))]);
        assert_eq!(kb["crypto"], vec![]);
        assert_eq!(report, RunReport { updated: 2, failed: 0 });
    }

    #[tokio::test]
    async fn throttle_leaves_entry_unchanged() {
        let old = vec![record("old", SurgeValue::Percent(10))];
        let mut kb = KnowledgeBase::new();
        kb.insert("ai".into(), old.clone());

        let provider = ScriptedProvider::new([("ai", Outcome::Throttle)]);
        let pacer = CountingPacer::default();

        let report =
            run_batch(&Config::default(), &batch(&["ai"]), &mut kb, &provider, &pacer).await;

        assert_eq!(kb["ai"], old);
        assert_eq!(report, RunReport { updated: 0, failed: 1 });
    }

    #[tokio::test]
    async fn errored_keyword_stays_absent_from_the_kb() {
        let mut kb = KnowledgeBase::new();
        let provider = ScriptedProvider::new([("ai", Outcome::Fail)]);
        let pacer = CountingPacer::default();

        let report =
            run_batch(&Config::default(), &batch(&["ai"]), &mut kb, &provider, &pacer).await;

        assert!(!kb.contains_key("ai"));
        assert_eq!(report, RunReport { updated: 0, failed: 1 });
        assert_eq!(pacer.cooldowns.load(Ordering::SeqCst), 1);
        assert_eq!(pacer.paces.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn paces_once_per_non_final_success_only() {
        let mut kb = KnowledgeBase::new();
        let provider = ScriptedProvider::new([
            ("a", Outcome::Rows(vec![])),
            ("b", Outcome::Fail),
            ("c", Outcome::Rows(vec![])),
            ("d", Outcome::Rows(vec![])),
        ]);
        let pacer = CountingPacer::default();

        run_batch(
            &Config::default(),
            &batch(&["a", "b", "c", "d"]),
            &mut kb,
            &provider,
            &pacer,
        )
        .await;

        // "a" and "c" pace; "b" cooled down instead; "d" is final so no pace.
        assert_eq!(provider.attempts(), 4);
        assert_eq!(pacer.paces.load(Ordering::SeqCst), 2);
        assert_eq!(pacer.cooldowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_batch_issues_no_fetches() {
        let mut kb = KnowledgeBase::new();
        let provider = ScriptedProvider::new([]);
        let pacer = CountingPacer::default();

        let report = run_batch(&Config::default(), &[], &mut kb, &provider, &pacer).await;

        assert_eq!(provider.attempts(), 0);
        assert_eq!(report, RunReport::default());
        assert!(kb.is_empty());
    }

    #[tokio::test]
    async fn consecutive_throttles_abort_the_batch() {
        let mut kb = KnowledgeBase::new();
        let provider = ScriptedProvider::new([
            ("a", Outcome::Throttle),
            ("b", Outcome::Throttle),
            ("c", Outcome::Throttle),
            ("d", Outcome::Throttle),
            ("e", Outcome::Throttle),
        ]);
        let pacer = CountingPacer::default();
        let config = Config {
            throttle_limit: 3,
            ..Config::default()
        };

        let report = run_batch(
            &config,
            &batch(&["a", "b", "c", "d", "e"]),
            &mut kb,
            &provider,
            &pacer,
        )
        .await;

        // Third consecutive throttle aborts without another cooldown.
        assert_eq!(provider.attempts(), 3);
        assert_eq!(report, RunReport { updated: 0, failed: 3 });
        assert_eq!(pacer.cooldowns.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_success_resets_the_throttle_streak() {
        let mut kb = KnowledgeBase::new();
        let provider = ScriptedProvider::new([
            ("a", Outcome::Throttle),
            ("b", Outcome::Throttle),
            ("c", Outcome::Rows(vec![])),
            ("d", Outcome::Throttle),
            ("e", Outcome::Rows(vec![])),
        ]);
        let pacer = CountingPacer::default();
        let config = Config {
            throttle_limit: 3,
            ..Config::default()
        };

        let report = run_batch(
            &config,
            &batch(&["a", "b", "c", "d", "e"]),
            &mut kb,
            &provider,
            &pacer,
        )
        .await;

        assert_eq!(provider.attempts(), 5);
        assert_eq!(report, RunReport { updated: 2, failed: 3 });
    }
}
