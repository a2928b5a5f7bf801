use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::record::{RisingRecord, SurgeValue};
use crate::{Config, Error, Result};

const EXPLORE_URL: &str = "https://trends.google.com/trends/api/explore";
const RELATED_URL: &str = "https://trends.google.com/trends/api/widgetdata/relatedsearches";
const RELATED_WIDGET_ID: &str = "RELATED_QUERIES";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

/// Anything that can fetch the rising related-query table for a keyword.
/// One atomic call per keyword; a throttle comes back as `Error::Throttled`.
#[allow(async_fn_in_trait)]
pub trait RisingProvider {
    async fn fetch_rising(&self, keyword: &str) -> Result<Vec<RisingRecord>>;
}

/// Talks to the Google Trends widget API the way pytrends does: an `explore`
/// request hands out a per-keyword widget token, which unlocks the actual
/// `relatedsearches` data endpoint.
pub struct TrendsClient {
    http: Client,
    hl: String,
    tz: i32,
    geo: String,
    category: u32,
    timeframe: String,
    property: String,
    retries: u32,
}

impl TrendsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(TrendsClient {
            http,
            hl: config.hl.clone(),
            tz: config.tz,
            geo: config.geo.clone(),
            category: config.category,
            timeframe: config.timeframe.clone(),
            property: config.property.clone(),
            retries: config.retries,
        })
    }

    /// GETs a trends endpoint, retrying transport errors with linear backoff.
    /// HTTP 429 is never retried here, it maps straight to `Error::Throttled`
    /// so the caller can apply its cooldown policy.
    async fn get_api_text(&self, url: &str, params: &[(&str, String)]) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            match self.http.get(url).query(params).send().await {
                Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
                    return Err(Error::Throttled);
                }
                Ok(resp) => {
                    let resp = resp.error_for_status()?;
                    return Ok(resp.text().await?);
                }
                Err(err) => {
                    attempt += 1;
                    if attempt > self.retries {
                        return Err(err.into());
                    }
                    tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
                }
            }
        }
    }

    /// Asks `explore` for the widget list and returns the RELATED_QUERIES widget.
    async fn explore(&self, keyword: &str) -> Result<Widget> {
        let req = json!({
            "comparisonItem": [{
                "keyword": keyword,
                "geo": self.geo,
                "time": self.timeframe,
            }],
            "category": self.category,
            "property": self.property,
        });
        let params = [
            ("hl", self.hl.clone()),
            ("tz", self.tz.to_string()),
            ("req", req.to_string()),
        ];
        let body = self.get_api_text(EXPLORE_URL, &params).await?;
        related_widget(&body)
    }
}

impl RisingProvider for TrendsClient {
    async fn fetch_rising(&self, keyword: &str) -> Result<Vec<RisingRecord>> {
        let widget = self.explore(keyword).await?;
        let params = [
            ("hl", self.hl.clone()),
            ("tz", self.tz.to_string()),
            ("req", widget.request.to_string()),
            ("token", widget.token),
        ];
        let body = self.get_api_text(RELATED_URL, &params).await?;
        parse_rising(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ExplorePayload {
    widgets: Vec<RawWidget>,
}

#[derive(Debug, Deserialize)]
struct RawWidget {
    id: String,
    token: Option<String>,
    request: Option<serde_json::Value>,
}

#[derive(Debug)]
struct Widget {
    token: String,
    request: serde_json::Value,
}

/// Picks the related-queries widget (with its token) out of an explore response.
fn related_widget(body: &str) -> Result<Widget> {
    let payload: ExplorePayload = serde_json::from_str(strip_xssi_prefix(body)?)?;
    payload
        .widgets
        .into_iter()
        .find(|w| w.id == RELATED_WIDGET_ID)
        .and_then(|w| {
            Some(Widget {
                token: w.token?,
                request: w.request?,
            })
        })
        .ok_or(Error::MissingWidget(RELATED_WIDGET_ID))
}

#[derive(Debug, Deserialize)]
struct RelatedPayload {
    default: RankedData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedData {
    #[serde(default)]
    ranked_list: Vec<RankedList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedList {
    #[serde(default)]
    ranked_keyword: Vec<RankedRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedRow {
    query: String,
    value: i64,
    #[serde(default)]
    formatted_value: String,
}

/// Extracts the rising table from a `relatedsearches` response.
/// The provider puts "top" at index 0 and "rising" at index 1; a missing
/// rising list means no data for this keyword, which is not an error.
fn parse_rising(body: &str) -> Result<Vec<RisingRecord>> {
    let payload: RelatedPayload = serde_json::from_str(strip_xssi_prefix(body)?)?;
    let rising = payload
        .default
        .ranked_list
        .into_iter()
        .nth(1)
        .map(|list| list.ranked_keyword)
        .unwrap_or_default();

    Ok(rising
        .into_iter()
        .map(|row| RisingRecord {
            value: if row.formatted_value == "Breakout" {
                SurgeValue::Breakout
            } else {
                SurgeValue::Percent(row.value)
            },
            query: row.query,
        })
        .collect())
}

/// The API prepends an anti-XSSI garbage line (`)]}'`) before the JSON.
fn strip_xssi_prefix(body: &str) -> Result<&str> {
    body.find(['{', '['])
        .map(|start| &body[start..])
        .ok_or(Error::UnexpectedPayload("response contains no JSON"))
}
