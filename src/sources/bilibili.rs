//! Bilibili web API client: video search, metadata and subtitle tracks.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::config::VideoConfig;

/// Bilibili "knowledge" partition.
pub const KNOWLEDGE_CATEGORY: u32 = 36;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const REFERER: &str = "https://www.bilibili.com";

/// One search result.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct VideoCandidate {
    #[serde(default)]
    pub bvid: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub aid: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pic: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub mid: u64,
    #[serde(default, rename = "play", deserialize_with = "lenient_u64")]
    pub view: u64,
    #[serde(default, rename = "video_review", deserialize_with = "lenient_u64")]
    pub danmaku: u64,
    #[serde(default, rename = "review", deserialize_with = "lenient_u64")]
    pub reply: u64,
    #[serde(default, rename = "favorites", deserialize_with = "lenient_u64")]
    pub favorite: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub like: u64,
    #[serde(default)]
    pub pubdate: i64,
    /// Seconds; the API sends "m:ss" or "h:mm:ss".
    #[serde(default, deserialize_with = "clock_duration")]
    pub duration: u64,
    /// Comma-separated tags
    #[serde(default, rename = "tag")]
    pub tags: String,
}

/// Engagement counters from the video metadata endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct VideoStat {
    #[serde(default)]
    pub view: u64,
    #[serde(default)]
    pub danmaku: u64,
    #[serde(default)]
    pub reply: u64,
    #[serde(default)]
    pub favorite: u64,
    #[serde(default)]
    pub coin: u64,
    #[serde(default)]
    pub share: u64,
    #[serde(default)]
    pub like: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SubtitleLine {
    pub from: f64,
    #[serde(default)]
    pub to: f64,
    pub content: String,
}

/// Metadata and the preferred subtitle track of one video.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoDetail {
    pub stat: Option<VideoStat>,
    pub subtitles: Vec<SubtitleLine>,
}

/// External video platform.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Search videos; `category` restricts to one partition.
    async fn search(&self, keyword: &str, category: Option<u32>) -> Result<Vec<VideoCandidate>>;

    /// Fetch stats and subtitle lines. Videos without subtitles return an
    /// empty line list, not an error.
    async fn detail(&self, bvid: &str) -> Result<VideoDetail>;
}

pub struct BilibiliClient {
    client: reqwest::Client,
    config: VideoConfig,
}

impl BilibiliClient {
    pub fn new(client: reqwest::Client, config: VideoConfig) -> Self {
        if config.sessdata.is_none() {
            tracing::warn!("BILIBILI_SESSDATA not set; subtitle tracks may be unavailable");
        }
        Self { client, config }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .get(url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::REFERER, REFERER);
        if let Some(sessdata) = &self.config.sessdata {
            req = req.header(reqwest::header::COOKIE, format!("SESSDATA={sessdata}"));
        }
        req
    }

    /// Call an endpoint wrapped in the `{code, message, data}` envelope.
    async fn call<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder, what: &str) -> Result<T> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("Failed to call Bilibili {what} API"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Bilibili {what} API returned {status}");
        }

        let body: Envelope<T> = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse Bilibili {what} response"))?;

        if body.code != 0 {
            anyhow::bail!("Bilibili {what} API error {}: {}", body.code, body.message);
        }
        body.data
            .with_context(|| format!("Bilibili {what} response has no data"))
    }
}

#[async_trait]
impl VideoPlatform for BilibiliClient {
    async fn search(&self, keyword: &str, category: Option<u32>) -> Result<Vec<VideoCandidate>> {
        let url = format!("{}/x/web-interface/search/type", self.config.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("search_type", "video".to_string()),
            ("keyword", keyword.to_string()),
            ("page", "1".to_string()),
        ];
        if let Some(tid) = category {
            query.push(("tids", tid.to_string()));
        }

        let data: SearchData = self.call(self.get(&url).query(&query), "search").await?;
        Ok(data.result)
    }

    async fn detail(&self, bvid: &str) -> Result<VideoDetail> {
        let view_url = format!("{}/x/web-interface/view", self.config.base_url);
        let view: ViewData = self
            .call(self.get(&view_url).query(&[("bvid", bvid)]), "view")
            .await?;

        let player_url = format!("{}/x/player/v2", self.config.base_url);
        let player: PlayerData = self
            .call(
                self.get(&player_url)
                    .query(&[("bvid", bvid.to_string()), ("cid", view.cid.to_string())]),
                "player",
            )
            .await?;

        let Some(track) = pick_subtitle_track(&player.subtitle.subtitles) else {
            return Ok(VideoDetail {
                stat: Some(view.stat),
                subtitles: Vec::new(),
            });
        };

        let track_url = if track.subtitle_url.starts_with("//") {
            format!("https:{}", track.subtitle_url)
        } else {
            track.subtitle_url.clone()
        };

        let resp = self
            .get(&track_url)
            .send()
            .await
            .context("Failed to download subtitle track")?;
        if !resp.status().is_success() {
            anyhow::bail!("Subtitle download returned {}", resp.status());
        }
        let body: SubtitleBody = resp.json().await.context("Failed to parse subtitle track")?;

        Ok(VideoDetail {
            stat: Some(view.stat),
            subtitles: body.body,
        })
    }
}

/// English tracks first (human before AI-generated), else the first track.
fn pick_subtitle_track(tracks: &[SubtitleTrack]) -> Option<&SubtitleTrack> {
    let usable = || tracks.iter().filter(|t| !t.subtitle_url.is_empty());
    usable()
        .find(|t| t.lan.starts_with("en"))
        .or_else(|| usable().find(|t| t.lan.contains("en")))
        .or_else(|| usable().next())
}

// ─── Response types ────────────────────────────────────

#[derive(Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Deserialize)]
struct SearchData {
    #[serde(default)]
    result: Vec<VideoCandidate>,
}

#[derive(Deserialize)]
struct ViewData {
    cid: u64,
    #[serde(default)]
    stat: VideoStat,
}

#[derive(Deserialize)]
struct PlayerData {
    #[serde(default)]
    subtitle: PlayerSubtitles,
}

#[derive(Deserialize, Default)]
struct PlayerSubtitles {
    #[serde(default)]
    subtitles: Vec<SubtitleTrack>,
}

#[derive(Deserialize, Debug)]
struct SubtitleTrack {
    #[serde(default)]
    lan: String,
    #[serde(default)]
    subtitle_url: String,
}

#[derive(Deserialize)]
struct SubtitleBody {
    #[serde(default)]
    body: Vec<SubtitleLine>,
}

/// Counters sometimes arrive as strings ("1234", "--").
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn clock_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => parse_clock(&s).unwrap_or(0),
        _ => 0,
    })
}

/// "4:35" -> 275, "1:02:03" -> 3723.
pub fn parse_clock(s: &str) -> Option<u64> {
    let mut total = 0u64;
    for part in s.trim().split(':') {
        let part = part.trim().parse::<u64>().ok()?;
        total = total.checked_mul(60)?.checked_add(part)?;
    }
    Some(total)
}
