//! Video matching: one illustrative video per search phrase.
//!
//! ```text
//! word ─▶ phrases (model, fallback: [word])
//!          │ per phrase, concurrently
//!          ▼
//!   search knowledge partition ─(no results)─▶ search unrestricted
//!          ▼
//!   filter + score + sort ─▶ probe top N for subtitles ─▶ VideoMatch
//! ```

pub mod filter;
pub mod subtitles;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use futures_util::stream::{self, StreamExt};

use crate::config::{Tier, VideoConfig};
use crate::llm::gateway::ModelGateway;
use crate::llm::prompts;
use crate::llm::schemas::CommonPhrases;
use crate::models::VideoMatch;
use crate::sources::bilibili::{VideoCandidate, VideoPlatform, VideoStat, KNOWLEDGE_CATEGORY};

use filter::{rank_candidates, ScoredCandidate, SearchScope};
use subtitles::{compose_video_url, earliest_match, phrase_pattern};

const MAX_PHRASES: usize = 3;
/// Detail fetches in flight while probing one phrase's candidates.
const PROBE_CONCURRENCY: usize = 4;

#[derive(Clone)]
pub struct VideoMatcher {
    platform: Arc<dyn VideoPlatform>,
    gateway: ModelGateway,
    config: VideoConfig,
}

impl VideoMatcher {
    pub fn new(platform: Arc<dyn VideoPlatform>, gateway: ModelGateway, config: VideoConfig) -> Self {
        Self {
            platform,
            gateway,
            config,
        }
    }

    /// Find videos for `word`. Never fails: phrases without a usable video
    /// are logged and skipped, so the result may be empty.
    pub async fn find_videos(&self, word: &str) -> Vec<VideoMatch> {
        let phrases = self.phrases(word).await;
        tracing::info!("Matching videos for '{word}' with phrases {phrases:?}");

        let results =
            futures_util::future::join_all(phrases.iter().map(|p| self.match_phrase(p))).await;

        phrases
            .iter()
            .zip(results)
            .filter_map(|(phrase, result)| match result {
                Ok(Some(found)) => Some(found),
                Ok(None) => {
                    tracing::warn!("No usable video for phrase '{phrase}'");
                    None
                }
                Err(e) => {
                    tracing::warn!("Video search failed for phrase '{phrase}': {e:#}");
                    None
                }
            })
            .collect()
    }

    async fn phrases(&self, word: &str) -> Vec<String> {
        let generated = self
            .gateway
            .complete::<CommonPhrases>("common_phrases", prompts::common_phrases_prompt(word), Tier::Simple)
            .await;

        let generated = match generated {
            Ok(p) => p.phrases,
            Err(failure) => {
                tracing::warn!("Phrase generation failed, searching the bare word: {failure}");
                Vec::new()
            }
        };
        clean_phrases(generated, word)
    }

    async fn search_ranked(&self, phrase: &str) -> Result<Vec<ScoredCandidate>> {
        let knowledge = self.platform.search(phrase, Some(KNOWLEDGE_CATEGORY)).await?;
        let (candidates, scope) = if knowledge.is_empty() {
            tracing::debug!("No knowledge-partition results for '{phrase}', searching unrestricted");
            (self.platform.search(phrase, None).await?, SearchScope::Unrestricted)
        } else {
            (knowledge, SearchScope::Knowledge)
        };
        Ok(rank_candidates(candidates, scope, &self.config))
    }

    async fn match_phrase(&self, phrase: &str) -> Result<Option<VideoMatch>> {
        let ranked = self.search_ranked(phrase).await?;
        let Some(top) = ranked.first() else {
            return Ok(None);
        };
        let Some(pattern) = phrase_pattern(phrase) else {
            return Ok(Some(build_match(&top.candidate, None, phrase, 0.0)));
        };

        // Owned futures keep the stream 'static and Send.
        let fetches: Vec<_> = ranked
            .iter()
            .take(self.config.probe_limit)
            .enumerate()
            .map(|(i, scored)| {
                let platform = self.platform.clone();
                let bvid = scored.candidate.bvid.clone();
                async move { (i, platform.detail(&bvid).await) }
            })
            .collect();
        let mut probes = stream::iter(fetches).buffered(PROBE_CONCURRENCY);

        let mut top_stat: Option<VideoStat> = None;
        while let Some((i, detail)) = probes.next().await {
            let scored = &ranked[i];
            let detail = match detail {
                Ok(d) => d,
                Err(e) => {
                    tracing::debug!("Probe of {} failed: {e:#}", scored.candidate.bvid);
                    continue;
                }
            };
            if scored.candidate.bvid == top.candidate.bvid {
                top_stat = detail.stat.clone();
            }
            if let Some(start) = earliest_match(&detail.subtitles, &pattern) {
                tracing::info!(
                    "Phrase '{phrase}' found in {} at {start:.1}s",
                    scored.candidate.bvid
                );
                return Ok(Some(build_match(&scored.candidate, detail.stat.as_ref(), phrase, start)));
            }
        }

        Ok(Some(build_match(&top.candidate, top_stat.as_ref(), phrase, 0.0)))
    }
}

/// Trim, drop blanks and case-insensitive repeats, keep the first
/// [`MAX_PHRASES`]. Falls back to the bare word.
fn clean_phrases(raw: Vec<String>, word: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let phrases: Vec<String> = raw
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && seen.insert(p.to_lowercase()))
        .take(MAX_PHRASES)
        .collect();
    if phrases.is_empty() {
        vec![word.to_string()]
    } else {
        phrases
    }
}

/// Combine search metadata with detail stats, preferring the latter.
fn build_match(
    candidate: &VideoCandidate,
    stat: Option<&VideoStat>,
    phrase: &str,
    start_time: f64,
) -> VideoMatch {
    let (view, danmaku, reply, favorite, coin, share, like) = match stat {
        Some(s) => (s.view, s.danmaku, s.reply, s.favorite, s.coin, s.share, s.like),
        None => (
            candidate.view,
            candidate.danmaku,
            candidate.reply,
            candidate.favorite,
            0,
            0,
            candidate.like,
        ),
    };
    let pic = if candidate.pic.starts_with("//") {
        format!("https:{}", candidate.pic)
    } else {
        candidate.pic.clone()
    };

    VideoMatch {
        bvid: candidate.bvid.clone(),
        aid: candidate.aid,
        title: candidate.title.clone(),
        description: candidate.description.clone(),
        pic,
        author: candidate.author.clone(),
        mid: candidate.mid,
        view,
        danmaku,
        reply,
        favorite,
        coin,
        share,
        like,
        pubdate: candidate.pubdate,
        duration: candidate.duration,
        start_time,
        matched_phrase: phrase.to_string(),
        video_url: compose_video_url(&candidate.bvid, start_time),
    }
}
