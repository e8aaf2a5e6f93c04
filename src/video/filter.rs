//! Candidate filtering and engagement scoring.

use crate::config::VideoConfig;
use crate::sources::bilibili::VideoCandidate;
use crate::video::subtitles::strip_markup;

pub const MIN_DURATION_SECS: u64 = 45;
pub const MAX_DURATION_SECS: u64 = 1800;

/// Title/tag signals of teaching content.
const EDUCATIONAL_KEYWORDS: &[&str] = &[
    "英语", "单词", "词汇", "学习", "教学", "讲解", "用法", "发音", "口语", "语法", "雅思", "托福",
    "四六级", "考研", "english", "vocabulary", "grammar", "lesson", "learn", "pronunciation",
    "ielts", "toefl", "tutorial",
];

/// Title/tag signals of entertainment content.
const ENTERTAINMENT_KEYWORDS: &[&str] = &[
    "搞笑", "鬼畜", "游戏", "直播", "娱乐", "恶搞", "舞蹈", "翻唱", "动漫", "明星", "综艺", "vlog",
    "prank", "meme", "gameplay", "funny", "reaction",
];

/// Which search produced a candidate; knowledge-partition results are held
/// to a stricter content filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Knowledge,
    Unrestricted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: VideoCandidate,
    pub score: f64,
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

pub fn passes_filter(candidate: &VideoCandidate, scope: SearchScope, config: &VideoConfig) -> bool {
    if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&candidate.duration) {
        return false;
    }
    if candidate.view < config.min_views || candidate.favorite < config.min_favorites {
        return false;
    }

    let text = format!("{} {}", strip_markup(&candidate.title), candidate.tags).to_lowercase();
    if contains_any(&text, ENTERTAINMENT_KEYWORDS) {
        return false;
    }
    match scope {
        SearchScope::Knowledge => contains_any(&text, EDUCATIONAL_KEYWORDS),
        SearchScope::Unrestricted => true,
    }
}

/// `0.3·like/view + 0.5·fav/view + 0.2·(like+fav+reply)/view + 0.1·min(view/100000, 1)`
pub fn engagement_score(candidate: &VideoCandidate) -> f64 {
    if candidate.view == 0 {
        return 0.0;
    }
    let views = candidate.view as f64;
    let likes = candidate.like as f64;
    let favorites = candidate.favorite as f64;
    let replies = candidate.reply as f64;

    0.3 * (likes / views)
        + 0.5 * (favorites / views)
        + 0.2 * ((likes + favorites + replies) / views)
        + 0.1 * (views / 100_000.0).min(1.0)
}

/// Filter, score and sort descending. Candidates below the score floor are
/// dropped.
pub fn rank_candidates(
    candidates: Vec<VideoCandidate>,
    scope: SearchScope,
    config: &VideoConfig,
) -> Vec<ScoredCandidate> {
    let mut ranked: Vec<ScoredCandidate> = candidates
        .into_iter()
        .filter(|c| passes_filter(c, scope, config))
        .map(|mut c| {
            c.title = strip_markup(&c.title);
            let score = engagement_score(&c);
            ScoredCandidate { candidate: c, score }
        })
        .filter(|s| s.score >= config.min_score)
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}
