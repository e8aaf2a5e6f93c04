//! Integration tests for the lookup pipeline.
//!
//! The dictionary API, the model provider and the video platform are all
//! replaced by in-memory fakes, so these run without network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use lexiscope::api;
use lexiscope::config::{Config, EnrichmentConfig, TierConfig, VideoConfig};
use lexiscope::error::{FailureKind, LookupError};
use lexiscope::llm::gateway::{CompletionBackend, CompletionRequest, ModelGateway};
use lexiscope::lookup::DictionaryService;
use lexiscope::models::{LookupRequest, Provenance, SectionPayload};
use lexiscope::sources::bilibili::{
    SubtitleLine, VideoCandidate, VideoDetail, VideoPlatform, VideoStat, KNOWLEDGE_CATEGORY,
};
use lexiscope::sources::dictionary::{
    DictionarySource, RawDefinition, RawEntry, RawMeaning, RawPhonetic, SourceResult,
};
use lexiscope::state::AppState;
use lexiscope::video::VideoMatcher;

// ─── Fakes ───────────────────────────────────────────────

struct FakeSource {
    result: SourceResult,
    calls: AtomicUsize,
}

impl FakeSource {
    fn new(result: SourceResult) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl DictionarySource for FakeSource {
    async fn fetch(&self, _word: &str) -> SourceResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[derive(Clone)]
enum Reply {
    Json(&'static str),
    Fail(&'static str),
    Hang,
}

/// Scripted model: the first rule whose task (and optional prompt
/// fragment) matches decides the reply.
#[derive(Default)]
struct FakeModel {
    rules: Vec<(&'static str, Option<&'static str>, Reply)>,
    calls: AtomicUsize,
}

impl FakeModel {
    fn on(mut self, task: &'static str, reply: Reply) -> Self {
        self.rules.push((task, None, reply));
        self
    }

    /// Well-formed replies for every task.
    fn happy() -> Self {
        Self::default()
            .on("sense_core", Reply::Json(CORE))
            .on("sense_related", Reply::Json(RELATED))
            .on("sense_examples", Reply::Json(r#"{"examples": ["I run daily.", "She runs a shop."]}"#))
            .on("sense_usage_notes", Reply::Json(r#"{"usage_notes": "Common in everyday speech."}"#))
            .on("etymology", Reply::Json(r#"{"etymology": "Old English rinnan", "root_analysis": "Germanic root"}"#))
            .on("word_family", Reply::Json(r#"{"word_family": ["runner", " ", "rerun"]}"#))
            .on("usage_context", Reply::Json(r#"{"modern_relevance": "stable", "common_confusions": [], "regional_variations": []}"#))
            .on("cultural_notes", Reply::Json(r#"{"notes": "Sports idioms."}"#))
            .on("frequency", Reply::Json(r#"{"frequency": "very_common"}"#))
            .on("common_phrases", Reply::Json(r#"{"phrases": ["run"]}"#))
            .on(
                "senses_discovery",
                Reply::Json(r#"{"headword": "rizz", "pronunciation": "/rɪz/", "senses": [{"definition": "Charm.", "part_of_speech": "noun"}]}"#),
            )
    }

    /// Rules added later are checked first.
    fn overriding(self, task: &'static str, reply: Reply) -> Self {
        self.overriding_prompt(task, None, reply)
    }

    fn overriding_prompt(self, task: &'static str, fragment: Option<&'static str>, reply: Reply) -> Self {
        let mut rules = vec![(task, fragment, reply)];
        rules.extend(self.rules);
        Self {
            rules,
            calls: AtomicUsize::new(0),
        }
    }
}

const CORE: &str = r#"{"part_of_speech": "noun", "usage_register": ["neutral"], "domain": ["finance"], "tone": "neutral"}"#;
const RELATED: &str = r#"{"synonyms": ["depository", "lender", "vault"], "antonyms": ["debtor", "borrower"], "word_specific_phrases": ["break the bank", "bank on"]}"#;

#[async_trait]
impl CompletionBackend for FakeModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .rules
            .iter()
            .find(|(task, fragment, _)| {
                *task == request.task && fragment.map_or(true, |f| request.prompt.contains(f))
            })
            .map(|(_, _, reply)| reply.clone());

        match reply {
            Some(Reply::Json(text)) => Ok(text.to_string()),
            Some(Reply::Fail(e)) => Err(anyhow::anyhow!(e)),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(anyhow::anyhow!("hung"))
            }
            None => Err(anyhow::anyhow!("no scripted reply for {}", request.task)),
        }
    }
}

#[derive(Default)]
struct FakePlatform {
    /// (keyword, category) -> results
    searches: HashMap<(String, Option<u32>), Vec<VideoCandidate>>,
    details: HashMap<String, VideoDetail>,
}

#[async_trait]
impl VideoPlatform for FakePlatform {
    async fn search(&self, keyword: &str, category: Option<u32>) -> Result<Vec<VideoCandidate>> {
        Ok(self
            .searches
            .get(&(keyword.to_string(), category))
            .cloned()
            .unwrap_or_default())
    }

    async fn detail(&self, bvid: &str) -> Result<VideoDetail> {
        self.details
            .get(bvid)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown video {bvid}"))
    }
}

// ─── Fixtures ────────────────────────────────────────────

fn definition(text: &str, synonyms: &[&str], antonyms: &[&str]) -> RawDefinition {
    RawDefinition {
        definition: text.to_string(),
        example: None,
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        antonyms: antonyms.iter().map(|s| s.to_string()).collect(),
    }
}

fn meaning(pos: &str, definitions: Vec<RawDefinition>) -> RawMeaning {
    RawMeaning {
        part_of_speech: pos.to_string(),
        definitions,
        ..Default::default()
    }
}

/// Two entries: 3 senses (2 noun + 1 verb) and 5 senses.
fn run_entries() -> Vec<RawEntry> {
    vec![
        RawEntry {
            word: "run".into(),
            phonetic: Some("/ɹʌn/".into()),
            phonetics: vec![
                RawPhonetic {
                    text: Some("/ɹʌn/".into()),
                    audio: None,
                },
                RawPhonetic {
                    text: None,
                    audio: Some("https://x/run-us.mp3".into()),
                },
                RawPhonetic {
                    text: None,
                    audio: Some("https://x/run-uk.mp3".into()),
                },
            ],
            origin: None,
            meanings: vec![
                meaning("noun", vec![definition("A jog.", &[], &[]), definition("A series.", &[], &[])]),
                meaning("verb", vec![definition("To move quickly.", &[], &[])]),
            ],
        },
        RawEntry {
            word: "run".into(),
            meanings: vec![meaning(
                "verb",
                (0..5).map(|i| definition(&format!("Run sense {i}."), &[], &[])).collect(),
            )],
            ..Default::default()
        },
    ]
}

fn bank_entries() -> Vec<RawEntry> {
    vec![RawEntry {
        word: "bank".into(),
        meanings: vec![meaning(
            "noun",
            vec![definition(
                "A financial institution.",
                &["depository", "treasury"],
                &["debtor"],
            )],
        )],
        ..Default::default()
    }]
}

fn service_with(
    source: Arc<FakeSource>,
    model: Arc<FakeModel>,
    platform: FakePlatform,
    enrichment: EnrichmentConfig,
) -> DictionaryService {
    let gateway = ModelGateway::new(model, TierConfig::default());
    let videos = VideoMatcher::new(Arc::new(platform), gateway.clone(), VideoConfig::default());
    DictionaryService::new(gateway, source, videos, enrichment)
}

fn service(source: Arc<FakeSource>, model: Arc<FakeModel>) -> DictionaryService {
    service_with(source, model, FakePlatform::default(), EnrichmentConfig::default())
}

fn section(word: &str, section: &str, entry: Option<i64>, sense: Option<i64>) -> LookupRequest {
    LookupRequest {
        word: Some(word.to_string()),
        section: Some(section.to_string()),
        entry_index: entry,
        sense_index: sense,
    }
}

// ─── Section lookups ─────────────────────────────────────

#[tokio::test]
async fn test_basic_reports_entry_and_sense_counts() {
    let svc = service(FakeSource::new(SourceResult::Found(run_entries())), Arc::new(FakeModel::default()));

    let resp = svc.lookup_section(&section("run", "basic", None, None)).await.unwrap();
    assert!(resp.success);
    let SectionPayload::Basic(basic) = resp.payload else {
        panic!("expected basic payload");
    };
    assert_eq!(basic.data_source, Provenance::ExternalSource);
    assert_eq!(basic.total_entries, 2);
    assert_eq!(basic.total_senses, 8);
    assert_eq!(basic.entries[0].total_senses, 3);
    assert_eq!(basic.entries[1].total_senses, 5);
    assert_eq!(basic.entries[0].pronunciation, "https://x/run-uk.mp3");
}

#[tokio::test]
async fn test_basic_hard_fails_without_dictionary_entry() {
    let model = Arc::new(FakeModel::happy());
    let svc = service(
        FakeSource::new(SourceResult::Failed("API returned status 404".into())),
        model.clone(),
    );

    let err = svc
        .lookup_section(&section("zzzznotaword", "basic", None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::SourceUnavailable(_)));
    assert!(err.to_string().contains("Dictionary API failed"));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0, "no AI fallback for basic");
}

#[tokio::test]
async fn test_detailed_sense_merges_ground_truth_first() {
    let svc = service(FakeSource::new(SourceResult::Found(bank_entries())), Arc::new(FakeModel::happy()));

    let resp = svc
        .lookup_section(&section("bank", "detailed_sense", Some(0), Some(0)))
        .await
        .unwrap();
    let SectionPayload::DetailedSense { detailed_sense, .. } = resp.payload else {
        panic!("expected detailed_sense payload");
    };
    assert_eq!(detailed_sense.definition, "A financial institution.");
    assert_eq!(detailed_sense.synonyms, vec!["depository", "treasury", "lender"]);
    assert_eq!(detailed_sense.antonyms, vec!["debtor", "borrower", ""]);
    assert_eq!(detailed_sense.word_specific_phrases, vec!["break the bank", "bank on", ""]);
    assert_eq!(detailed_sense.part_of_speech, "noun");
}

#[tokio::test]
async fn test_sense_section_without_indices_fails_before_any_call() {
    let source = FakeSource::new(SourceResult::Found(bank_entries()));
    let model = Arc::new(FakeModel::happy());
    let svc = service(source.clone(), model.clone());

    let err = svc
        .lookup_section(&section("x", "detailed_sense", None, None))
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, LookupError::Validation(_)));
    assert!(msg.contains("entry_index") && msg.contains("sense_index"), "{msg}");
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sense_index_out_of_range_names_range() {
    let svc = service(FakeSource::new(SourceResult::Found(run_entries())), Arc::new(FakeModel::happy()));

    let err = svc
        .lookup_section(&section("run", "examples", Some(1), Some(5)))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("0-4"), "{err}");
}

#[tokio::test]
async fn test_ai_fallback_only_exposes_entry_zero() {
    let svc = service(
        FakeSource::new(SourceResult::Failed("API returned status 404".into())),
        Arc::new(FakeModel::happy()),
    );

    let resp = svc
        .lookup_section(&section("rizz", "frequency", Some(0), None))
        .await
        .unwrap();
    assert_eq!(resp.headword, "rizz");
    assert!(matches!(
        resp.payload,
        SectionPayload::Frequency {
            frequency: lexiscope::models::Frequency::VeryCommon,
            ..
        }
    ));

    let err = svc
        .lookup_section(&section("rizz", "frequency", Some(1), None))
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Validation(_)));
}

#[tokio::test]
async fn test_ai_discovery_failure_names_both_steps() {
    let model = FakeModel::happy().overriding("senses_discovery", Reply::Fail("provider down"));
    let svc = service(
        FakeSource::new(SourceResult::Failed("API request timeout".into())),
        Arc::new(model),
    );

    let err = svc
        .lookup_section(&section("rizz", "etymology", None, None))
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("dictionary_api"), "{msg}");
    assert!(msg.contains("senses_discovery"), "{msg}");
}

#[tokio::test]
async fn test_failed_granular_section_defaults() {
    let model = FakeModel::happy().overriding("etymology", Reply::Json("not json at all"));
    let svc = service(FakeSource::new(SourceResult::Found(run_entries())), Arc::new(model));

    let resp = svc.lookup_section(&section("run", "etymology", None, None)).await.unwrap();
    assert!(resp.success);
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["etymology"]["etymology"], "");
    assert_eq!(json["etymology"]["root_analysis"], "");
}

#[tokio::test]
async fn test_sense_enrichment_failure_lists_failed_task() {
    let model = FakeModel::happy().overriding("sense_core", Reply::Json(r#"{"part_of_speech": "noun", "tone": "archaic/rare"}"#));
    let svc = service(FakeSource::new(SourceResult::Found(bank_entries())), Arc::new(model));

    let err = svc
        .lookup_section(&section("bank", "detailed_sense", Some(0), Some(0)))
        .await
        .unwrap_err();
    let LookupError::ModelTask(failure) = err else {
        panic!("expected a single failed task");
    };
    assert_eq!(failure.task, "sense_core");
    assert_eq!(failure.kind, FailureKind::InvalidOutput);
}

#[tokio::test(start_paused = true)]
async fn test_slow_subtask_is_cancelled_at_deadline() {
    let model = FakeModel::happy().overriding("sense_related", Reply::Hang);
    let enrichment = EnrichmentConfig {
        sense_timeout_secs: 10,
        ..Default::default()
    };
    let svc = service_with(
        FakeSource::new(SourceResult::Found(bank_entries())),
        Arc::new(model),
        FakePlatform::default(),
        enrichment,
    );

    let err = svc
        .lookup_section(&section("bank", "detailed_sense", Some(0), Some(0)))
        .await
        .unwrap_err();
    let LookupError::ModelTask(failure) = &err else {
        panic!("expected a single failed task, got {err}");
    };
    assert_eq!(failure.task, "sense_related");
    assert_eq!(failure.kind, FailureKind::Cancelled);
    assert!(err.to_string().contains("cancelled"));
}

#[tokio::test]
async fn test_examples_put_dictionary_example_first() {
    let mut entries = bank_entries();
    entries[0].meanings[0].definitions[0].example = Some("The bank opens at nine.".into());
    let svc = service(FakeSource::new(SourceResult::Found(entries)), Arc::new(FakeModel::happy()));

    let resp = svc
        .lookup_section(&section("bank", "examples", Some(0), Some(0)))
        .await
        .unwrap();
    let SectionPayload::Examples { examples, definition, .. } = resp.payload else {
        panic!("expected examples payload");
    };
    assert_eq!(definition, "A financial institution.");
    assert_eq!(examples, vec!["The bank opens at nine.", "I run daily.", "She runs a shop."]);
}

#[tokio::test]
async fn test_usage_notes_failure_is_an_error() {
    let model = FakeModel::happy().overriding("sense_usage_notes", Reply::Json(r#"{"usage_notes": ""}"#));
    let svc = service(FakeSource::new(SourceResult::Found(bank_entries())), Arc::new(model));

    let err = svc
        .lookup_section(&section("bank", "usage_notes", Some(0), Some(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::ModelTask(_)));
}

// ─── Full-word lookup ────────────────────────────────────

#[tokio::test]
async fn test_full_lookup_tolerates_partial_failure() {
    let model = FakeModel::happy()
        .overriding("etymology", Reply::Fail("rate limited"))
        .overriding("frequency", Reply::Json(r#"{"frequency": "archaic"}"#))
        .overriding_prompt("sense_core", Some("Run sense 2."), Reply::Fail("connection reset"));
    let svc = service(FakeSource::new(SourceResult::Found(run_entries())), Arc::new(model));

    let resp = svc.lookup_word(Some("run")).await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.etymology.etymology, "");
    assert_eq!(resp.etymology.root_analysis, "");
    assert_eq!(resp.frequency, lexiscope::models::Frequency::Common);
    assert_eq!(resp.word_family, vec!["runner", "rerun"]);
    assert_eq!(resp.cultural_notes.notes, "Sports idioms.");
    assert_eq!(resp.pronunciation, "https://x/run-uk.mp3");
    assert_eq!(resp.ipa, "/ɹʌn/");
    assert_eq!(resp.total_entries, 2);
    assert_eq!(resp.total_senses, 8);

    assert_eq!(resp.detailed_senses.len(), 7);
    assert_eq!(resp.failed_senses.len(), 1);
    assert_eq!(
        (resp.failed_senses[0].entry_index, resp.failed_senses[0].sense_index),
        (1, 2)
    );
    assert!(resp.failed_senses[0].error.contains("sense_core"));

    let order: Vec<(usize, usize)> = resp
        .detailed_senses
        .iter()
        .map(|s| (s.entry_index, s.sense_index))
        .collect();
    assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 3), (1, 4)]);
    for sense in &resp.detailed_senses {
        assert_eq!(sense.sense.synonyms.len(), 3);
        assert_eq!(sense.sense.antonyms.len(), 3);
        assert_eq!(sense.sense.word_specific_phrases.len(), 3);
    }
}

#[tokio::test]
async fn test_full_lookup_falls_back_to_ai_discovery() {
    let svc = service(
        FakeSource::new(SourceResult::Failed("API returned status 404".into())),
        Arc::new(FakeModel::happy()),
    );

    let resp = svc.lookup_word(Some("rizz")).await.unwrap();
    assert_eq!(resp.data_source, Provenance::AiFallback);
    assert_eq!(resp.total_entries, 1);
    assert_eq!(resp.detailed_senses.len(), 1);
    assert_eq!(resp.detailed_senses[0].sense.definition, "Charm.");
    assert_eq!(resp.pronunciation, "/rɪz/");
}

// ─── Video matching ──────────────────────────────────────

fn video(bvid: &str, view: u64, like: u64, favorite: u64) -> VideoCandidate {
    VideoCandidate {
        bvid: bvid.to_string(),
        title: format!("<em class=\"keyword\">run</em> {bvid}"),
        duration: 300,
        view,
        like,
        favorite,
        ..Default::default()
    }
}

fn subtitles(lines: &[(f64, &str)]) -> VideoDetail {
    VideoDetail {
        stat: Some(VideoStat {
            view: 50_000,
            ..Default::default()
        }),
        subtitles: lines
            .iter()
            .map(|(from, content)| SubtitleLine {
                from: *from,
                to: from + 2.0,
                content: content.to_string(),
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_videos_prefer_subtitle_match() {
    let mut platform = FakePlatform::default();
    platform.searches.insert(("run".into(), Some(KNOWLEDGE_CATEGORY)), vec![]);
    platform.searches.insert(
        ("run".into(), None),
        vec![video("BVtop", 20_000, 4_000, 2_000), video("BVsecond", 20_000, 1_000, 500)],
    );
    platform.details.insert("BVtop".into(), subtitles(&[(3.0, "running late")]));
    platform
        .details
        .insert("BVsecond".into(), subtitles(&[(40.0, "Run!"), (12.5, "we run every day")]));

    let svc = service_with(
        FakeSource::new(SourceResult::Found(run_entries())),
        Arc::new(FakeModel::happy()),
        platform,
        EnrichmentConfig::default(),
    );

    let resp = svc
        .lookup_section(&section("run", "bilibili_videos", None, None))
        .await
        .unwrap();
    let SectionPayload::BilibiliVideos { bilibili_videos, .. } = resp.payload else {
        panic!("expected bilibili_videos payload");
    };
    assert_eq!(bilibili_videos.len(), 1);
    let found = &bilibili_videos[0];
    assert_eq!(found.bvid, "BVsecond");
    assert_eq!(found.start_time, 12.5);
    assert_eq!(found.matched_phrase, "run");
    assert_eq!(found.video_url, "https://www.bilibili.com/video/BVsecond?t=12");
    assert_eq!(found.title, "run BVsecond");
}

#[tokio::test]
async fn test_videos_fall_back_to_top_candidate_without_subtitles() {
    let mut platform = FakePlatform::default();
    platform.searches.insert(
        ("run".into(), None),
        vec![video("BVlow", 20_000, 100, 50), video("BVtop", 20_000, 4_000, 2_000)],
    );
    platform.details.insert("BVtop".into(), subtitles(&[]));

    let svc = service_with(
        FakeSource::new(SourceResult::Found(run_entries())),
        Arc::new(FakeModel::happy().overriding("common_phrases", Reply::Fail("down"))),
        platform,
        EnrichmentConfig::default(),
    );

    let resp = svc
        .lookup_section(&section("run", "bilibili_videos", None, None))
        .await
        .unwrap();
    let SectionPayload::BilibiliVideos { bilibili_videos, .. } = resp.payload else {
        panic!("expected bilibili_videos payload");
    };
    assert_eq!(bilibili_videos.len(), 1);
    assert_eq!(bilibili_videos[0].bvid, "BVtop");
    assert_eq!(bilibili_videos[0].start_time, 0.0);
    assert_eq!(bilibili_videos[0].view, 50_000);
    assert_eq!(bilibili_videos[0].video_url, "https://www.bilibili.com/video/BVtop");
}

#[tokio::test]
async fn test_videos_empty_when_nothing_qualifies() {
    let svc = service(FakeSource::new(SourceResult::Found(run_entries())), Arc::new(FakeModel::happy()));

    let resp = svc
        .lookup_section(&section("run", "bilibili_videos", None, None))
        .await
        .unwrap();
    assert!(resp.success);
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["bilibili_videos"], serde_json::json!([]));
}

// ─── HTTP layer ──────────────────────────────────────────

fn app(source: Arc<FakeSource>) -> axum::Router {
    let svc = service(source, Arc::new(FakeModel::happy()));
    api::router(AppState::with_service(Config::default(), svc))
}

async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_http_health() {
    let req = Request::builder().uri("/api/dictionary/test").body(Body::empty()).unwrap();
    let (status, body) = send(app(FakeSource::new(SourceResult::Found(run_entries()))), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_http_missing_word_is_bad_request() {
    let (status, body) = send(
        app(FakeSource::new(SourceResult::Found(run_entries()))),
        post("/api/dictionary", serde_json::json!({ "section": "basic" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body.get("headword").is_none());
}

#[tokio::test]
async fn test_http_source_failure_is_not_found() {
    let (status, body) = send(
        app(FakeSource::new(SourceResult::Failed("API returned status 404".into()))),
        post("/api/dictionary", serde_json::json!({ "word": "zzzznotaword", "section": "basic" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["headword"], "zzzznotaword");
    assert!(body["error"].as_str().unwrap().contains("Dictionary API failed"));
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_http_basic_section_envelope() {
    let (status, body) = send(
        app(FakeSource::new(SourceResult::Found(run_entries()))),
        post("/api/dictionary", serde_json::json!({ "word": "run", "section": "basic" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["headword"], "run");
    assert_eq!(body["section"], "basic");
    assert_eq!(body["total_entries"], 2);
    assert_eq!(body["data_source"], "external_source");
    assert_eq!(body["success"], true);
    assert!(body["execution_time"].is_number());
}

#[tokio::test]
async fn test_http_full_lookup() {
    let (status, body) = send(
        app(FakeSource::new(SourceResult::Found(bank_entries()))),
        post("/api/dictionary/full", serde_json::json!({ "word": "bank" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["headword"], "bank");
    assert_eq!(body["detailed_senses"][0]["entry_index"], 0);
    assert_eq!(body["detailed_senses"][0]["synonyms"][0], "depository");
    assert!(body["generated_at"].is_string());
}

#[tokio::test]
async fn test_http_bilibili_videos_section() {
    let mut platform = FakePlatform::default();
    platform.searches.insert(("run out!".into(), None), vec![video("BVtop", 20_000, 4_000, 2_000)]);
    platform.searches.insert(("run".into(), None), vec![video("BVsecond", 20_000, 1_000, 500)]);
    platform.details.insert("BVtop".into(), subtitles(&[(7.0, "Hurry, we'll run out! Go")]));
    platform.details.insert("BVsecond".into(), subtitles(&[(20.0, "I run at dawn")]));

    let model = FakeModel::happy().overriding(
        "common_phrases",
        Reply::Json(r#"{"phrases": ["run out!", "run", "RUN OUT!"]}"#),
    );
    let svc = service_with(
        FakeSource::new(SourceResult::Found(run_entries())),
        Arc::new(model),
        platform,
        EnrichmentConfig::default(),
    );
    let app = api::router(AppState::with_service(Config::default(), svc));

    let (status, body) = send(
        app,
        post("/api/dictionary", serde_json::json!({ "word": "run", "section": "bilibili_videos" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["section"], "bilibili_videos");
    let videos = body["bilibili_videos"].as_array().unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0]["matched_phrase"], "run out!");
    assert_eq!(videos[0]["video_url"], "https://www.bilibili.com/video/BVtop?t=7");
    assert_eq!(videos[1]["matched_phrase"], "run");
    assert_eq!(videos[1]["video_url"], "https://www.bilibili.com/video/BVsecond?t=20");
}
