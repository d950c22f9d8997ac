//! End-to-end load flow over a scripted transport and a shared in-memory store.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use careconnect_core::{
    Category, Clock, Domain, FeedbackKind, FixedClock, Profile, reference_dataset,
};
use careconnect_store::{BundleSource, ContentStore, KvStore, MemoryKv};
use careconnect_sync::{
    ContentFetcher, DashboardLoader, FetchFailure, FetcherConfig, RawResponse, Transport,
    TransportError,
};
use serde_json::{Value, json};

type Reply = Result<RawResponse, TransportError>;

#[derive(Default)]
struct Script {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    bodies: Mutex<Vec<Value>>,
}

/// Replies in order; repeats the last reply once the script runs out.
/// Clones share one script.
#[derive(Clone)]
struct Scripted(Arc<Script>);

impl Scripted {
    fn new(replies: Vec<Reply>) -> Self {
        let script = Script::default();
        *script.replies.lock().unwrap() = replies.into();
        Self(Arc::new(script))
    }

    fn calls(&self) -> usize {
        self.0.bodies.lock().unwrap().len()
    }

    fn body(&self, n: usize) -> Value {
        self.0.bodies.lock().unwrap()[n].clone()
    }
}

fn ok(status: u16, body: Value) -> Reply {
    Ok(RawResponse {
        status,
        body: body.to_string(),
    })
}

#[async_trait]
impl Transport for Scripted {
    async fn post_json(&self, _path: &str, body: &Value) -> Reply {
        self.0.bodies.lock().unwrap().push(body.clone());
        let next = self.0.replies.lock().unwrap().pop_front();
        let mut last = self.0.last.lock().unwrap();
        if let Some(reply) = next {
            *last = Some(reply);
        }
        (*last)
            .clone()
            .unwrap_or_else(|| Err(TransportError::Request("no reply scripted".into())))
    }

    async fn get(&self, _path: &str) -> Reply {
        ok(200, json!({"status": "healthy"}))
    }
}

struct Harness {
    kv: Arc<dyn KvStore>,
    store: ContentStore,
    transport: Scripted,
}

impl Harness {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            kv: Arc::new(MemoryKv::new()),
            store: ContentStore::new(),
            transport: Scripted::new(replies),
        }
    }

    fn loader_on(&self, day: u32) -> DashboardLoader<Scripted> {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::on(2026, 10, day).unwrap());
        DashboardLoader::new(
            ContentFetcher::new(self.transport.clone(), FetcherConfig::default()),
            self.kv.clone(),
            self.store.clone(),
            clock,
        )
    }
}

fn music_only() -> Value {
    json!({
        "patient_info": {"cultural_heritage": "Italian-American", "age_group": "oldest_senior"},
        "content": {
            "music": {
                "artist": "Dean Martin",
                "song": "That's Amore",
                "fun_fact": "",
                "conversation_starters": []
            }
        },
        "metadata": {"theme": "Family"}
    })
}

#[tokio::test]
async fn server_error_serves_reference_and_caches_it() {
    let h = Harness::new(vec![ok(500, json!({"error": "boom"}))]);
    let loader = h.loader_on(19);

    let outcome = loader.load().await;
    assert_eq!(outcome.source, BundleSource::Fallback);
    assert_eq!(outcome.failure, Some(FetchFailure::HttpError { status: 500 }));
    assert_eq!(&outcome.bundle, reference_dataset());
    assert_eq!(&h.store.get_data(), reference_dataset());

    let entry = loader.cache().entry().unwrap();
    assert_eq!(entry.date, "2026-10-19");
    assert_eq!(&entry.bundle, reference_dataset());
}

#[tokio::test]
async fn partial_response_is_completed_field_by_field() {
    let h = Harness::new(vec![ok(200, music_only())]);
    let outcome = h.loader_on(19).load().await;

    assert_eq!(outcome.source, BundleSource::Live);
    let reference = reference_dataset();
    let music = outcome.bundle.domain(Domain::Music);
    assert_eq!(music["artist"], "Dean Martin");
    assert_eq!(music["song"], "That's Amore");
    assert_eq!(music["fun_fact"], reference.domain(Domain::Music)["fun_fact"]);
    assert_eq!(
        music["conversation_starters"],
        reference.domain(Domain::Music)["conversation_starters"]
    );
    for domain in [Domain::Recipe, Domain::Photo, Domain::NostalgiaNews] {
        assert_eq!(outcome.bundle.domain(domain), reference.domain(domain));
    }
    assert_eq!(outcome.bundle.patient_info["cultural_heritage"], "Italian-American");
    assert_eq!(outcome.bundle.metadata["theme"], "Family");
    assert!(outcome.bundle.missing_fields(reference).is_empty());

    let music_backfill = outcome
        .backfilled
        .iter()
        .find(|b| b.section == "music")
        .unwrap();
    assert!(music_backfill.fields.contains(&"fun_fact".to_string()));
    assert!(!music_backfill.fields.contains(&"artist".to_string()));
}

#[tokio::test]
async fn same_day_reload_makes_no_request() {
    let h = Harness::new(vec![ok(200, music_only())]);
    let first = h.loader_on(19).load().await;
    let second = h.loader_on(19).load().await;

    assert_eq!(h.transport.calls(), 1);
    assert_eq!(second.source, BundleSource::Cache);
    assert_eq!(second.bundle, first.bundle);
    assert_eq!(h.store.source(), BundleSource::Cache);
}

#[tokio::test]
async fn next_day_refetches() {
    let h = Harness::new(vec![ok(500, json!({})), ok(200, music_only())]);
    assert_eq!(h.loader_on(19).load().await.source, BundleSource::Fallback);

    let next = h.loader_on(20).load().await;
    assert_eq!(h.transport.calls(), 2);
    assert_eq!(next.source, BundleSource::Live);
    assert_eq!(next.bundle.domain(Domain::Music)["artist"], "Dean Martin");
    assert_eq!(h.loader_on(20).cache().entry().unwrap().date, "2026-10-20");
}

#[tokio::test]
async fn refresh_refetches_and_keeps_profile() {
    let h = Harness::new(vec![ok(500, json!({})), ok(200, music_only())]);
    let loader = h.loader_on(19);
    let mut profile = Profile::demo();
    profile.name = Some("Rosa".into());
    loader.profiles().save(&profile).unwrap();

    loader.load().await;
    let refreshed = loader.refresh().await;

    assert_eq!(h.transport.calls(), 2);
    assert_eq!(refreshed.source, BundleSource::Live);
    assert_eq!(loader.profiles().load(), Some(profile.clone()));
    assert_eq!(loader.cache().entry().unwrap().profile_snapshot, profile);
}

#[tokio::test]
async fn network_error_and_bad_shape_fall_back() {
    let cases = [
        (
            Err(TransportError::Timeout),
            "network_error",
        ),
        (ok(200, json!({"success": true})), "invalid_shape"),
        (
            Ok(RawResponse {
                status: 200,
                body: "not json".into(),
            }),
            "invalid_shape",
        ),
    ];
    for (reply, reason) in cases {
        let h = Harness::new(vec![reply]);
        let outcome = h.loader_on(19).load().await;
        assert_eq!(outcome.source, BundleSource::Fallback);
        assert_eq!(outcome.failure.unwrap().reason(), reason);
        assert_eq!(&outcome.bundle, reference_dataset());
    }
}

#[tokio::test]
async fn request_carries_no_identifiers() {
    let h = Harness::new(vec![ok(500, json!({}))]);
    let loader = h.loader_on(19);
    loader.profiles().save(&Profile::demo()).unwrap();
    loader.load().await;

    let body = h.transport.body(0);
    let text = body.to_string();
    for leaked in ["Maria", "Brooklyn", "New York", "1945"] {
        assert!(!text.contains(leaked), "request leaked {leaked}: {text}");
    }
    let profile = body["patient_profile"].as_object().unwrap();
    let mut keys: Vec<&str> = profile.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        ["age_group", "cultural_heritage", "interests", "profile_complete"]
    );
    assert_eq!(profile["age_group"], "oldest_senior");
    assert_eq!(profile["cultural_heritage"], "Italian-American");
    assert!(body["session_id"].as_str().unwrap().starts_with("session_"));
}

#[tokio::test]
async fn recorded_feedback_is_sent() {
    let h = Harness::new(vec![ok(500, json!({}))]);
    let loader = h.loader_on(19);
    loader
        .feedback()
        .record(FeedbackKind::Like, "In the Mood", Category::Music)
        .unwrap();
    loader
        .feedback()
        .record(FeedbackKind::Dislike, "Liver and Onions", Category::Recipe)
        .unwrap();
    loader.load().await;

    assert_eq!(
        h.transport.body(0)["feedback_data"],
        json!({"likes": ["In the Mood"], "dislikes": ["Liver and Onions"]})
    );
}

#[tokio::test]
async fn subscribers_see_each_publish() {
    let h = Harness::new(vec![ok(200, music_only())]);
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    let sub = h.store.subscribe(move |bundle| {
        assert!(bundle.is_some());
        counter.fetch_add(1, Ordering::SeqCst);
    });

    h.loader_on(19).load().await;
    h.loader_on(19).load().await;
    assert_eq!(notified.load(Ordering::SeqCst), 2);

    sub.unsubscribe();
    h.loader_on(19).load().await;
    assert_eq!(notified.load(Ordering::SeqCst), 2);
}
