//! Integration tests for the conversation dispatcher.
//!
//! Each test wires the real dispatcher to an in-memory store, a scripted
//! classifier, and a recording channel, then drives inbound events through
//! the same `handle_event` path the run loop uses.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use nutribot::channels::{Channel, ChannelManager, IncomingMessage, MessageStream, Presence};
use nutribot::classifier::{Detection, FoodClassifier, ProfileSnapshot};
use nutribot::dispatcher::Dispatcher;
use nutribot::error::{ChannelError, ClassifierError, StoreError};
use nutribot::profile::{ActivityLevel, Gender, Goal, OnboardingPhase, Profile};
use nutribot::store::{Database, MemoryStore, ProfileStore};

const USER: &str = "628123";
const NAME: &str = "Ayu";

// ── Stub collaborators ──────────────────────────────────────────────

/// One scripted classifier turn.
enum Scripted {
    Detect(i32, &'static str),
    Fail,
}

/// Classifier that replays a script and counts calls.
struct StubClassifier {
    script: std::sync::Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
}

impl StubClassifier {
    fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: std::sync::Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FoodClassifier for StubClassifier {
    async fn classify(
        &self,
        _display_name: &str,
        _text: &str,
        _snapshot: &ProfileSnapshot,
    ) -> Result<Detection, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Detect(calories, reply)) => Ok(Detection {
                calories_detected: calories,
                response_message: reply.to_string(),
            }),
            Some(Scripted::Fail) | None => {
                Err(ClassifierError::InvalidResponse("scripted failure".into()))
            }
        }
    }
}

/// Channel that records every outbound call.
#[derive(Clone, Default)]
struct RecordingChannel {
    sent: Arc<std::sync::Mutex<Vec<String>>>,
    presences: Arc<std::sync::Mutex<Vec<Presence>>>,
    reads: Arc<AtomicUsize>,
}

impl RecordingChannel {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    fn presences(&self) -> Vec<Presence> {
        self.presences.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "test"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        Ok(Box::pin(futures::stream::empty()))
    }

    async fn send_text(&self, _msg: &IncomingMessage, text: &str) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn set_presence(
        &self,
        _msg: &IncomingMessage,
        presence: Presence,
    ) -> Result<(), ChannelError> {
        self.presences.lock().unwrap().push(presence);
        Ok(())
    }

    async fn mark_read(&self, _msg: &IncomingMessage) -> Result<(), ChannelError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// Store whose saves can be switched to fail, for dropped-turn tests.
struct FlakyStore {
    inner: MemoryStore,
    fail_saves: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_saves: AtomicBool::new(false),
        }
    }

    fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileStore for FlakyStore {
    async fn load(&self) -> Result<Database, StoreError> {
        self.inner.load().await
    }

    async fn save(&self, db: &Database) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save(db).await
    }
}

// ── Harness ─────────────────────────────────────────────────────────

fn build(
    store: Arc<dyn ProfileStore>,
    classifier: Arc<StubClassifier>,
) -> (Arc<Dispatcher>, RecordingChannel) {
    let channel = RecordingChannel::default();
    let mut channels = ChannelManager::new();
    channels.add(Box::new(channel.clone()));
    let dispatcher = Arc::new(Dispatcher::new(store, classifier, Arc::new(channels)));
    (dispatcher, channel)
}

fn inbound(text: &str) -> IncomingMessage {
    IncomingMessage::new("test", USER, USER, NAME, text)
}

/// A profile already through the interview, parked at the ledger phase.
fn onboarded() -> Profile {
    let mut profile = Profile::seed(USER, NAME, Utc::now());
    profile.phase = OnboardingPhase::Done;
    profile.weight_kg = Some(65.0);
    profile.height_cm = Some(170.0);
    profile.age_years = Some(25);
    profile.gender = Some(Gender::Male);
    profile.activity = Some(ActivityLevel::Moderate);
    profile.goal = Some(Goal::Lose);
    profile.daily_calorie_target = Some(1968);
    profile
}

async fn seed(store: &dyn ProfileStore, profile: Profile) {
    let id = profile.id.clone();
    let (_, created) = store.get_or_create(&id, profile).await.unwrap();
    assert!(created);
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn first_event_sends_one_combined_welcome_and_skips_classifier() {
    let store = Arc::new(MemoryStore::new());
    let classifier = StubClassifier::new(vec![]);
    let (dispatcher, channel) = build(store.clone(), classifier.clone());

    dispatcher.handle_event(&inbound("hello")).await;

    let sent = channel.sent();
    assert_eq!(sent.len(), 1, "exactly one combined message");
    assert!(sent[0].contains("weight in kg"), "welcome carries question");
    assert_eq!(classifier.calls(), 0);

    let db = store.load().await.unwrap();
    assert_eq!(db.users.get(USER).unwrap().phase, OnboardingPhase::AskWeight);
}

#[tokio::test]
async fn interview_walks_to_done_through_the_dispatcher() {
    let store = Arc::new(MemoryStore::new());
    let classifier = StubClassifier::new(vec![]);
    let (dispatcher, channel) = build(store.clone(), classifier.clone());

    dispatcher.handle_event(&inbound("hi")).await; // welcome turn
    for answer in ["65", "170", "25", "m", "moderate", "lose"] {
        dispatcher.handle_event(&inbound(answer)).await;
    }

    let db = store.load().await.unwrap();
    let profile = db.users.get(USER).unwrap();
    assert_eq!(profile.phase, OnboardingPhase::Done);
    assert_eq!(profile.daily_calorie_target, Some(1968));
    assert_eq!(classifier.calls(), 0, "interview never touches the classifier");

    let sent = channel.sent();
    assert_eq!(sent.len(), 7);
    assert!(sent[6].contains("1968"), "summary carries the target");
}

#[tokio::test]
async fn invalid_answer_reasks_without_advancing() {
    let store = Arc::new(MemoryStore::new());
    let classifier = StubClassifier::new(vec![]);
    let (dispatcher, channel) = build(store.clone(), classifier);

    dispatcher.handle_event(&inbound("hi")).await;
    dispatcher.handle_event(&inbound("not a number")).await;

    let db = store.load().await.unwrap();
    assert_eq!(db.users.get(USER).unwrap().phase, OnboardingPhase::AskWeight);
    let sent = channel.sent();
    assert!(sent[1].contains("weight in kg"), "same question re-asked");
}

#[tokio::test]
async fn ledger_turns_accumulate_and_reply_verbatim() {
    let store = Arc::new(MemoryStore::new());
    seed(store.as_ref(), onboarded()).await;
    let classifier = StubClassifier::new(vec![
        Scripted::Detect(300, "300 kcal, nice! 🍜"),
        Scripted::Detect(450, "450 more."),
        Scripted::Detect(120, "a snack."),
    ]);
    let (dispatcher, channel) = build(store.clone(), classifier.clone());

    for text in ["nasi goreng", "ayam bakar", "pisang"] {
        dispatcher.handle_event(&inbound(text)).await;
    }

    let db = store.load().await.unwrap();
    assert_eq!(db.users.get(USER).unwrap().calories_consumed_today, 870);
    assert_eq!(classifier.calls(), 3);
    assert_eq!(
        channel.sent(),
        vec!["300 kcal, nice! 🍜", "450 more.", "a snack."]
    );
}

#[tokio::test]
async fn non_food_detection_replies_without_mutation() {
    let store = Arc::new(MemoryStore::new());
    seed(store.as_ref(), onboarded()).await;
    let classifier = StubClassifier::new(vec![Scripted::Detect(0, "that's not food 😄")]);
    let (dispatcher, channel) = build(store.clone(), classifier);

    let before = store.load().await.unwrap().users.get(USER).unwrap().last_active_at;
    dispatcher.handle_event(&inbound("how are you?")).await;

    let db = store.load().await.unwrap();
    let profile = db.users.get(USER).unwrap();
    assert_eq!(profile.calories_consumed_today, 0);
    assert_eq!(profile.last_active_at, before);
    assert_eq!(channel.sent(), vec!["that's not food 😄"]);
}

#[tokio::test]
async fn classifier_failure_drops_the_turn_silently() {
    let store = Arc::new(MemoryStore::new());
    seed(store.as_ref(), onboarded()).await;
    let classifier = StubClassifier::new(vec![Scripted::Fail, Scripted::Detect(300, "ok")]);
    let (dispatcher, channel) = build(store.clone(), classifier);

    dispatcher.handle_event(&inbound("mystery meal")).await;
    assert!(channel.sent().is_empty(), "no reply on classifier failure");
    assert_eq!(
        store.load().await.unwrap().users.get(USER).unwrap().calories_consumed_today,
        0
    );

    // The next turn proceeds normally.
    dispatcher.handle_event(&inbound("nasi goreng")).await;
    assert_eq!(channel.sent(), vec!["ok"]);
}

#[tokio::test]
async fn persistence_failure_drops_the_turn_without_a_reply() {
    let store = Arc::new(FlakyStore::new());
    seed(&*store, onboarded()).await;
    let classifier = StubClassifier::new(vec![
        Scripted::Detect(300, "should never be sent"),
        Scripted::Detect(450, "recovered"),
    ]);
    let (dispatcher, channel) = build(store.clone(), classifier);

    store.fail_saves(true);
    dispatcher.handle_event(&inbound("nasi goreng")).await;
    assert!(channel.sent().is_empty(), "no partial reply on failed save");

    // Process keeps going; the next turn reloads the last good state.
    store.fail_saves(false);
    dispatcher.handle_event(&inbound("ayam bakar")).await;
    assert_eq!(channel.sent(), vec!["recovered"]);
    assert_eq!(
        store.load().await.unwrap().users.get(USER).unwrap().calories_consumed_today,
        450
    );
}

#[tokio::test]
async fn presence_composing_precedes_the_classifier_reply() {
    let store = Arc::new(MemoryStore::new());
    seed(store.as_ref(), onboarded()).await;
    let classifier = StubClassifier::new(vec![Scripted::Detect(300, "ok")]);
    let (dispatcher, channel) = build(store.clone(), classifier);

    dispatcher.handle_event(&inbound("nasi goreng")).await;
    assert_eq!(
        channel.presences(),
        vec![Presence::Composing, Presence::Paused]
    );
}

#[tokio::test]
async fn concurrent_same_user_turns_never_lose_an_increment() {
    let store = Arc::new(MemoryStore::new());
    seed(store.as_ref(), onboarded()).await;
    let classifier = StubClassifier::new(vec![
        Scripted::Detect(300, "a"),
        Scripted::Detect(450, "b"),
    ]);
    let (dispatcher, channel) = build(store.clone(), classifier);

    let d1 = dispatcher.clone();
    let d2 = dispatcher.clone();
    let t1 = tokio::spawn(async move { d1.handle_event(&inbound("nasi goreng")).await });
    let t2 = tokio::spawn(async move { d2.handle_event(&inbound("ayam bakar")).await });
    t1.await.unwrap();
    t2.await.unwrap();

    let db = store.load().await.unwrap();
    assert_eq!(
        db.users.get(USER).unwrap().calories_consumed_today,
        750,
        "both increments must survive the race"
    );
    assert_eq!(channel.sent().len(), 2);
}
