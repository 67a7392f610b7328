//! Failure paths through the full narration pipeline

use async_trait::async_trait;
use katha_spk::{
    Narrator, PlaybackState, SpeakOptions, SpeechError, SpeechHandle, StaticCatalog, TokioTimer,
    TtsEngine, Utterance, Voice, VoiceCatalog,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Engine that fails on one chosen call and succeeds on every other
struct FlakyEngine {
    fail_at: usize,
    calls: AtomicUsize,
    utterances: Mutex<Vec<Utterance>>,
}

impl FlakyEngine {
    fn new(fail_at: usize) -> Self {
        Self {
            fail_at,
            calls: AtomicUsize::new(0),
            utterances: Mutex::new(Vec::new()),
        }
    }

    fn reliable() -> Self {
        Self::new(usize::MAX)
    }

    fn texts(&self) -> Vec<String> {
        self.utterances.lock().iter().map(|u| u.text.clone()).collect()
    }
}

#[async_trait]
impl TtsEngine for FlakyEngine {
    fn submit(&self, utterance: &Utterance) -> Result<SpeechHandle, SpeechError> {
        self.utterances.lock().push(utterance.clone());
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let fails = call == self.fail_at;
        Ok(SpeechHandle::new(async move {
            if fails {
                return Err(SpeechError::Synthesis("device lost".to_string()));
            }
            Ok(())
        }))
    }

    async fn pause(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    async fn resume(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    async fn cancel(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

/// Catalog whose voice listing always fails
struct FailingCatalog;

#[async_trait]
impl VoiceCatalog for FailingCatalog {
    async fn list(&self) -> Result<Vec<Voice>, SpeechError> {
        Err(SpeechError::Engine("voice daemon unreachable".to_string()))
    }
}

fn narrator_with(engine: Arc<FlakyEngine>, catalog: Arc<dyn VoiceCatalog>) -> Narrator {
    Narrator::new(engine, catalog, Arc::new(TokioTimer)).unwrap()
}

async fn wait_until(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Condition not reached in time");
}

#[tokio::test]
async fn test_error_mid_story_stops_at_failure() {
    let engine = Arc::new(FlakyEngine::new(1));
    let narrator = narrator_with(engine.clone(), Arc::new(StaticCatalog::new(Vec::new())));

    let (tx, rx) = tokio::sync::oneshot::channel::<String>();
    let ended = Arc::new(AtomicBool::new(false));
    let ended_flag = ended.clone();

    narrator.speak(
        r#"A<break time="50ms"/>B<break time="50ms"/>C"#,
        SpeakOptions::default()
            .on_end(move || ended_flag.store(true, Ordering::SeqCst))
            .on_error(move |e| {
                let _ = tx.send(format!("{}", e));
            }),
    );

    let message = tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("error callback should fire")
        .unwrap();
    assert_eq!(message, "Synthesis error: device lost");

    // the queue stops at the failure, the trailing segment is never spoken
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(engine.texts(), vec!["A", "B"]);
    assert!(!ended.load(Ordering::SeqCst));
    assert_eq!(narrator.state(), PlaybackState::Idle);
}

#[tokio::test]
async fn test_catalog_failure_falls_back_to_no_voice() {
    let engine = Arc::new(FlakyEngine::reliable());
    let narrator = narrator_with(engine.clone(), Arc::new(FailingCatalog));

    let (tx, rx) = tokio::sync::oneshot::channel();
    narrator.speak(
        "hello world",
        SpeakOptions::default().on_end(move || {
            let _ = tx.send(());
        }),
    );

    tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("narration should complete without a catalog")
        .unwrap();

    let utterances = engine.utterances.lock();
    assert_eq!(utterances.len(), 1);
    assert!(utterances[0].voice.is_none());
    drop(utterances);

    assert_eq!(narrator.state(), PlaybackState::Idle);
}

#[tokio::test]
async fn test_narrator_recovers_after_engine_error() {
    let engine = Arc::new(FlakyEngine::new(0));
    let narrator = narrator_with(engine.clone(), Arc::new(StaticCatalog::new(Vec::new())));

    let (etx, erx) = tokio::sync::oneshot::channel();
    narrator.speak(
        "first",
        SpeakOptions::default().on_error(move |e| {
            let _ = etx.send(format!("{}", e));
        }),
    );
    tokio::time::timeout(Duration::from_secs(2), erx)
        .await
        .expect("first narration should fail")
        .unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel();
    narrator.speak(
        "second",
        SpeakOptions::default().on_end(move || {
            let _ = tx.send(());
        }),
    );
    tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("second narration should complete")
        .unwrap();

    assert_eq!(engine.texts(), vec!["first", "second"]);
    assert_eq!(narrator.state(), PlaybackState::Idle);
}

#[tokio::test]
async fn test_break_only_narration_completes() {
    let engine = Arc::new(FlakyEngine::reliable());
    let narrator = narrator_with(engine.clone(), Arc::new(StaticCatalog::new(Vec::new())));

    let started = Instant::now();
    let (tx, rx) = tokio::sync::oneshot::channel();
    narrator.speak(
        r#"<break time="80ms"/>"#,
        SpeakOptions::default().on_end(move || {
            let _ = tx.send(());
        }),
    );

    tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("break only narration should complete")
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(80));
    assert!(engine.texts().is_empty());
    assert_eq!(narrator.state(), PlaybackState::Idle);
}

#[tokio::test]
async fn test_state_settles_after_error() {
    let engine = Arc::new(FlakyEngine::new(0));
    let narrator = narrator_with(engine.clone(), Arc::new(StaticCatalog::new(Vec::new())));

    narrator.speak("doomed", SpeakOptions::default());
    wait_until(|| narrator.state() == PlaybackState::Idle).await;

    // pause and resume on the settled narrator stay no-ops
    narrator.pause();
    narrator.resume();
    assert_eq!(narrator.state(), PlaybackState::Idle);
    assert!(!narrator.is_speaking());
}
