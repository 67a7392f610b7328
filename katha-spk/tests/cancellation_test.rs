//! Tests for cancellation and supersession of narrations

use async_trait::async_trait;
use katha_spk::{
    Narrator, PlaybackState, SpeakOptions, SpeechError, SpeechHandle, StaticCatalog, TokioTimer,
    TtsEngine, Utterance,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};

/// Engine that holds its first utterance until released; later calls
/// finish instantly
#[derive(Default)]
struct HoldFirstEngine {
    release: Arc<Notify>,
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

#[async_trait]
impl TtsEngine for HoldFirstEngine {
    fn submit(&self, utterance: &Utterance) -> Result<SpeechHandle, SpeechError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().push(utterance.text.clone());
        let release = self.release.clone();
        Ok(SpeechHandle::new(async move {
            if call == 0 {
                release.notified().await;
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
        "hold-first"
    }
}

#[derive(Default)]
struct InstantEngine {
    texts: Mutex<Vec<String>>,
}

#[async_trait]
impl TtsEngine for InstantEngine {
    fn submit(&self, utterance: &Utterance) -> Result<SpeechHandle, SpeechError> {
        self.texts.lock().push(utterance.text.clone());
        Ok(SpeechHandle::new(async { Ok(()) }))
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
        "instant"
    }
}

fn narrator_for(engine: Arc<dyn TtsEngine>) -> Narrator {
    Narrator::new(
        engine,
        Arc::new(StaticCatalog::new(Vec::new())),
        Arc::new(TokioTimer),
    )
    .unwrap()
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

async fn wait_for_end(rx: oneshot::Receiver<()>) {
    tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_cancel_when_idle_is_harmless() {
    let engine = Arc::new(InstantEngine::default());
    let narrator = narrator_for(engine.clone());

    narrator.cancel();
    narrator.cancel();
    assert_eq!(narrator.state(), PlaybackState::Idle);

    let (tx, rx) = oneshot::channel();
    narrator.speak(
        "still works",
        SpeakOptions::default().on_end(move || {
            let _ = tx.send(());
        }),
    );
    wait_for_end(rx).await;
    assert_eq!(*engine.texts.lock(), ["still works"]);
}

#[tokio::test]
async fn test_cancel_stops_active_narration_without_callbacks() {
    let engine = Arc::new(HoldFirstEngine::default());
    let narrator = narrator_for(engine.clone());

    let (tx, rx) = oneshot::channel::<()>();
    let (etx, erx) = oneshot::channel::<String>();
    narrator.speak(
        "to be cancelled",
        SpeakOptions::default()
            .on_end(move || {
                let _ = tx.send(());
            })
            .on_error(move |e| {
                let _ = etx.send(e.to_string());
            }),
    );

    wait_until(|| engine.calls.load(Ordering::SeqCst) == 1).await;
    assert!(narrator.is_speaking());

    narrator.cancel();
    assert_eq!(narrator.state(), PlaybackState::Idle);

    // both callbacks were dropped without firing
    assert!(rx.await.is_err());
    assert!(erx.await.is_err());

    // a late completion of the cancelled utterance must change nothing
    engine.release.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(narrator.state(), PlaybackState::Idle);
}

#[tokio::test]
async fn test_new_speak_supersedes_active() {
    let engine = Arc::new(HoldFirstEngine::default());
    let narrator = narrator_for(engine.clone());

    let (tx_a, rx_a) = oneshot::channel::<()>();
    narrator.speak(
        "first story",
        SpeakOptions::default().on_end(move || {
            let _ = tx_a.send(());
        }),
    );
    wait_until(|| engine.calls.load(Ordering::SeqCst) == 1).await;
    assert!(narrator.is_speaking());

    let (tx_b, rx_b) = oneshot::channel();
    narrator.speak(
        "second story",
        SpeakOptions::default().on_end(move || {
            let _ = tx_b.send(());
        }),
    );

    wait_for_end(rx_b).await;
    assert_eq!(narrator.state(), PlaybackState::Idle);

    // the superseded narration's callback never fires
    assert!(rx_a.await.is_err());

    // the stale drive finishing late must not resurrect any state
    engine.release.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(narrator.state(), PlaybackState::Idle);

    assert_eq!(*engine.texts.lock(), ["first story", "second story"]);
}

#[tokio::test]
async fn test_cancel_during_break() {
    let engine = Arc::new(InstantEngine::default());
    let narrator = narrator_for(engine.clone());

    let (tx, rx) = oneshot::channel::<()>();
    narrator.speak(
        r#"A<break time="60000ms"/>B"#,
        SpeakOptions::default().on_end(move || {
            let _ = tx.send(());
        }),
    );

    wait_until(|| engine.texts.lock().len() == 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    narrator.cancel();
    assert_eq!(narrator.state(), PlaybackState::Idle);
    assert!(rx.await.is_err());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*engine.texts.lock(), ["A"]);
}

#[tokio::test]
async fn test_speak_after_cancelling_held_narration() {
    let engine = Arc::new(HoldFirstEngine::default());
    let narrator = narrator_for(engine.clone());

    let (tx_a, rx_a) = oneshot::channel::<()>();
    narrator.speak(
        "stuck",
        SpeakOptions::default().on_end(move || {
            let _ = tx_a.send(());
        }),
    );
    wait_until(|| engine.calls.load(Ordering::SeqCst) == 1).await;

    narrator.cancel();
    assert!(rx_a.await.is_err());

    let (tx_c, rx_c) = oneshot::channel();
    narrator.speak(
        "fresh start",
        SpeakOptions::default().on_end(move || {
            let _ = tx_c.send(());
        }),
    );
    wait_for_end(rx_c).await;

    engine.release.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(narrator.state(), PlaybackState::Idle);
    assert_eq!(*engine.texts.lock(), ["stuck", "fresh start"]);
}
