//! Narration facade with playback state and queue management

use crate::catalog::{resolve_voice, VoiceCatalog};
use crate::config::{EngineKind, SpeechConfig};
use crate::engines::espeak::EspeakEngine;
use crate::engines::null::NullEngine;
use crate::engines::{TtsEngine, Utterance};
use crate::error::SpeechError;
use crate::options::{EndCallback, ErrorCallback, SpeakOptions};
use crate::timer::{Timer, TokioTimer};
use katha_markup::{MarkupParser, Prosody, Segment};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// Where the narrator currently is in its playback lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Speaking,
    Paused,
}

#[derive(Default)]
struct Callbacks {
    on_end: Option<EndCallback>,
    on_error: Option<ErrorCallback>,
}

struct Shared {
    state: Mutex<PlaybackState>,
    generation: AtomicU64,
    in_break: AtomicBool,
    callbacks: Mutex<Callbacks>,
    // Orders generation changes against utterance submissions: a
    // narration superseded before this lock is taken can never submit
    // afterwards. Never held across an await.
    submission: Mutex<()>,
}

/// Compiles text to segments and plays them through an engine, one
/// narration at a time.
///
/// A new speak call supersedes whatever is still playing. Superseded
/// narrations never fire their callbacks; the active narration fires
/// on_end or on_error exactly once.
pub struct Narrator {
    engine: Arc<dyn TtsEngine>,
    catalog: Arc<dyn VoiceCatalog>,
    timer: Arc<dyn Timer>,
    parser: MarkupParser,
    config: SpeechConfig,
    runtime: Handle,
    shared: Arc<Shared>,
}

impl Narrator {
    /// Create a narrator from explicit parts. Must be called within a
    /// tokio runtime context.
    pub fn new(
        engine: Arc<dyn TtsEngine>,
        catalog: Arc<dyn VoiceCatalog>,
        timer: Arc<dyn Timer>,
    ) -> Result<Self, SpeechError> {
        let runtime = Handle::try_current().map_err(|_| {
            SpeechError::Engine(
                "No tokio runtime available. The narrator must be created within a tokio runtime context.".to_string(),
            )
        })?;

        Ok(Self {
            engine,
            catalog,
            timer,
            parser: MarkupParser::new(),
            config: SpeechConfig::default(),
            runtime,
            shared: Arc::new(Shared {
                state: Mutex::new(PlaybackState::Idle),
                generation: AtomicU64::new(0),
                in_break: AtomicBool::new(false),
                callbacks: Mutex::new(Callbacks::default()),
                submission: Mutex::new(()),
            }),
        })
    }

    /// Create a narrator from an engine that also enumerates its voices
    pub fn with_engine<E>(engine: Arc<E>) -> Result<Self, SpeechError>
    where
        E: TtsEngine + VoiceCatalog + 'static,
    {
        let catalog: Arc<dyn VoiceCatalog> = engine.clone();
        Self::new(engine, catalog, Arc::new(TokioTimer))
    }

    /// Create a narrator from configuration
    pub fn from_config(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        let narrator = match config.engine {
            EngineKind::Espeak => {
                let engine = EspeakEngine::new()?;
                if !engine.is_available() {
                    return Err(SpeechError::Engine("espeak-ng not available".to_string()));
                }
                Self::with_engine(Arc::new(engine))?
            }
            EngineKind::Null => Self::with_engine(Arc::new(NullEngine::new()))?,
        };

        Ok(Self { config, ..narrator })
    }

    /// Narrate text, superseding any narration still in flight.
    ///
    /// Markup input derives prosody from its tags; plain input takes the
    /// rate, pitch and volume from the options. Returns immediately and
    /// plays in the background.
    pub fn speak(&self, text: &str, mut options: SpeakOptions) {
        self.supersede();

        if !self.engine.is_available() {
            warn!("Speech engine {} is not available, dropping narration", self.engine.name());
            return;
        }

        if let Err(reason) = options.validate() {
            warn!("Invalid speak options: {}", reason);
            if let Some(on_error) = options.on_error.take() {
                on_error(SpeechError::Config(reason));
            }
            return;
        }

        let segments = if options.markup && text.contains('<') {
            self.parser.parse(text, &Prosody::default())
        } else {
            let base = Prosody {
                rate: options.rate,
                pitch: options.pitch,
                volume: options.volume,
                language: None,
            };
            self.parser.parse_plain(text, &base)
        };

        if segments.is_empty() {
            debug!("Nothing to narrate after cleanup");
            if let Some(on_end) = options.on_end.take() {
                on_end();
            }
            return;
        }

        // Stamp and callbacks move together: whichever concurrent speak
        // takes the newest generation also owns the stored callbacks.
        let generation = {
            let _submission = self.shared.submission.lock();
            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let mut callbacks = self.shared.callbacks.lock();
            callbacks.on_end = options.on_end.take();
            callbacks.on_error = options.on_error.take();
            generation
        };
        *self.shared.state.lock() = PlaybackState::Speaking;

        info!("Narrating {} segments via {}", segments.len(), self.engine.name());

        let request = Request {
            engine: self.engine.clone(),
            catalog: self.catalog.clone(),
            timer: self.timer.clone(),
            shared: self.shared.clone(),
            generation,
            language: options.language,
            preferences: options.voice_preferences,
        };
        self.runtime.spawn(async move {
            request.drive(VecDeque::from(segments)).await;
        });
    }

    /// Suspend the current narration. Ignored while idle or while a
    /// break segment is elapsing.
    pub fn pause(&self) {
        {
            let mut state = self.shared.state.lock();
            if *state != PlaybackState::Speaking || self.shared.in_break.load(Ordering::SeqCst) {
                return;
            }
            *state = PlaybackState::Paused;
        }

        let engine = self.engine.clone();
        self.runtime.spawn(async move {
            if let Err(e) = engine.pause().await {
                warn!("Engine pause failed: {}", e);
            }
        });
    }

    /// Continue a paused narration. Ignored in any other state.
    pub fn resume(&self) {
        {
            let mut state = self.shared.state.lock();
            if *state != PlaybackState::Paused {
                return;
            }
            *state = PlaybackState::Speaking;
        }

        let engine = self.engine.clone();
        self.runtime.spawn(async move {
            if let Err(e) = engine.resume().await {
                warn!("Engine resume failed: {}", e);
            }
        });
    }

    /// Stop the current narration and drop its callbacks. Idempotent.
    pub fn cancel(&self) {
        let generation = self.supersede();

        let engine = self.engine.clone();
        let shared = self.shared.clone();
        self.runtime.spawn(async move {
            // A speak that arrived meanwhile stops the engine at the
            // head of its own drive; killing here could hit its child.
            if shared.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            if let Err(e) = engine.cancel().await {
                warn!("Engine cancel failed: {}", e);
            }
        });
    }

    /// Invalidate the narration in flight: bump the generation, drop its
    /// callbacks and return to idle. Returns the new generation. The
    /// engine itself is stopped by the caller, either directly or at the
    /// head of the next drive.
    fn supersede(&self) -> u64 {
        let generation = {
            let _submission = self.shared.submission.lock();
            self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        self.shared.in_break.store(false, Ordering::SeqCst);
        {
            let mut callbacks = self.shared.callbacks.lock();
            callbacks.on_end = None;
            callbacks.on_error = None;
        }

        let previous = {
            let mut state = self.shared.state.lock();
            std::mem::replace(&mut *state, PlaybackState::Idle)
        };
        if previous != PlaybackState::Idle {
            debug!("Cancelled narration in state {:?}", previous);
        }
        generation
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        *self.shared.state.lock()
    }

    pub fn is_speaking(&self) -> bool {
        self.state() == PlaybackState::Speaking
    }

    /// Whether the underlying engine can actually produce speech
    pub fn is_supported(&self) -> bool {
        self.engine.is_available()
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }
}

/// One narration in flight. The generation stamp makes a superseded
/// request fall silent: after every await it rechecks, and a stale
/// request returns without touching state or callbacks.
struct Request {
    engine: Arc<dyn TtsEngine>,
    catalog: Arc<dyn VoiceCatalog>,
    timer: Arc<dyn Timer>,
    shared: Arc<Shared>,
    generation: u64,
    language: String,
    preferences: Vec<String>,
}

impl Request {
    async fn drive(self, mut segments: VecDeque<Segment>) {
        // Leftover engine activity must stop before the first utterance.
        // This also clears an engine-level pause left by a superseded
        // narration.
        if let Err(e) = self.engine.cancel().await {
            warn!("Engine cancel failed: {}", e);
        }

        while let Some(segment) = segments.pop_front() {
            if self.stale() {
                return;
            }

            match segment {
                Segment::Break { duration_ms } => {
                    self.shared.in_break.store(true, Ordering::SeqCst);
                    self.timer.sleep(Duration::from_millis(duration_ms)).await;
                    if self.stale() {
                        // cancel already reset the flag for whoever is next
                        return;
                    }
                    self.shared.in_break.store(false, Ordering::SeqCst);
                }
                Segment::Text { text, prosody } => {
                    let voices = match self.catalog.list().await {
                        Ok(voices) => voices,
                        Err(e) => {
                            debug!("Voice listing failed: {}", e);
                            Vec::new()
                        }
                    };
                    if self.stale() {
                        return;
                    }

                    let language = prosody.language.as_deref().unwrap_or(&self.language);
                    let voice = resolve_voice(language, &self.preferences, &voices).cloned();
                    let utterance = Utterance {
                        text,
                        voice,
                        rate: prosody.rate,
                        pitch: prosody.pitch,
                        volume: prosody.volume,
                    };

                    // The stale check and the submission are one
                    // critical section; supersession bumps the
                    // generation under the same lock. A narration
                    // superseded at this point never reaches the engine.
                    let submitted = {
                        let _submission = self.shared.submission.lock();
                        if self.stale() {
                            return;
                        }
                        self.engine.submit(&utterance)
                    };

                    let result = match submitted {
                        Ok(handle) => handle.wait().await,
                        Err(e) => Err(e),
                    };
                    if self.stale() {
                        return;
                    }

                    if let Err(e) = result {
                        error!("Narration failed: {}", e);
                        *self.shared.state.lock() = PlaybackState::Idle;
                        let on_error = {
                            let mut callbacks = self.shared.callbacks.lock();
                            callbacks.on_end = None;
                            callbacks.on_error.take()
                        };
                        if let Some(on_error) = on_error {
                            on_error(e);
                        }
                        return;
                    }
                }
            }
        }

        if self.stale() {
            return;
        }
        *self.shared.state.lock() = PlaybackState::Idle;
        let on_end = {
            let mut callbacks = self.shared.callbacks.lock();
            callbacks.on_error = None;
            callbacks.on_end.take()
        };
        if let Some(on_end) = on_end {
            on_end();
        }
    }

    fn stale(&self) -> bool {
        self.shared.generation.load(Ordering::SeqCst) != self.generation
    }
}
