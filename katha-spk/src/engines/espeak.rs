//! espeak-ng engine driven as a child process

use crate::engines::{SpeechHandle, TtsEngine, Utterance};
use crate::error::SpeechError;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Engine that plays each utterance through an espeak-ng child process.
///
/// Submitting spawns the child and records its pid; the handle resolves
/// when the process exits, which is when the utterance has finished
/// playing. Pause and resume are job control signals on the running
/// child; a pause taken between utterances also holds the next one by
/// stopping its process right after spawn.
pub struct EspeakEngine {
    available: bool,
    child_pid: Arc<AtomicI32>,
    paused: AtomicBool,
}

impl EspeakEngine {
    pub fn new() -> Result<Self, SpeechError> {
        // Check if espeak-ng is installed
        let available = std::process::Command::new("espeak-ng")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);

        if !available {
            warn!("espeak-ng not found on PATH, engine will be unavailable");
        }

        Ok(Self {
            available,
            child_pid: Arc::new(AtomicI32::new(0)),
            paused: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl TtsEngine for EspeakEngine {
    fn submit(&self, utterance: &Utterance) -> Result<SpeechHandle, SpeechError> {
        if !self.available {
            return Err(SpeechError::Engine("espeak-ng not available".to_string()));
        }

        let text = sanitize(&utterance.text);
        if text.is_empty() {
            return Ok(SpeechHandle::new(async { Ok(()) }));
        }

        let mut child = tokio::process::Command::new("espeak-ng")
            .args(build_args(utterance, &text))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SpeechError::Engine(format!("Failed to run espeak-ng: {}", e)))?;

        let pid = child.id().map(|id| id as i32).unwrap_or(0);
        self.child_pid.store(pid, Ordering::SeqCst);

        // A pause taken before this utterance started must hold it too
        if self.paused.load(Ordering::SeqCst) && pid != 0 {
            if let Err(e) = sys::stop(pid) {
                warn!("Failed to hold new utterance while paused: {}", e);
            }
        }

        let slot = Arc::clone(&self.child_pid);
        Ok(SpeechHandle::new(async move {
            let status = child.wait().await;
            // Clear only our own pid. A successor may have stored its
            // child in the slot while this one was being killed off.
            let _ = slot.compare_exchange(pid, 0, Ordering::SeqCst, Ordering::SeqCst);

            match status {
                Ok(status) if status.success() => Ok(()),
                Ok(status) => Err(SpeechError::Synthesis(format!(
                    "espeak-ng exited with {}",
                    status
                ))),
                Err(e) => Err(SpeechError::Io(e)),
            }
        }))
    }

    async fn pause(&self) -> Result<(), SpeechError> {
        self.paused.store(true, Ordering::SeqCst);
        let pid = self.child_pid.load(Ordering::SeqCst);
        if pid != 0 {
            sys::stop(pid)?;
        }
        Ok(())
    }

    async fn resume(&self) -> Result<(), SpeechError> {
        self.paused.store(false, Ordering::SeqCst);
        let pid = self.child_pid.load(Ordering::SeqCst);
        if pid != 0 {
            sys::cont(pid)?;
        }
        Ok(())
    }

    async fn cancel(&self) -> Result<(), SpeechError> {
        self.paused.store(false, Ordering::SeqCst);
        let pid = self.child_pid.swap(0, Ordering::SeqCst);
        if pid != 0 {
            // SIGKILL also takes down a stopped child
            sys::kill_hard(pid);
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        "espeak-ng"
    }
}

#[async_trait]
impl crate::catalog::VoiceCatalog for EspeakEngine {
    async fn list(&self) -> Result<Vec<crate::catalog::Voice>, SpeechError> {
        if !self.available {
            return Ok(Vec::new());
        }

        let output = tokio::process::Command::new("espeak-ng")
            .arg("--voices")
            .output()
            .await
            .map_err(|e| SpeechError::Engine(format!("Failed to list voices: {}", e)))?;

        if !output.status.success() {
            return Ok(Vec::new());
        }

        // Columns are: Pty Language Age/Gender VoiceName File ...
        let voices = String::from_utf8_lossy(&output.stdout)
            .lines()
            .skip(1) // Skip header
            .filter_map(|line| {
                let mut columns = line.split_whitespace();
                let language = columns.nth(1)?.to_string();
                let name = columns.nth(1)?.to_string();
                Some(crate::catalog::Voice { name, language })
            })
            .take(1000)
            .collect();

        Ok(voices)
    }
}

/// Map an utterance onto espeak-ng flags. Rate 1.0 is 160 words per
/// minute, volume maps to amplitude 0-200, pitch 1.0 sits at espeak's
/// midpoint of 50.
fn build_args(utterance: &Utterance, text: &str) -> Vec<String> {
    let speed = ((160.0 * utterance.rate).round() as i64).clamp(80, 450);
    let amplitude = ((200.0 * utterance.volume).round() as i64).clamp(0, 200);
    let pitch = ((50.0 * utterance.pitch).round() as i64).clamp(0, 99);

    let mut args = vec![
        "-s".to_string(),
        speed.to_string(),
        "-a".to_string(),
        amplitude.to_string(),
        "-p".to_string(),
        pitch.to_string(),
    ];

    if let Some(voice) = &utterance.voice {
        args.push("-v".to_string());
        args.push(voice.language.clone());
    }

    args.push(text.to_string());
    args
}

fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).take(100_000).collect()
}

#[cfg(unix)]
mod sys {
    use crate::error::SpeechError;

    pub fn stop(pid: i32) -> Result<(), SpeechError> {
        signal(pid, libc::SIGSTOP)
    }

    pub fn cont(pid: i32) -> Result<(), SpeechError> {
        signal(pid, libc::SIGCONT)
    }

    pub fn kill_hard(pid: i32) {
        let _ = signal(pid, libc::SIGKILL);
    }

    fn signal(pid: i32, signal: libc::c_int) -> Result<(), SpeechError> {
        // SAFETY: kill only inspects its integer arguments
        let rc = unsafe { libc::kill(pid as libc::pid_t, signal) };
        if rc == 0 {
            Ok(())
        } else {
            Err(SpeechError::Io(std::io::Error::last_os_error()))
        }
    }
}

#[cfg(not(unix))]
mod sys {
    use crate::error::SpeechError;

    pub fn stop(_pid: i32) -> Result<(), SpeechError> {
        Err(SpeechError::Engine(
            "process signals are not supported on this platform".to_string(),
        ))
    }

    pub fn cont(_pid: i32) -> Result<(), SpeechError> {
        Err(SpeechError::Engine(
            "process signals are not supported on this platform".to_string(),
        ))
    }

    pub fn kill_hard(_pid: i32) {}
}
