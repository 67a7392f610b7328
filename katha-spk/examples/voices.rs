//! List the voices espeak-ng has installed

use katha_spk::{EspeakEngine, TtsEngine, VoiceCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let engine = EspeakEngine::new()?;
    if !engine.is_available() {
        println!("espeak-ng is not installed, no voices to list");
        return Ok(());
    }

    let voices = engine.list().await?;
    println!("{} voices installed:", voices.len());
    for voice in voices {
        println!("  {:16} {}", voice.language, voice.name);
    }

    Ok(())
}
