//! Narrate a short story through whatever engine is available

use katha_spk::{
    CustomEngine, Narrator, SpeakOptions, SpeechConfig, StaticCatalog, TokioTimer, Voice,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let narrator = match Narrator::from_config(SpeechConfig::default()) {
        Ok(narrator) => narrator,
        Err(e) => {
            eprintln!("espeak-ng unavailable ({}), falling back to a printing engine", e);
            printing_narrator()?
        }
    };

    let story = r#"
        <prosody rate="slow" pitch="low">Long ago, in a village by the sea,</prosody>
        <break time="500ms"/>
        there lived a storyteller. <emphasis level="strong">Every evening</emphasis>
        the square would fill with listeners.
        <break strength="strong"/>
        <lang xml:lang="hi-IN">और कहानी शुरू हुई।</lang>
    "#;

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let options = SpeakOptions::storytelling().on_end(move || {
        let _ = done_tx.send(());
    });

    println!("Narrating...");
    narrator.speak(story, options);
    done_rx.await?;
    println!("Done.");

    Ok(())
}

/// Engine that prints utterances instead of playing them, so the example
/// still demonstrates segmentation on machines without espeak-ng
fn printing_narrator() -> anyhow::Result<Narrator> {
    let engine = CustomEngine::new("print", |utterance| {
        Box::pin(async move {
            println!(
                "[{} rate={:.2} pitch={:.2} volume={:.2}] {}",
                utterance
                    .voice
                    .as_ref()
                    .map(|v| v.name.as_str())
                    .unwrap_or("default"),
                utterance.rate,
                utterance.pitch,
                utterance.volume,
                utterance.text
            );
            Ok(())
        })
    });

    let catalog = StaticCatalog::new(vec![
        Voice {
            name: "Google Lekha".to_string(),
            language: "en-IN".to_string(),
        },
        Voice {
            name: "Google हिन्दी".to_string(),
            language: "hi-IN".to_string(),
        },
    ]);

    Ok(Narrator::new(
        Arc::new(engine),
        Arc::new(catalog),
        Arc::new(TokioTimer),
    )?)
}
