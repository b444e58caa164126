//! # Poster Editor
//!
//! Command-line poster composer.

use anyhow::Context;
use clap::Parser;
use poster_core::{Intent, TextStyle};
use poster_editor::{CliArgs, Editor, EditorConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,poster_editor=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = EditorConfig::from(args);

    tracing::info!(
        "Starting poster editor v{} ({}x{} canvas)",
        env!("CARGO_PKG_VERSION"),
        config.width,
        config.height
    );

    let mut editor = Editor::from_config(&config)
        .await
        .context("Failed to start editing session")?;

    for intent in startup_intents(&config).await? {
        if let Err(e) = editor.dispatch(intent) {
            tracing::warn!("Intent rejected: {e}");
        }
    }

    let completions = editor.settle().await;
    let failed = completions.iter().filter(|c| c.is_err()).count();
    if failed > 0 {
        tracing::warn!("{failed} startup step(s) failed and were skipped");
    }

    let path = editor
        .export_to_dir(&config.output_dir, config.format)
        .await
        .context("Export failed")?;
    tracing::info!("Poster exported to {}", path.display());

    if config.print_summary {
        println!("{}", editor.summary().to_json()?);
    }

    editor.shutdown();
    Ok(())
}

/// Turn the configured inputs into intents: background, images, then texts.
async fn startup_intents(config: &EditorConfig) -> anyhow::Result<Vec<Intent>> {
    let mut intents = Vec::new();

    if let Some(path) = &config.background {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read background {}", path.display()))?;
        intents.push(Intent::SetBackground(bytes));
    }

    for path in &config.images {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        intents.push(Intent::AddImage(bytes));
    }

    let default_text = config.default_text.then(Intent::add_default_text);
    let texts = config.texts.iter().map(|content| Intent::AddText {
        content: Some(content.clone()),
        style: TextStyle::default(),
    });
    for text in default_text.into_iter().chain(texts) {
        intents.push(text);
        if let Some(color) = config.text_color {
            intents.push(Intent::SetTextColor(color));
        }
    }

    Ok(intents)
}
