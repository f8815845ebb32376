//! Design Lab console binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lab_client::GenerationService;
use lab_core::{StateUpdate, UiEvent, PLACEHOLDER};
use lab_export::SessionExporter;
use lab_studio::console::{describe, parse_line, ConsoleCommand, HELP};
use lab_studio::runtime::DEFAULT_COMMAND_BUFFER;
use lab_studio::validation::EntryRef;
use lab_studio::{
    run, ArtifactSink, CliArgs, DirectorySink, JobRunner, LabConfig, SessionController,
    StudioHandle, UiBus,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with optional JSON format.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,lab_studio=info,lab_client=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    // Use JSON format when requested (RUST_LOG_FORMAT=json)
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

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = LabConfig::from(CliArgs::parse());
    info!(
        out_dir = %config.out_dir.display(),
        text_model = %config.generation.text_model,
        "Starting Design Lab"
    );

    let service = GenerationService::new(config.generation.clone())
        .context("building generation service")?;
    let sink: Arc<dyn ArtifactSink> = Arc::new(DirectorySink::new(config.out_dir.clone()));
    let runner = Arc::new(JobRunner::new(
        service,
        SessionExporter::with_defaults(),
        sink,
    ));

    let bus = UiBus::default();
    let printer = tokio::spawn(print_updates(bus.stream(), config.events_json));
    let controller = SessionController::new(bus.clone());
    let (handle, commands) = StudioHandle::channel(DEFAULT_COMMAND_BUFFER);

    println!("{PLACEHOLDER}\n\n{HELP}\n");

    let (controller, result) = tokio::join!(run(controller, runner, commands), repl(handle));

    // Dropping every bus handle ends the printer's stream.
    drop(controller);
    drop(bus);
    if let Err(e) = printer.await {
        warn!("Update printer stopped abnormally: {e}");
    }
    result
}

/// Read console lines until EOF or `/quit`.
async fn repl(handle: StudioHandle) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(ConsoleCommand::Event(event)) => handle.send(event).await?,
            Ok(ConsoleCommand::Remove(entry)) => {
                let id = match entry {
                    EntryRef::Id(id) => Some(id),
                    EntryRef::Position(position) => handle
                        .snapshot()
                        .await?
                        .view
                        .gallery
                        .get(position - 1)
                        .copied(),
                };
                match id {
                    Some(id) => handle.send(UiEvent::RemoveImage { id }).await?,
                    None => eprintln!("[error] no such gallery image"),
                }
            }
            Ok(ConsoleCommand::Show) => {
                let snapshot = handle.snapshot().await?;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            Ok(ConsoleCommand::Help) => println!("{HELP}"),
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Nothing) => {}
            Err(e) => eprintln!("[error] {e}"),
        }
    }

    info!("Console closed; waiting for running jobs");
    Ok(())
}

/// Print state updates as they arrive.
async fn print_updates(mut updates: BroadcastStream<StateUpdate>, json: bool) {
    while let Some(item) = updates.next().await {
        match item {
            Ok(update) if json => match update.to_json() {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("Failed to encode update: {e}"),
            },
            Ok(update) => {
                if let Some(text) = describe(&update) {
                    println!("{text}");
                }
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "Console fell behind; updates dropped");
            }
        }
    }
}
