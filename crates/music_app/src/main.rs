mod args;
mod config_file;
mod console;
mod logging;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use music_engine::{CommandOutcome, LogEventSink, MusicCommandRouter};
use music_logging::{music_info, music_warn};
use tokio_util::sync::CancellationToken;

use crate::console::ConsoleSession;

fn main() -> anyhow::Result<()> {
    let args = args::Args::parse();
    logging::initialize(args.log_destination, args.log_level);

    let config = config_file::load_config(&args.config_path)?;
    let router = MusicCommandRouter::from_config(config, Arc::new(LogEventSink))
        .context("building the music router")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting the async runtime")?;
    let outcome = runtime.block_on(run(&router, &args));

    match outcome {
        CommandOutcome::NotHandled => {
            println!("not a music command: {:?}", args.command_text());
        }
        CommandOutcome::Played(track) => {
            println!(
                "played {} from {} ({:.1}s)",
                track.title,
                track.path.display(),
                track.duration.as_secs_f64()
            );
        }
        CommandOutcome::Failed(kind) => {
            println!("music command accepted but not played: {kind}");
        }
    }
    Ok(())
}

async fn run(router: &MusicCommandRouter, args: &args::Args) -> CommandOutcome {
    let session = ConsoleSession::new();
    let cancel = CancellationToken::new();

    let watchdog = cancel.clone();
    let timeout = args.deadline();
    tokio::spawn(async move {
        let deadline = async {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => music_warn!("interrupted, cancelling"),
            _ = deadline => music_warn!("deadline reached, cancelling"),
            _ = watchdog.cancelled() => return,
        }
        watchdog.cancel();
    });

    let outcome = if args.random {
        router.play_random_local(&session, &cancel).await
    } else {
        router.handle_command(&session, &args.command_text(), &cancel).await
    };
    cancel.cancel();

    let queued = session.drain_queue();
    music_info!(
        "{} item(s) on the playback queue, response {}",
        queued.len(),
        if session.is_responding() { "open" } else { "finished" }
    );
    outcome
}
