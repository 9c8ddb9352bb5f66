use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use acp_host_mock::ScriptedHost;
use acp_protocol::{HostEvent, PermissionOutcome};
use acp_transcript::config::EnvConfig;
use clap::Parser;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use transcript_cli::app::App;
use transcript_cli::logging;
use transcript_cli::runtime::{lock_unpoisoned, TranscriptController};
use transcript_cli::view::{render, ViewOptions};

/// Renders an agent session transcript from host events and answers
/// permission requests with `response:` lines on stdout.
#[derive(Debug, Parser)]
#[command(name = "acp-transcript", version)]
struct Cli {
    /// Replay host events from a JSON-lines file before reading stdin.
    #[arg(long, value_name = "FILE")]
    events: Option<PathBuf>,

    /// Play the built-in demo session before reading stdin.
    #[arg(long)]
    demo: bool,

    /// Tracing filter directive; overrides ACP_TRANSCRIPT_LOG.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    /// Do not render the transcript to stderr.
    #[arg(long)]
    quiet: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = EnvConfig::from_env();
    logging::init(&logging::resolve_filter(
        cli.log.as_deref(),
        config.log_filter.as_deref(),
    ))?;

    let app = Arc::new(Mutex::new(App::with_options(config.session_options())));
    let controller = TranscriptController::new(Arc::clone(&app), Box::new(io::stdout()));
    let view = (!cli.quiet).then(|| ViewOptions {
        ansi: io::stderr().is_terminal(),
    });

    if let Some(path) = &cli.events {
        let replayed = replay_events(&controller, path)?;
        info!(path = %path.display(), lines = replayed, "replayed host events");
        render_if_requested(&controller, view)?;
    }

    if cli.demo {
        let cancel = AtomicBool::new(false);
        let outcome = ScriptedHost::default().play(&cancel, &mut |event: HostEvent| {
            if matches!(event, HostEvent::PermissionRequest { .. }) {
                watch_outcome(controller.request_permission(event));
            } else {
                controller.submit_host_event(event);
            }
        });
        debug!(?outcome, "demo script finished");
        render_if_requested(&controller, view)?;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim_start().starts_with('{') {
            if let Some(receiver) = controller.submit_host_line(line.trim()) {
                watch_outcome(receiver);
            }
        } else {
            controller.submit_line(line);
        }
        render_if_requested(&controller, view)?;
        if controller.stop_requested() || lock_unpoisoned(&app).should_exit {
            break;
        }
    }

    Ok(())
}

fn replay_events(controller: &Arc<TranscriptController>, path: &Path) -> io::Result<usize> {
    let file = File::open(path)?;
    let mut replayed = 0usize;
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(receiver) = controller.submit_host_line(line) {
            watch_outcome(receiver);
        }
        replayed += 1;
    }
    Ok(replayed)
}

fn watch_outcome(receiver: oneshot::Receiver<PermissionOutcome>) {
    let spawned = std::thread::Builder::new()
        .name("permission-outcome".to_string())
        .spawn(move || match receiver.blocking_recv() {
            Ok(outcome) => info!(?outcome, "host received permission outcome"),
            Err(_) => debug!("permission request dropped without an outcome"),
        });
    if let Err(error) = spawned {
        warn!(error = %error, "failed to start permission outcome watcher");
    }
}

fn render_if_requested(
    controller: &Arc<TranscriptController>,
    view: Option<ViewOptions>,
) -> io::Result<()> {
    if !controller.take_render_request() {
        return Ok(());
    }
    let Some(view) = view else {
        return Ok(());
    };
    let frame = render(&lock_unpoisoned(controller.app()), view);
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{frame}")?;
    stderr.flush()
}
