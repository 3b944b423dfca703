//! Entry point for the memwatch TUI. Parses args, wires the poll scheduler and runs the App.

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use memwatch::app::App;
use memwatch::config::{parse_args, ConfigError, Settings};
use memwatch::fetch::{Fetcher, SampleSource};
use memwatch::scheduler::Scheduler;
use memwatch::synthetic::SyntheticSource;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(std::env::args()) {
        Ok(v) => v,
        Err(ConfigError::Usage(msg)) => {
            eprintln!("{msg}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let settings = Settings::from_env(parsed)?;
    init_logging(&settings)?;

    let source: Arc<dyn SampleSource> = if settings.demo {
        Arc::new(SyntheticSource::new())
    } else {
        Arc::new(Fetcher::new(
            settings.base_url.clone(),
            settings.proxy_base.clone(),
        )?)
    };
    info!(
        endpoint = %settings.endpoint,
        base_url = %settings.base_url,
        demo = settings.demo,
        "memwatch starting"
    );
    let scheduler = Scheduler::new(source, settings.endpoint.clone(), settings.poll);

    if settings.headless {
        return run_headless(scheduler, settings.cycles).await;
    }
    let mut app = App::new(scheduler);
    app.run().await
}

// The TUI owns stderr, so logs only go to a file unless running headless.
fn init_logging(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("memwatch=info"));
    if let Some(path) = settings.log_path.as_ref() {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if settings.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

// --- Headless mode: one JSON chart point per completed cycle on stdout ---

async fn run_headless(mut scheduler: Scheduler, cycles: Option<u64>) -> anyhow::Result<()> {
    let mut points = scheduler.points();
    scheduler.start();

    let mut printed = 0;
    loop {
        let point = tokio::select! {
            p = points.recv() => match p {
                Some(p) => p,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        };
        println!("{}", serde_json::to_string(&point)?);
        printed += 1;
        if cycles.is_some_and(|n| printed >= n) {
            break;
        }
    }

    scheduler.stop().await;
    Ok(())
}
