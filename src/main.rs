use anyhow::Context as _;
use log::{info, LevelFilter};
use stationbreak::{
    config::Config,
    overlay::{Context, Overlay},
    speaker::LogSpeaker,
    surface::{MemorySurface, SnapshotWriter, Surface},
    widget,
};
use std::{sync::Arc, time::Duration};
use tokio::{runtime::Runtime, sync::Notify};

/// How long to wait on blocking work (e.g. an in-flight weather fetch) when
/// exiting. Anything still running after this is abandoned
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_module("stationbreak", LevelFilter::Info)
        .parse_default_env()
        .init();

    let runtime = build_runtime()?;
    let result = runtime.block_on(run());
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

/// Everything runs cooperatively on one thread. Blocking HTTP goes to the
/// blocking pool
fn build_runtime() -> anyhow::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Error building async runtime")
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    let snapshot = config.snapshot.clone();

    let surface = Arc::new(MemorySurface::default());
    let context = Context::new(
        config,
        Arc::clone(&surface) as Arc<dyn Surface>,
        Arc::new(LogSpeaker),
    );
    let overlay = Overlay::start(context);
    let snapshot_writer = snapshot.map(|snapshot| {
        let interval = snapshot.interval();
        widget::spawn(SnapshotWriter::new(surface, snapshot.path, interval))
    });

    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.notify_one())
            .context("Error installing signal handler")?;
    }
    info!("Overlay running, Ctrl-c to exit...");
    shutdown.notified().await;

    overlay.shutdown().await;
    if let Some(snapshot_writer) = snapshot_writer {
        snapshot_writer.stop().await;
    }
    Ok(())
}
