//! A "widget" is one self-contained piece of the overlay. Each widget has a
//! submodule, which implements all logic for fetching and rendering its data.

pub mod clock;
pub mod speech;
pub mod ticker;
pub mod traffic;
pub mod transit;
pub mod weather;

use log::{error, info, trace};
use std::{future::Future, time::Duration};
use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

/// A piece of the overlay that refreshes itself on a schedule. Each widget
/// gets its own async task via [spawn], which calls [Widget::update], waits
/// [Widget::period], and repeats until the returned handle is stopped.
pub trait Widget: 'static + Send + Sized {
    /// Get a descriptive name for this widget, for logging
    fn name(&self) -> &'static str;

    /// Time to wait after each update before running the next one
    fn period(&self) -> Duration;

    /// Time to wait after startup before the first update
    fn initial_delay(&self) -> Duration {
        Duration::ZERO
    }

    /// Prepare the widget, once on startup
    fn on_start(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Fetch data and render it. An error here is logged, and the next update
    /// still happens on schedule. Whatever was rendered last stays up.
    fn update(&mut self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Start a widget in a background task. It will run until the handle is
/// cancelled or stopped. Dropping the handle does *not* stop the widget.
pub fn spawn<W: Widget>(widget: W) -> WidgetHandle {
    let name = widget.name();
    let token = CancellationToken::new();
    let task = tokio::spawn(run(widget, token.clone()));
    WidgetHandle { name, token, task }
}

async fn run<W: Widget>(mut widget: W, token: CancellationToken) {
    let name = widget.name();
    info!("Starting widget {name}");
    tokio::select! {
        () = token.cancelled() => {}
        () = run_loop(&mut widget) => {}
    }
    info!("Stopped widget {name}");
}

async fn run_loop<W: Widget>(widget: &mut W) {
    let name = widget.name();
    if let Err(err) = widget.on_start() {
        error!("Error starting widget {name}: {err:#}");
    }
    time::sleep(widget.initial_delay()).await;
    loop {
        trace!("Updating widget {name}");
        if let Err(err) = widget.update().await {
            error!("Error updating widget {name}: {err:#}");
        }
        time::sleep(widget.period()).await;
    }
}

/// Control handle for a running widget
#[derive(Debug)]
pub struct WidgetHandle {
    name: &'static str,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl WidgetHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signal the widget to stop. It exits at its next await point, so an
    /// in-flight update may be abandoned partway.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the widget and wait for its task to exit
    pub async fn stop(self) {
        self.cancel();
        if let Err(err) = self.task.await {
            error!("Widget {} exited abnormally: {err}", self.name);
        }
    }
}
