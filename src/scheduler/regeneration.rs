//! Tokio implementation of the regeneration scheduler.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time;

use crate::observability::metrics;
use crate::scheduler::UpdateScheduler;
use crate::store::EndpointStore;
use crate::synthesis::{ConfigTarget, RenderError};

/// Store snapshot → targets, bounded per target by a timeout.
struct Pipeline {
    store: Arc<dyn EndpointStore>,
    targets: Vec<Arc<dyn ConfigTarget>>,
    timeout: Duration,
    /// Held by the blocking task for the whole target run, snapshot
    /// included. A run that timed out keeps it until it actually finishes,
    /// and whoever gets it next reads the store afresh.
    publish: Arc<Mutex<()>>,
}

impl Pipeline {
    /// Run every target once. All targets are attempted; the first error is
    /// returned after the rest have run.
    async fn run(&self) -> Result<(), RenderError> {
        let mut first_error = None;
        for target in &self.targets {
            let start = Instant::now();
            let name = target.name().to_string();
            match self.run_target(target.clone()).await {
                Ok(endpoints) => {
                    tracing::debug!(config_target = %name, endpoints, "Regeneration succeeded");
                    metrics::record_regeneration(&name, "success", start);
                }
                Err(e) => {
                    tracing::error!(config_target = %name, error = %e, "Regeneration failed");
                    metrics::record_regeneration(&name, e.outcome(), start);
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Returns the number of endpoints published.
    async fn run_target(&self, target: Arc<dyn ConfigTarget>) -> Result<usize, RenderError> {
        let name = target.name().to_string();
        let store = self.store.clone();
        let publish = self.publish.clone();
        let task = tokio::task::spawn_blocking(move || -> Result<usize, RenderError> {
            let _guard = publish.lock().unwrap_or_else(PoisonError::into_inner);
            let endpoints = store.find_all()?;
            target.regenerate(&endpoints)?;
            Ok(endpoints.len())
        });

        match time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            // Blocking tasks are never aborted, a join error is a panic.
            Ok(Err(_)) => Err(RenderError::Panicked { target: name }),
            Err(_) => Err(RenderError::Timeout {
                target: name,
                timeout: self.timeout,
            }),
        }
    }
}

/// Debounced regeneration on a single background worker.
pub struct RegenerationScheduler {
    delay: Duration,
    ticks: mpsc::UnboundedSender<()>,
    pipeline: Arc<Pipeline>,
    runtime: Handle,
}

impl RegenerationScheduler {
    /// Spawn the worker on the current runtime. The worker exits when
    /// `shutdown` fires.
    pub fn spawn(
        store: Arc<dyn EndpointStore>,
        targets: Vec<Arc<dyn ConfigTarget>>,
        delay: Duration,
        timeout: Duration,
        shutdown: broadcast::Receiver<()>,
    ) -> (Self, JoinHandle<()>) {
        let (ticks, rx) = mpsc::unbounded_channel();
        let pipeline = Arc::new(Pipeline {
            store,
            targets,
            timeout,
            publish: Arc::new(Mutex::new(())),
        });

        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            timeout_ms = timeout.as_millis() as u64,
            targets = pipeline.targets.len(),
            "Regeneration scheduler starting"
        );
        let worker = tokio::spawn(run_worker(pipeline.clone(), rx, shutdown));

        let scheduler = Self {
            delay,
            ticks,
            pipeline,
            runtime: Handle::current(),
        };
        (scheduler, worker)
    }

    /// Regenerate immediately and wait for the result. Used at startup so
    /// the proxy has documents before the first mutation.
    pub async fn run_now(&self) -> Result<(), RenderError> {
        self.pipeline.run().await
    }
}

impl UpdateScheduler for RegenerationScheduler {
    fn schedule_config_update(&self) {
        let ticks = self.ticks.clone();
        let delay = self.delay;
        self.runtime.spawn(async move {
            time::sleep(delay).await;
            // Closed only after shutdown; nothing left to regenerate for.
            let _ = ticks.send(());
        });
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Configuration update scheduled");
    }
}

async fn run_worker(
    pipeline: Arc<Pipeline>,
    mut ticks: mpsc::UnboundedReceiver<()>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            tick = ticks.recv() => {
                if tick.is_none() {
                    break;
                }
                // Errors are logged and counted inside the run.
                let _ = pipeline.run().await;
            }
            _ = shutdown.recv() => {
                tracing::info!("Regeneration scheduler received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
