//! System assembly: builder, thread spawning, bounded shutdown.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use ap_bus::MessageBus;
use ap_control::Controller;
use ap_core::{AdaptationThresholds, LotConfig, SimulationParams};
use ap_knowledge::{NoopStore, TimeSeriesStore};
use ap_sim::LotEngine;
use tracing::{info, warn};

use crate::RuntimeResult;
use crate::signal::StopSignal;
use crate::task::{ControlTask, LotTask};

/// Longest we wait for a task's in-flight iteration on shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Assembles a [`System`] from its collaborators.
///
/// Required inputs up front, optional ones via chained setters; `build`
/// validates facility configs (engine construction rejects bad ones) and
/// opens all subscriptions before anything starts ticking.
pub struct SystemBuilder {
    bus: Arc<dyn MessageBus>,
    lot_configs: Vec<LotConfig>,
    params: SimulationParams,
    thresholds: AdaptationThresholds,
    store: Box<dyn TimeSeriesStore>,
}

impl SystemBuilder {
    pub fn new(bus: Arc<dyn MessageBus>, lot_configs: Vec<LotConfig>) -> Self {
        Self {
            bus,
            lot_configs,
            params: SimulationParams::default(),
            thresholds: AdaptationThresholds::default(),
            store: Box::new(NoopStore),
        }
    }

    /// Simulation parameters (tick cadence, demand rates, seed).
    pub fn params(mut self, params: SimulationParams) -> Self {
        self.params = params;
        self
    }

    /// Adaptation thresholds (occupancy bands, cooldown, cycle cadence).
    pub fn thresholds(mut self, thresholds: AdaptationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Time-series store for telemetry, decisions, and metrics.  Defaults
    /// to [`NoopStore`].
    pub fn store(mut self, store: Box<dyn TimeSeriesStore>) -> Self {
        self.store = store;
        self
    }

    /// Construct engines and tasks.  Fails on invalid facility config or a
    /// subscription the bus refuses — the only startup-fatal conditions.
    pub fn build(self) -> RuntimeResult<System> {
        let stop = StopSignal::new();
        let tick_interval = Duration::from_secs_f64(self.params.tick_interval_secs);
        let cycle_interval = Duration::from_secs_f64(self.thresholds.cycle_interval_secs);

        let controller = Controller::new(self.lot_configs.clone(), self.thresholds);
        let control_task = ControlTask::new(
            controller,
            self.store,
            Arc::clone(&self.bus),
            cycle_interval,
            stop.clone(),
        )?;

        let mut lot_tasks = Vec::with_capacity(self.lot_configs.len());
        for config in self.lot_configs {
            let engine = LotEngine::new(config, self.params.clone())?;
            lot_tasks.push(LotTask::new(
                engine,
                Arc::clone(&self.bus),
                tick_interval,
                stop.clone(),
            )?);
        }

        Ok(System { stop, lot_tasks, control_task })
    }
}

/// A fully wired but not yet running system.
pub struct System {
    stop: StopSignal,
    lot_tasks: Vec<LotTask>,
    control_task: ControlTask,
}

impl System {
    /// Spawn one thread per facility plus the control thread.
    pub fn start(self) -> RuntimeResult<RunningSystem> {
        let mut tasks = Vec::with_capacity(self.lot_tasks.len() + 1);

        for task in self.lot_tasks {
            let name = format!("lot-{}", task.lot_id());
            tasks.push(spawn_task(name, move || task.run())?);
        }
        tasks.push(spawn_task("control-loop".to_string(), {
            let task = self.control_task;
            move || task.run()
        })?);

        info!(tasks = tasks.len(), "system started");
        Ok(RunningSystem { stop: self.stop, tasks })
    }
}

struct TaskHandle {
    name: String,
    handle: JoinHandle<()>,
    done: Receiver<()>,
}

fn spawn_task(
    name: String,
    body: impl FnOnce() + Send + 'static,
) -> RuntimeResult<TaskHandle> {
    let (done_tx, done) = channel::<()>();
    let handle = std::thread::Builder::new().name(name.clone()).spawn(move || {
        // Dropped when the body returns; `stop` waits on the disconnect.
        let _done: Sender<()> = done_tx;
        body();
    })?;
    Ok(TaskHandle { name, handle, done })
}

/// Handle to the running threads.  Dropping it without calling [`stop`]
/// detaches them; `stop` is the orderly path.
///
/// [`stop`]: RunningSystem::stop
pub struct RunningSystem {
    stop: StopSignal,
    tasks: Vec<TaskHandle>,
}

impl RunningSystem {
    /// Raise the stop signal and wait, up to a bounded timeout per task,
    /// for in-flight iterations to finish.
    pub fn stop(self) {
        self.stop.stop();

        let deadline = Instant::now() + SHUTDOWN_TIMEOUT;
        for task in self.tasks {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match task.done.recv_timeout(remaining) {
                // Disconnect means the thread body returned.
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    let _ = task.handle.join();
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(task = %task.name, "task did not stop in time, detaching");
                }
            }
        }
        info!("system stopped");
    }
}
