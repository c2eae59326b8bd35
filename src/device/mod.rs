//! The duty-cycle state machine.
//!
//! A [`Device`] owns every collaborator for one power cycle: the analog
//! source, the open log file, the status LED and the timer. It is either
//! `Running`, taking one window per cycle period, or `Failed`, where the only
//! thing left to do is blink the LED. There is no way back from `Failed`.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use crate::analysis::{CycleBuffers, DutyCyclePipeline, ModelParameters};
use crate::audio::{AnalogSource, Sampler};
use crate::config::{DeviceConfig, StorageConfig};
use crate::error::{
    log_analysis_error, log_storage_error, AnalysisError, ConfigError, ErrorCode, StorageError,
};
use crate::platform::{StatusLed, Timer};
use crate::storage::{LogFormat, PersistenceSink, Storage};

pub mod fail;

pub use fail::{FailIndicator, TOGGLE_PERIOD};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Running,
    Failed,
}

/// Reasons a device refuses to boot at all
///
/// Storage problems are not in here: they boot the device into `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum BootError {
    Config(ConfigError),
    Analysis(AnalysisError),
}

impl ErrorCode for BootError {
    fn code(&self) -> i32 {
        match self {
            BootError::Config(err) => err.code(),
            BootError::Analysis(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            BootError::Config(err) => err.message(),
            BootError::Analysis(err) => err.message(),
        }
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::Config(err) => write!(f, "{}", err),
            BootError::Analysis(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for BootError {}

impl From<ConfigError> for BootError {
    fn from(err: ConfigError) -> Self {
        BootError::Config(err)
    }
}

impl From<AnalysisError> for BootError {
    fn from(err: AnalysisError) -> Self {
        BootError::Analysis(err)
    }
}

/// One logger, from boot until power-off
pub struct Device<A, W, L, T>
where
    A: AnalogSource,
    W: Write,
    L: StatusLed,
    T: Timer,
{
    sampler: Sampler,
    pipeline: DutyCyclePipeline,
    buffers: CycleBuffers,
    sink: Option<PersistenceSink<W>>,
    source: A,
    indicator: FailIndicator<L>,
    timer: T,
    state: DeviceState,
    cycle_period: Duration,
    next_cycle: Duration,
    cycles_completed: u64,
}

impl<A, W, L, T> Device<A, W, L, T>
where
    A: AnalogSource,
    W: Write,
    L: StatusLed,
    T: Timer,
{
    /// Bring the device up
    ///
    /// Validates the configuration and model, mounts storage through `mount`
    /// and opens the log file. Invalid configuration or model parameters are
    /// returned as errors; a storage failure still yields a device, already in
    /// the `Failed` state.
    ///
    /// # Arguments
    /// * `config` - Device configuration
    /// * `model` - Classifier parameters (required in classify mode)
    /// * `mount` - Mounts the card described by the storage config
    /// * `source` - Analog input
    /// * `led` - Status LED
    /// * `timer` - Clock measured from boot
    pub fn boot<S, M>(
        config: &DeviceConfig,
        model: Option<ModelParameters>,
        mount: M,
        source: A,
        led: L,
        timer: T,
    ) -> Result<Self, BootError>
    where
        S: Storage<File = W>,
        M: FnOnce(&StorageConfig) -> Result<S, StorageError>,
    {
        config.validate()?;
        let pipeline = DutyCyclePipeline::new(&config.pipeline, model)?;
        let sampler = Sampler::new(config.sampling.sample_rate_hz, config.sampling.duration_ms);
        let buffers = pipeline.allocate_buffers(sampler.window_len());

        let sink = mount(&config.storage).and_then(|mut storage| {
            PersistenceSink::open(
                &mut storage,
                &config.storage.file_name,
                config.debug,
                LogFormat::for_config(config),
            )
        });

        let (sink, state) = match sink {
            Ok(sink) => (Some(sink), DeviceState::Running),
            Err(err) => {
                log_storage_error(&err, "boot");
                (None, DeviceState::Failed)
            }
        };

        let next_cycle = timer.now();
        tracing::info!(
            mode = ?config.pipeline.mode,
            file = %config.storage.file_name,
            window_len = sampler.window_len(),
            cycle_period_ms = config.schedule.cycle_period_ms,
            state = ?state,
            "device booted"
        );

        Ok(Self {
            sampler,
            pipeline,
            buffers,
            sink,
            source,
            indicator: FailIndicator::new(led),
            timer,
            state,
            cycle_period: Duration::from_millis(config.schedule.cycle_period_ms),
            next_cycle,
            cycles_completed: 0,
        })
    }

    /// Advance the state machine by one step
    ///
    /// `Running`: wait for the next cycle boundary and run one duty cycle.
    /// `Failed`: toggle the LED once and wait one toggle period.
    pub fn step(&mut self) -> DeviceState {
        match self.state {
            DeviceState::Running => self.run_duty_cycle(),
            DeviceState::Failed => {
                self.indicator.toggle();
                self.timer.delay(TOGGLE_PERIOD);
            }
        }
        self.state
    }

    /// Run `steps` steps and report where the device ended up
    pub fn run_cycles(&mut self, steps: u64) -> DeviceState {
        for _ in 0..steps {
            self.step();
        }
        self.state
    }

    /// Run until power-off
    pub fn run_forever(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Duty cycles that produced a persisted record
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    pub fn buffers(&self) -> &CycleBuffers {
        &self.buffers
    }

    pub fn sink(&self) -> Option<&PersistenceSink<W>> {
        self.sink.as_ref()
    }

    pub fn indicator(&self) -> &FailIndicator<L> {
        &self.indicator
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    fn run_duty_cycle(&mut self) {
        self.timer.delay_until(self.next_cycle);
        let timestamp_ms = self.timer.millis();
        self.acquire_and_log(timestamp_ms);
        if self.state == DeviceState::Running {
            self.schedule_next();
        }
    }

    fn acquire_and_log(&mut self, timestamp_ms: u64) {
        let collected = match self
            .sampler
            .acquire(&mut self.source, &mut self.timer, &mut self.buffers.window)
        {
            Ok(collected) => collected,
            Err(err) => {
                tracing::warn!(timestamp_ms, error = %err, "sampling failed, skipping cycle");
                self.buffers.clear();
                return;
            }
        };

        let outcome = match self
            .pipeline
            .process(&mut self.buffers, collected, timestamp_ms)
        {
            Ok(record) => match self.sink.as_mut() {
                Some(sink) => sink.append(&record).map(|_| true),
                None => Err(StorageError::WriteFailed {
                    path: String::new(),
                    reason: "log file is not open".to_string(),
                }),
            },
            Err(err) => {
                log_analysis_error(&err, "duty cycle");
                Ok(false)
            }
        };
        self.buffers.clear();

        match outcome {
            Ok(true) => {
                self.cycles_completed += 1;
                tracing::debug!(
                    timestamp_ms,
                    cycles = self.cycles_completed,
                    "duty cycle complete"
                );
            }
            Ok(false) => {}
            Err(err) => self.fail(&err),
        }
    }

    /// Next boundary is the first `k × period` not already in the past
    fn schedule_next(&mut self) {
        self.next_cycle += self.cycle_period;
        let now = self.timer.now();
        if self.next_cycle < now {
            let behind = now - self.next_cycle;
            let missed = behind.as_nanos() / self.cycle_period.as_nanos() + 1;
            self.next_cycle += self.cycle_period * missed as u32;
            tracing::warn!(missed = missed as u64, "duty cycle overran, skipping boundaries");
        }
    }

    fn fail(&mut self, err: &StorageError) {
        log_storage_error(err, "duty cycle");
        tracing::error!("entering fail state, no further records will be written");
        self.sink = None;
        self.state = DeviceState::Failed;
    }
}
