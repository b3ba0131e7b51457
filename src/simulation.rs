//! Time-domain waveforms and the scheduled oscilloscope loop.

use std::f64::consts::PI;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info_span, warn};

use crate::circuits::analysis::TwoPortModel;
use crate::math::{phasor, CScalar, Scalar};
use crate::sweep::linspace;

/// Errors that can occur while configuring or executing the oscilloscope.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Raised when a required parameter is missing.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    /// Raised when the configuration is internally inconsistent.
    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

/// Samples `amplitude * sin(2π f t + phase)` at each time in `times`.
#[must_use]
pub fn sine_wave(times: &[Scalar], frequency_hz: Scalar, amplitude: Scalar, phase: Scalar) -> Vec<Scalar> {
    times
        .iter()
        .map(|t| amplitude * (2.0 * PI * frequency_hz * t + phase).sin())
        .collect()
}

/// Source of elapsed time and sleeping for the scope loop.
pub trait Clock {
    /// Time since the clock started.
    fn elapsed(&self) -> Duration;
    /// Blocks (or advances virtual time) for `interval`.
    fn sleep(&mut self, interval: Duration);
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Starts a clock now.
    #[must_use]
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

/// Virtual clock that only moves when slept on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    /// Clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward without sleeping.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, interval: Duration) {
        self.now += interval;
    }
}

/// Shared stop flag for a running scope.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to stop before its next frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once `cancel` has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Oscilloscope settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeConfig {
    /// Source frequency in Hz.
    pub frequency_hz: Scalar,
    /// Source peak amplitude in volts.
    pub amplitude: Scalar,
    /// Visible time span in seconds.
    pub time_window: Scalar,
    /// Samples per trace.
    pub samples: usize,
    /// Delay between frames.
    pub update_interval: Duration,
    /// Stop after this many frames.
    pub max_frames: Option<usize>,
    /// Stop once this much clock time has elapsed.
    pub max_duration: Option<Duration>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 50.0,
            amplitude: 1.0,
            time_window: 0.1,
            samples: 1000,
            update_interval: Duration::from_millis(50),
            max_frames: Some(100),
            max_duration: None,
        }
    }
}

impl ScopeConfig {
    /// Checks the settings for values the loop cannot run with.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.frequency_hz >= 0.0 && self.frequency_hz.is_finite()) {
            return Err(SimulationError::InvalidConfig(format!(
                "frequency must be a non-negative number, got {}",
                self.frequency_hz
            )));
        }
        if !self.amplitude.is_finite() {
            return Err(SimulationError::InvalidConfig("amplitude must be finite".into()));
        }
        if !(self.time_window > 0.0 && self.time_window.is_finite()) {
            return Err(SimulationError::InvalidConfig("time_window must be > 0".into()));
        }
        if self.samples == 0 {
            return Err(SimulationError::InvalidConfig("samples must be > 0".into()));
        }
        if self.update_interval.is_zero() {
            return Err(SimulationError::InvalidConfig("update_interval must be > 0".into()));
        }
        if self.max_frames.is_none() && self.max_duration.is_none() {
            return Err(SimulationError::MissingParameter("max_frames or max_duration"));
        }
        Ok(())
    }
}

/// One rendered oscilloscope frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeFrame {
    /// Zero-based frame number.
    pub index: usize,
    /// Clock time the frame was taken at.
    pub elapsed: Duration,
    /// Sample times in seconds, `0..=time_window`.
    pub times: Vec<Scalar>,
    /// Source voltage.
    pub input: Vec<Scalar>,
    /// Output voltage: source scaled by |H| and shifted by arg H.
    pub output: Vec<Scalar>,
}

/// Why a scope run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The cancel token fired.
    Cancelled,
    /// `max_frames` frames were delivered.
    FrameLimit,
    /// `max_duration` elapsed.
    DurationElapsed,
    /// The frame sink failed; the message is the sink's error.
    FrameError(String),
}

/// Summary of a finished scope run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeReport {
    /// Frames successfully delivered.
    pub frames: usize,
    /// Reason the loop ended.
    pub stop: StopReason,
}

/// Continuously advancing two-trace oscilloscope for a [`TwoPortModel`].
#[derive(Debug)]
pub struct Oscilloscope<K: Clock> {
    config: ScopeConfig,
    clock: K,
    cancel: CancelToken,
    h: CScalar,
}

impl<K: Clock> Oscilloscope<K> {
    /// Builds a scope after validating `config`.
    pub fn new(model: &TwoPortModel, config: ScopeConfig, clock: K) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            h: model.transfer(config.frequency_hz),
            config,
            clock,
            cancel: CancelToken::new(),
        })
    }

    /// Token that stops this scope when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Active settings.
    #[must_use]
    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Synthesizes a frame with its phase driven by `elapsed`.
    #[must_use]
    pub fn frame_at(&self, index: usize, elapsed: Duration) -> ScopeFrame {
        let cfg = &self.config;
        let times = linspace(0.0, cfg.time_window, cfg.samples);
        let phase = 2.0 * PI * cfg.frequency_hz * elapsed.as_secs_f64();
        let input = sine_wave(&times, cfg.frequency_hz, cfg.amplitude, phase);
        // Im(A * H * e^(jθ)) = A|H| sin(θ + arg H)
        let output = times
            .iter()
            .map(|t| {
                let theta = 2.0 * PI * cfg.frequency_hz * t + phase;
                cfg.amplitude * (self.h * phasor(theta)).im
            })
            .collect();
        ScopeFrame {
            index,
            elapsed,
            times,
            input,
            output,
        }
    }

    /// Runs frame, hand off, sleep until a bound is hit, the token is
    /// cancelled, or `sink` fails.
    pub fn run<F, E>(&mut self, mut sink: F) -> ScopeReport
    where
        F: FnMut(&ScopeFrame) -> Result<(), E>,
        E: Display,
    {
        let _span = info_span!("oscilloscope", frequency_hz = self.config.frequency_hz).entered();
        let mut frames = 0;
        let stop = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if self.config.max_frames.is_some_and(|max| frames >= max) {
                break StopReason::FrameLimit;
            }
            let elapsed = self.clock.elapsed();
            if self.config.max_duration.is_some_and(|max| elapsed >= max) {
                break StopReason::DurationElapsed;
            }

            let frame = self.frame_at(frames, elapsed);
            if let Err(err) = sink(&frame) {
                warn!(frame = frames, error = %err, "simulation error, stopping scope");
                break StopReason::FrameError(err.to_string());
            }
            frames += 1;
            self.clock.sleep(self.config.update_interval);
        };
        debug!(frames, ?stop, "scope stopped");
        ScopeReport { frames, stop }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::circuits::network::RlcNetwork;

    fn divider() -> TwoPortModel {
        TwoPortModel::new(RlcNetwork::resistor(100.0), RlcNetwork::resistor(100.0))
    }

    fn config() -> ScopeConfig {
        ScopeConfig {
            frequency_hz: 50.0,
            amplitude: 2.0,
            time_window: 0.02,
            samples: 5,
            update_interval: Duration::from_millis(10),
            max_frames: Some(3),
            max_duration: None,
        }
    }

    #[test]
    fn sine_wave_samples() {
        let v = sine_wave(&[0.0, 0.25, 0.5], 1.0, 3.0, 0.0);
        assert_relative_eq!(v[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(v[1], 3.0, epsilon = 1e-12);
        assert_relative_eq!(v[2], 0.0, epsilon = 1e-12);
        let shifted = sine_wave(&[0.0], 1.0, 1.0, PI / 2.0);
        assert_relative_eq!(shifted[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn frame_output_is_scaled_input() {
        let scope = Oscilloscope::new(&divider(), config(), ManualClock::new()).unwrap();
        let frame = scope.frame_at(0, Duration::ZERO);
        assert_eq!(frame.times.len(), 5);
        for (i, o) in frame.input.iter().zip(&frame.output) {
            assert_relative_eq!(*o, i * 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn elapsed_time_advances_phase() {
        let scope = Oscilloscope::new(&divider(), config(), ManualClock::new()).unwrap();
        // A quarter period at 50 Hz is 5 ms.
        let frame = scope.frame_at(1, Duration::from_millis(5));
        assert_relative_eq!(frame.input[0], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn stops_at_frame_limit_using_virtual_time() {
        let mut scope = Oscilloscope::new(&divider(), config(), ManualClock::new()).unwrap();
        let mut seen = Vec::new();
        let report = scope.run(|f| {
            seen.push(f.elapsed);
            Ok::<(), String>(())
        });
        assert_eq!(report, ScopeReport { frames: 3, stop: StopReason::FrameLimit });
        assert_eq!(
            seen,
            vec![Duration::ZERO, Duration::from_millis(10), Duration::from_millis(20)]
        );
    }

    #[test]
    fn stops_when_duration_elapses() {
        let cfg = ScopeConfig {
            max_frames: None,
            max_duration: Some(Duration::from_millis(35)),
            ..config()
        };
        let mut scope = Oscilloscope::new(&divider(), cfg, ManualClock::new()).unwrap();
        let report = scope.run(|_| Ok::<(), String>(()));
        assert_eq!(report, ScopeReport { frames: 4, stop: StopReason::DurationElapsed });
    }

    #[test]
    fn cancel_from_sink() {
        let cfg = ScopeConfig { max_frames: Some(100), ..config() };
        let mut scope = Oscilloscope::new(&divider(), cfg, ManualClock::new()).unwrap();
        let token = scope.cancel_token();
        let report = scope.run(|f| {
            if f.index == 1 {
                token.cancel();
            }
            Ok::<(), String>(())
        });
        assert_eq!(report, ScopeReport { frames: 2, stop: StopReason::Cancelled });
    }

    #[test]
    fn sink_errors_end_the_run_without_panicking() {
        let mut scope = Oscilloscope::new(&divider(), config(), ManualClock::new()).unwrap();
        let report = scope.run(|f| if f.index == 1 { Err("display closed") } else { Ok(()) });
        assert_eq!(
            report,
            ScopeReport { frames: 1, stop: StopReason::FrameError("display closed".into()) }
        );
    }

    #[test]
    fn unbounded_config_is_rejected() {
        let cfg = ScopeConfig { max_frames: None, max_duration: None, ..config() };
        let err = Oscilloscope::new(&divider(), cfg, ManualClock::new()).unwrap_err();
        assert!(matches!(err, SimulationError::MissingParameter(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = ScopeConfig { update_interval: Duration::ZERO, ..config() };
        assert!(matches!(cfg.validate().unwrap_err(), SimulationError::InvalidConfig(_)));
    }
}
