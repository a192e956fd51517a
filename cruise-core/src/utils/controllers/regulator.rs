//! PI throttle regulator with integral anti-windup.
//!
//! `ThrottleRegulator` owns the controller state that persists between control
//! cycles. Each call to [`ThrottleRegulator::compute_cycle`] computes the
//! speed error, folds it into the integral term only if the previous output
//! was not clamped, and passes `P + I` through the saturator.
//!
//! # Example
//! ```rust
//! use cruise_core::utils::controllers::regulator::ThrottleRegulator;
//! let mut reg = ThrottleRegulator::new();
//! assert_eq!(reg.compute_cycle(false, 10.0, 0.0), 45.0);
//! ```
//!
use serde::{Deserialize, Serialize};

use crate::utils::math::saturation::saturate_throttle;

/// Proportional gain.
pub const KP: f32 = 8.113;
/// Integral gain.
pub const KI: f32 = 0.5;

/// Proportional and integral gains applied by the regulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegulatorGains {
    /// Throttle per unit of speed error.
    pub kp: f32,
    /// Throttle per unit of accumulated speed error.
    pub ki: f32,
}

impl Default for RegulatorGains {
    fn default() -> Self {
        Self { kp: KP, ki: KI }
    }
}

/// State carried from one control cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    /// Accumulated speed error (speed x cycles).
    pub integral_term: f32,
    /// Whether the previous cycle's output was clamped.
    pub is_saturated: bool,
}

impl ControllerState {
    /// Startup state: empty integrator, integration frozen.
    pub const fn startup() -> Self {
        Self {
            integral_term: 0.0,
            is_saturated: true,
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::startup()
    }
}

/// Whether the next cycle will integrate its error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Integrating,
    Frozen,
}

/// Inputs sampled for one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleInput {
    /// Cruise (re)engaged this cycle; clears the integrator.
    pub enable: bool,
    /// Desired speed.
    pub cruise_speed: f32,
    /// Measured speed.
    pub vehicle_speed: f32,
}

/// Throttle produced by one control cycle, plus the state left for the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleOutput {
    /// Clamped throttle, within `[0, 45]` for finite inputs.
    pub throttle_command: f32,
    /// Whether the command was clamped; freezes integration next cycle.
    pub saturated: bool,
    /// Integral term after this cycle's update.
    pub integral_term: f32,
}

/// Discrete PI regulator producing a throttle command in `[0, 45]`.
#[derive(Debug, Clone)]
pub struct ThrottleRegulator {
    gains: RegulatorGains,
    state: ControllerState,
}

impl ThrottleRegulator {
    /// Create a regulator with the default `KP`/`KI` gains.
    pub fn new() -> Self {
        Self::with_gains(RegulatorGains::default())
    }

    /// Create a regulator with custom gains, in its startup state.
    pub fn with_gains(gains: RegulatorGains) -> Self {
        Self {
            gains,
            state: ControllerState::startup(),
        }
    }

    /// Restore the startup state without touching the gains.
    pub fn reset(&mut self) {
        tracing::debug!("regulator reset");
        self.state = ControllerState::startup();
    }

    /// Run one control cycle and return the clamped throttle command.
    ///
    /// When `enable` is set the integrator is cleared and frozen before the
    /// error is computed, so the returned command is purely proportional.
    pub fn compute_cycle(
        &mut self,
        enable: bool,
        cruise_speed: f32,
        vehicle_speed: f32,
    ) -> f32 {
        if enable {
            tracing::debug!("cruise engaged, clearing integrator");
            self.state = ControllerState::startup();
        }
        if !cruise_speed.is_finite() || !vehicle_speed.is_finite() {
            tracing::warn!(cruise_speed, vehicle_speed, "non-finite speed input");
        }

        let error = cruise_speed - vehicle_speed;
        let proportional_action = error * self.gains.kp;

        // Frozen while the last command was clamped.
        if !self.state.is_saturated {
            self.state.integral_term += error;
        }
        let integral_action = self.state.integral_term * self.gains.ki;

        let sat = saturate_throttle(proportional_action + integral_action);
        self.state.is_saturated = sat.saturated;

        tracing::trace!(
            error,
            proportional_action,
            integral_action,
            throttle = sat.throttle,
            saturated = sat.saturated,
            "regulator cycle"
        );
        if sat.throttle.is_nan() {
            tracing::warn!("throttle command is NaN");
        }

        sat.throttle
    }

    /// Run one control cycle from a [`CycleInput`].
    pub fn step(
        &mut self,
        input: &CycleInput,
    ) -> CycleOutput {
        let throttle_command =
            self.compute_cycle(input.enable, input.cruise_speed, input.vehicle_speed);
        CycleOutput {
            throttle_command,
            saturated: self.state.is_saturated,
            integral_term: self.state.integral_term,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn gains(&self) -> RegulatorGains {
        self.gains
    }

    /// Mode the next cycle will run in.
    pub fn mode(&self) -> Mode {
        if self.state.is_saturated {
            Mode::Frozen
        } else {
            Mode::Integrating
        }
    }
}

impl Default for ThrottleRegulator {
    fn default() -> Self {
        Self::new()
    }
}
