//! Module Exports
//!
//! This file exports the controllers used by the cruise-control core.
//!
//! - `regulator`: PI throttle regulator with anti-windup.
//!
//! `SystemController` wraps one regulator and dispatches `CruiseCommand`s
//! decoded from the harness.

/// Module for the PI throttle regulator.
pub mod regulator;

use core::fmt;
use serde::{Deserialize, Serialize};

pub use regulator::{CycleInput, CycleOutput, RegulatorGains, ThrottleRegulator};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cc", rename_all = "snake_case")] // cc = cruise command
pub enum CruiseCommand {
    /// Run one control cycle.
    Cycle {
        enable: bool,
        cruise_speed: f32,
        vehicle_speed: f32,
    },
    /// Reinitialize the regulator to its startup state.
    Reset,
}

impl From<CycleInput> for CruiseCommand {
    fn from(input: CycleInput) -> Self {
        CruiseCommand::Cycle {
            enable: input.enable,
            cruise_speed: input.cruise_speed,
            vehicle_speed: input.vehicle_speed,
        }
    }
}

/// Errors raised while decoding harness commands.
#[derive(Debug)]
pub enum CommandError {
    Malformed(serde_json::Error),
}

impl fmt::Display for CommandError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            CommandError::Malformed(e) => write!(f, "malformed cruise command: {}", e),
        }
    }
}

impl CommandError {
    /// Column of the encoded command where decoding failed.
    pub fn column(&self) -> usize {
        match self {
            CommandError::Malformed(e) => e.column(),
        }
    }
}

/// Decode a JSON-encoded `CruiseCommand`.
pub fn parse_command(raw: &[u8]) -> Result<CruiseCommand, CommandError> {
    serde_json::from_slice(raw).map_err(CommandError::Malformed)
}

pub struct SystemController {
    pub regulator: ThrottleRegulator,
    cycles: u64,
}

impl SystemController {
    pub fn new(gains: Option<RegulatorGains>) -> Self {
        let gains = gains.unwrap_or_default();
        tracing::info!(kp = gains.kp, ki = gains.ki, "regulator configured");

        SystemController {
            regulator: ThrottleRegulator::with_gains(gains),
            cycles: 0,
        }
    }

    /// Number of cycles executed since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Execute a `CruiseCommand`. Returns the cycle output for `Cycle`, `None` for `Reset`.
    pub fn execute_command(
        &mut self,
        command: CruiseCommand,
    ) -> Option<CycleOutput> {
        match command {
            CruiseCommand::Cycle {
                enable,
                cruise_speed,
                vehicle_speed,
            } => {
                let out = self.regulator.step(&CycleInput {
                    enable,
                    cruise_speed,
                    vehicle_speed,
                });
                self.cycles += 1;
                Some(out)
            }
            CruiseCommand::Reset => {
                tracing::info!(after_cycles = self.cycles, "controller reset requested");
                self.regulator.reset();
                None
            }
        }
    }
}
