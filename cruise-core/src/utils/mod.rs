//! Utility re-exports for the cruise-control core.
//!
//! - `controllers`: the PI throttle regulator and the command dispatcher that
//!   drives it
//! - `math`: throttle saturation against the fixed actuator range

pub mod controllers;
pub mod math;

pub use controllers::{
    regulator::{ThrottleRegulator, KI, KP},
    SystemController,
};
pub use math::saturation::{saturate_throttle, THROTTLE_MAX, THROTTLE_MIN};
