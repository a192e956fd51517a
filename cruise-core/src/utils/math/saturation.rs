//! Throttle saturation for the cruise-control regulator.
//!
//! `saturate_throttle` clamps a raw throttle command into the actuator range
//! `[THROTTLE_MIN, THROTTLE_MAX]` and reports whether clamping occurred, which
//! the regulator feeds back into its anti-windup logic.
//!
//! # Example
//! ```rust
//! use cruise_core::utils::math::saturation::saturate_throttle;
//! let sat = saturate_throttle(81.13);
//! assert_eq!(sat.throttle, 45.0);
//! assert!(sat.saturated);
//! ```
//!
use serde::Serialize;

/// Upper bound of the throttle command.
pub const THROTTLE_MAX: f32 = 45.0;
/// Lower bound of the throttle command.
pub const THROTTLE_MIN: f32 = 0.0;

/// Result of passing a raw command through the saturator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Saturation {
    /// Command after clamping.
    pub throttle: f32,
    /// `true` if the raw command fell outside the valid range.
    pub saturated: bool,
}

/// Clamp `throttle_in` to `[THROTTLE_MIN, THROTTLE_MAX]`.
///
/// The upper bound is checked first, then the lower one. A NaN input matches
/// neither comparison and is passed through with `saturated == false`.
pub fn saturate_throttle(throttle_in: f32) -> Saturation {
    if throttle_in > THROTTLE_MAX {
        Saturation {
            throttle: THROTTLE_MAX,
            saturated: true,
        }
    } else if throttle_in < THROTTLE_MIN {
        Saturation {
            throttle: THROTTLE_MIN,
            saturated: true,
        }
    } else {
        Saturation {
            throttle: throttle_in,
            saturated: false,
        }
    }
}
