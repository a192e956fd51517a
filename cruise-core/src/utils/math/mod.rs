//! Math utilities for the cruise-control core.
//!
//! This module provides the saturation stage applied to every throttle command.

pub mod saturation;
