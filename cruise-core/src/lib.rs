//! Throttle regulation core for a vehicle cruise-control feature on no-std platforms.
//!
//! For a runnable harness, see the `cruise-app/mock-ecu` binary.
#![no_std]

pub mod utils;
