#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Angular-frequency conversions.
pub mod constants;
/// Scalar and complex aliases plus exact-zero helpers.
pub mod math;
/// Components, stages, ABCD matrices and terminal responses.
pub mod circuits;
/// Frequency sweep builders.
pub mod sweep;
/// Sweep driver and per-point results.
pub mod simulation;
/// Magnitude, phase, decibel and CSV presentation.
pub mod format;
/// Netlist file reader.
pub mod netlist;
/// Error types shared between modules.
pub mod errors;

/// Common exports for downstream crates.
pub mod prelude;
