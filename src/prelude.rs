//! Convenience re-exports for building and sweeping cascades.

pub use crate::circuits::{
    cascade::{compose, Cascade},
    component::{Capacitor, Component, ComponentKind, Inductor, Lumped, Resistor},
    stage::{Stage, Topology},
    terminals::{extract, Excitation, OutputQuantity, PortQuantities, TerminalResponse},
    twoport::TwoPort,
};
pub use crate::constants::*;
pub use crate::errors::{AnalysisError, CascadeError, ConfigError, DomainError, EvaluationError};
pub use crate::format::{mag, mag_db, phase_deg, phase_rad, write_response_csv, OutputSpec, SiPrefix};
pub use crate::math::{phasor, CScalar, Scalar};
pub use crate::netlist::{Netlist, ParseError};
pub use crate::simulation::{
    analyse, ErrorPolicy, Execution, FrequencyResponse, PointOutcome, SweepConfig, SweepResult,
};
pub use crate::sweep::{linspace, logspace_hz, sweep, FrequencySweep, Spacing};
