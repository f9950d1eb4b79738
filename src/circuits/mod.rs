//! Lumped elements, stages and two-port algebra for cascaded networks.

/// Lumped component definitions and the impedance trait.
pub mod component;
/// ABCD two-port matrices.
pub mod twoport;
/// Series and shunt stages built from single components.
pub mod stage;
/// Ordered stage chains and their composition.
pub mod cascade;
/// Gains, impedances and port quantities of a terminated network.
pub mod terminals;

pub use cascade::{compose, Cascade};
pub use component::{Capacitor, Component, ComponentKind, Inductor, Lumped, Resistor};
pub use stage::{Stage, Topology};
pub use terminals::{extract, Excitation, OutputQuantity, PortQuantities, TerminalResponse};
pub use twoport::TwoPort;
