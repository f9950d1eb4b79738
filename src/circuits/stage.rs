use crate::errors::DomainError;
use crate::math::Scalar;

use super::component::{Component, Lumped};
use super::twoport::TwoPort;

/// Where a stage's element sits relative to the signal path.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// In the signal path between input and output.
    Series,
    /// Bridging the signal path to ground.
    Shunt,
}

/// One element of a cascade together with its placement.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// The passive element.
    pub component: Component,
    /// Series or shunt placement.
    pub topology: Topology,
}

impl Stage {
    /// Pairs `component` with `topology`.
    #[must_use]
    pub fn new(component: impl Into<Component>, topology: Topology) -> Self {
        Self {
            component: component.into(),
            topology,
        }
    }

    /// Series stage holding `component`.
    #[must_use]
    pub fn series(component: impl Into<Component>) -> Self {
        Self::new(component, Topology::Series)
    }

    /// Shunt stage holding `component`.
    #[must_use]
    pub fn shunt(component: impl Into<Component>) -> Self {
        Self::new(component, Topology::Shunt)
    }

    /// ABCD matrix of this stage at angular frequency `omega`.
    ///
    /// A shunt element with zero impedance fails with [`DomainError::ShuntShort`].
    pub fn matrix(&self, omega: Scalar) -> Result<TwoPort, DomainError> {
        let z = self.component.impedance(omega)?;
        match self.topology {
            Topology::Series => Ok(TwoPort::series_impedance(z)),
            Topology::Shunt => TwoPort::shunt_impedance(z)
                .ok_or_else(|| DomainError::ShuntShort(self.component.name().to_owned())),
        }
    }
}
