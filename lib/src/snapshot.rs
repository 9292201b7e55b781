//! Positions of every catalog body at one instant.

use std::collections::HashMap;

use nalgebra::Vector3;
use tracing::debug;

use crate::{
    bodies::{BodyId, Catalog},
    error::Result,
    time::AdaliaDay,
};

/// Body positions all computed for the same `day` and `scale`.
///
/// Distances are only meaningful between positions of one snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionSnapshot {
    day: AdaliaDay,
    scale: f64,
    positions: HashMap<BodyId, Vector3<f64>>,
}

impl PositionSnapshot {
    /// Propagate every body in `catalog` to `day`, multiplying each
    /// position (AU) by `scale`.
    pub fn at(catalog: &Catalog, day: AdaliaDay, scale: f64) -> Result<Self> {
        let positions = catalog
            .iter()
            .map(|body| -> Result<_> { Ok((body.id, body.position_at(day)? * scale)) })
            .collect::<Result<HashMap<_, _>>>()?;
        debug!(%day, bodies = positions.len(), "computed position snapshot");
        Ok(Self {
            day,
            scale,
            positions,
        })
    }

    /// Build a snapshot from positions computed elsewhere.
    pub fn from_positions(
        day: AdaliaDay,
        scale: f64,
        positions: impl IntoIterator<Item = (BodyId, Vector3<f64>)>,
    ) -> Self {
        Self {
            day,
            scale,
            positions: positions.into_iter().collect(),
        }
    }

    pub fn day(&self) -> AdaliaDay {
        self.day
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn get(&self, id: BodyId) -> Option<&Vector3<f64>> {
        self.positions.get(&id)
    }

    /// Euclidean distance between two bodies of this snapshot.
    pub fn distance(&self, a: BodyId, b: BodyId) -> Option<f64> {
        Some((self.get(a)? - self.get(b)?).norm())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
