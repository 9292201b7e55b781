//! Spatial neighbour queries over a position snapshot.
//!
//! Candidates are first narrowed to bodies with a similar orbital period,
//! then tested by exact Euclidean distance. The period window is a cheap
//! proxy and not a spatial bound: two bodies with very different periods
//! can still be close at some instant and will not be offered.

use std::collections::HashMap;

use nalgebra::Vector3;
use tracing::{trace, warn};

use crate::{
    bodies::{BodyId, Catalog},
    snapshot::PositionSnapshot,
};

/// Default half-width of the orbital period pre-filter (days).
pub const DEFAULT_PERIOD_WINDOW: u32 = 1000;

#[derive(Clone, Debug)]
struct Candidate {
    period: u32,
    id: BodyId,
    position: Vector3<f64>,
}

/// Neighbour index over one [`PositionSnapshot`]. Build once per request.
#[derive(Clone, Debug)]
pub struct NeighborIndex<'a> {
    snapshot: &'a PositionSnapshot,
    window: u32,
    periods: HashMap<BodyId, u32>,
    /// Sorted by period, then id.
    by_period: Vec<Candidate>,
}

impl<'a> NeighborIndex<'a> {
    /// Index the bodies of `snapshot` with the given orbital periods.
    /// Bodies missing from either input are left out.
    pub fn new(
        snapshot: &'a PositionSnapshot,
        periods: impl IntoIterator<Item = (BodyId, u32)>,
        window: u32,
    ) -> Self {
        let periods = periods
            .into_iter()
            .filter(|(id, _)| snapshot.get(*id).is_some())
            .collect::<HashMap<_, _>>();
        let mut by_period = periods
            .iter()
            .filter_map(|(&id, &period)| {
                Some(Candidate {
                    period,
                    id,
                    position: *snapshot.get(id)?,
                })
            })
            .collect::<Vec<_>>();
        by_period.sort_unstable_by_key(|c| (c.period, c.id));

        if by_period.len() < snapshot.len() {
            warn!(
                indexed = by_period.len(),
                snapshot = snapshot.len(),
                "some snapshot bodies have no orbital period and will never be neighbours"
            );
        }

        Self {
            snapshot,
            window,
            periods,
            by_period,
        }
    }

    /// Index `snapshot` using the cached periods of `catalog`.
    pub fn from_catalog(snapshot: &'a PositionSnapshot, catalog: &Catalog, window: u32) -> Self {
        Self::new(
            snapshot,
            catalog.iter().map(|body| (body.id, body.orbital_period)),
            window,
        )
    }

    pub fn snapshot(&self) -> &'a PositionSnapshot {
        self.snapshot
    }

    pub fn len(&self) -> usize {
        self.by_period.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_period.is_empty()
    }

    /// Other bodies within `radius` of `id`. Order is unspecified.
    ///
    /// Returns nothing if `id` is not indexed.
    pub fn neighbors(&self, id: BodyId, radius: f64) -> Vec<BodyId> {
        debug_assert!(radius > 0.0, "neighbour radius must be positive");
        let (Some(&period), Some(origin)) = (self.periods.get(&id), self.snapshot.get(id)) else {
            return Vec::new();
        };

        let lo = period.saturating_sub(self.window);
        let hi = period.saturating_add(self.window);
        let start = self.by_period.partition_point(|c| c.period < lo);
        let end = self.by_period.partition_point(|c| c.period <= hi);

        let found = self.by_period[start..end]
            .iter()
            .filter(|c| c.id != id && (c.position - origin).norm() <= radius)
            .map(|c| c.id)
            .collect::<Vec<_>>();
        trace!(
            %id,
            window = end - start,
            found = found.len(),
            "neighbour query"
        );
        found
    }

    /// Distance between two bodies in the indexed snapshot.
    pub fn distance(&self, a: BodyId, b: BodyId) -> Option<f64> {
        self.snapshot.distance(a, b)
    }
}
