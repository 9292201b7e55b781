//! Route queries between catalog bodies.
//!
//! Every request propagates the whole catalog to one day, indexes that
//! snapshot once, and runs A* over it with straight-line distance as both
//! the edge cost and the heuristic. A route is a chain of bodies where
//! each hop is no longer than the configured radius.

use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    bodies::{Body, BodyId, Catalog, SizeClass},
    error::{Error, Result},
    kepler::orbits::AU_SCALE,
    neighbors::{NeighborIndex, DEFAULT_PERIOD_WINDOW},
    search::{AStar, SearchSpace},
    snapshot::PositionSnapshot,
    time::AdaliaDay,
};

/// Cost model used to rank routes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteHeuristic {
    /// Straight-line distance between bodies.
    #[default]
    Distance,
}

impl FromStr for RouteHeuristic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "distance" | "euclidean" | "euclidian" => Ok(Self::Distance),
            _ => Err(Error::UnknownHeuristic(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Longest single hop, in scaled units.
    pub radius: f64,
    /// Half-width of the orbital period pre-filter (days).
    pub period_window: u32,
    /// Multiplier applied to positions in AU.
    pub scale: f64,
    /// Give up after closing this many bodies.
    pub max_expansions: Option<usize>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            radius: 100.0,
            period_window: DEFAULT_PERIOD_WINDOW,
            scale: AU_SCALE,
            max_expansions: None,
        }
    }
}

impl RouteConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(Error::InvalidConfig("radius must be positive"));
        }
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(Error::InvalidConfig("scale must be positive"));
        }
        Ok(())
    }
}

/// A route query as received from a client. Ids are unchecked.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: Vec<i64>,
    pub targets: Vec<i64>,
    #[serde(default)]
    pub heuristic: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Bodies from start to target. Empty if no route exists.
    pub path: Vec<BodyId>,
    /// Summed hop lengths along `path`, in scaled units. Infinite if no
    /// route exists.
    pub distance: f64,
    pub start_name: String,
    pub target_name: String,
    pub heuristic: RouteHeuristic,
    pub day: AdaliaDay,
    /// Multiplier applied to positions (AU) for this route.
    pub scale: f64,
    /// Bodies expanded by the search.
    pub expanded: usize,
}

impl Route {
    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }

    /// Presentation summaries of every body on the path, positioned on
    /// the route's day and scale.
    pub fn summaries(&self, catalog: &Catalog) -> Result<Vec<BodySummary>> {
        self.path
            .iter()
            .map(|&id| BodySummary::new(catalog.get(id)?, self.day, self.scale))
            .collect()
    }
}

/// What a presentation layer needs to draw one body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodySummary {
    pub id: BodyId,
    pub name: String,
    pub size: SizeClass,
    pub position: Vector3<f64>,
    /// One full orbit, one point per day from epoch.
    pub orbit: Vec<Vector3<f64>>,
}

impl BodySummary {
    pub fn new(body: &Body, day: AdaliaDay, scale: f64) -> Result<Self> {
        Ok(Self {
            id: body.id,
            name: body.name().to_owned(),
            size: body.size(),
            position: body.position_at(day)? * scale,
            orbit: body.orbit_trace()?.into_iter().map(|p| p * scale).collect(),
        })
    }
}

/// Catalog bodies as a search graph: an edge joins any two bodies within
/// `radius` of each other.
struct BodyGraph<'i, 's> {
    index: &'i NeighborIndex<'s>,
    radius: f64,
    heuristic: RouteHeuristic,
}

impl BodyGraph<'_, '_> {
    fn distance(&self, a: BodyId, b: BodyId) -> f64 {
        self.index.distance(a, b).unwrap_or(f64::INFINITY)
    }
}

impl SearchSpace for BodyGraph<'_, '_> {
    type Node = BodyId;

    fn heuristic(&self, node: BodyId, goal: BodyId) -> f64 {
        match self.heuristic {
            RouteHeuristic::Distance => self.distance(node, goal),
        }
    }

    fn edge_cost(&self, from: BodyId, to: BodyId) -> f64 {
        self.distance(from, to)
    }

    fn neighbors(&self, node: BodyId) -> Vec<BodyId> {
        self.index.neighbors(node, self.radius)
    }
}

/// Route from `start` to `target` over an already built index.
pub fn find_route(
    index: &NeighborIndex<'_>,
    start: &Body,
    target: &Body,
    heuristic: RouteHeuristic,
    config: &RouteConfig,
) -> Result<Route> {
    config.validate()?;
    let graph = BodyGraph {
        index,
        radius: config.radius,
        heuristic,
    };
    let outcome = AStar::new()
        .max_expansions(config.max_expansions)
        .run(&graph, start.id, target.id)?;

    Ok(Route {
        path: outcome.path,
        distance: outcome.cost,
        start_name: start.name().to_owned(),
        target_name: target.name().to_owned(),
        heuristic,
        day: index.snapshot().day(),
        scale: index.snapshot().scale(),
        expanded: outcome.expanded,
    })
}

/// Answer a route request at `day`.
///
/// Every id in the request must name a catalog body, but only the first
/// start and first target body are routed.
pub fn plan_route(
    catalog: &Catalog,
    request: &RouteRequest,
    day: AdaliaDay,
    config: &RouteConfig,
) -> Result<Route> {
    config.validate()?;
    let heuristic = request.heuristic.parse::<RouteHeuristic>()?;
    if request.start.is_empty() || request.targets.is_empty() {
        return Err(Error::EmptyRequest);
    }
    let bodies = request
        .start
        .iter()
        .chain(&request.targets)
        .map(|&id| catalog.lookup(id))
        .collect::<Result<Vec<_>>>()?;
    let start = bodies[0];
    let target = bodies[request.start.len()];
    if request.start.len() > 1 || request.targets.len() > 1 {
        debug!(
            starts = request.start.len(),
            targets = request.targets.len(),
            "routing first start and target only"
        );
    }

    let snapshot = PositionSnapshot::at(catalog, day, config.scale)?;
    let index = NeighborIndex::from_catalog(&snapshot, catalog, config.period_window);
    let route = find_route(&index, start, target, heuristic, config)?;
    debug!(
        start = %start.id,
        target = %target.id,
        %day,
        hops = route.path.len().saturating_sub(1),
        distance = route.distance,
        "planned route"
    );
    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kepler::orbits::OrbitalElements;

    fn id(raw: i64) -> BodyId {
        BodyId::new(raw).unwrap()
    }

    /// Bodies sharing one circular 1 AU orbit, `spacing` radians apart.
    fn convoy(count: i64, spacing: f64) -> Catalog {
        Catalog::from_bodies((1..=count).map(|raw| {
            Body::new(
                id(raw),
                1000,
                &format!("Rock {raw}"),
                None,
                OrbitalElements::new(1.0, 0.0, 0.0, 0.0, 0.0, spacing * (raw - 1) as f64).unwrap(),
            )
            .unwrap()
        }))
        .unwrap()
    }

    fn request(start: i64, target: i64) -> RouteRequest {
        RouteRequest {
            start: vec![start],
            targets: vec![target],
            heuristic: "distance".into(),
        }
    }

    #[test]
    fn heuristic_names() {
        assert_eq!("Distance".parse(), Ok(RouteHeuristic::Distance));
        assert_eq!(" euclidean ".parse(), Ok(RouteHeuristic::Distance));
        assert_eq!("".parse(), Ok(RouteHeuristic::Distance));
        assert_eq!(
            "fuel".parse::<RouteHeuristic>(),
            Err(Error::UnknownHeuristic("fuel".into()))
        );
    }

    #[test]
    fn config_defaults_and_overrides() {
        let config: RouteConfig = toml::from_str("radius = 50.0\nmax_expansions = 10").unwrap();
        assert_eq!(
            config,
            RouteConfig {
                radius: 50.0,
                max_expansions: Some(10),
                ..RouteConfig::default()
            }
        );
        assert_eq!(RouteConfig::default().period_window, 1000);

        let bad = RouteConfig {
            radius: 0.0,
            ..RouteConfig::default()
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn stepping_stones_beat_the_radius() {
        // A, B, C in a line: AB = 50, BC = 60, AC = 110 > radius.
        let catalog = convoy(3, 0.0);
        let snapshot = PositionSnapshot::from_positions(
            AdaliaDay::ZERO,
            1.0,
            [
                (id(1), Vector3::new(0.0, 0.0, 0.0)),
                (id(2), Vector3::new(50.0, 0.0, 0.0)),
                (id(3), Vector3::new(110.0, 0.0, 0.0)),
            ],
        );
        let index = NeighborIndex::from_catalog(&snapshot, &catalog, 1000);
        let route = find_route(
            &index,
            catalog.lookup(1).unwrap(),
            catalog.lookup(3).unwrap(),
            RouteHeuristic::Distance,
            &RouteConfig::default(),
        )
        .unwrap();

        assert_eq!(route.path, vec![id(1), id(2), id(3)]);
        assert!((route.distance - 110.0).abs() < 1e-9);
        assert_eq!(route.start_name, "Rock 1");
        assert_eq!(route.target_name, "Rock 3");
    }

    #[test]
    fn routes_along_a_shared_orbit() {
        // Neighbours are 0.5 rad apart: one hop is ~74 scaled units, two
        // hops ~143, so every route has to visit each body in turn.
        let catalog = convoy(4, 0.5);
        let route = plan_route(&catalog, &request(1, 4), AdaliaDay::ZERO, &RouteConfig::default())
            .unwrap();

        assert_eq!(route.path, vec![id(1), id(2), id(3), id(4)]);
        let hop = 2.0 * libm::sin(0.25) * AU_SCALE;
        assert!((route.distance - 3.0 * hop).abs() < 1e-6, "{}", route.distance);

        let summaries = route.summaries(&catalog).unwrap();
        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries[0].name, "Rock 1");
        assert_eq!(summaries[0].size, SizeClass::Small);
        assert_eq!(summaries[0].orbit.len(), 366);
        assert_eq!(route.scale, AU_SCALE);
        assert!((summaries[0].position.x - AU_SCALE).abs() < 1e-9);
    }

    #[test]
    fn same_start_and_target() {
        let catalog = convoy(2, 0.5);
        let route = plan_route(&catalog, &request(2, 2), AdaliaDay::ZERO, &RouteConfig::default())
            .unwrap();
        assert_eq!(route.path, vec![id(2)]);
        assert_eq!(route.distance, 0.0);
    }

    #[test]
    fn no_route_is_not_an_error() {
        let catalog = convoy(3, 2.0);
        let route = plan_route(&catalog, &request(1, 3), AdaliaDay::ZERO, &RouteConfig::default())
            .unwrap();
        assert!(!route.is_found());
        assert!(route.path.is_empty());
    }

    #[test]
    fn request_errors() {
        let catalog = convoy(3, 0.5);
        let config = RouteConfig::default();
        let day = AdaliaDay::ZERO;

        assert_eq!(
            plan_route(&catalog, &request(0, 3), day, &config),
            Err(Error::InvalidIdentifier(0))
        );
        assert_eq!(
            plan_route(&catalog, &request(1, 9), day, &config),
            Err(Error::UnknownBody(id(9)))
        );
        let trailing = RouteRequest {
            start: vec![1, 2],
            targets: vec![3, 0],
            ..request(1, 3)
        };
        assert_eq!(
            plan_route(&catalog, &trailing, day, &config),
            Err(Error::InvalidIdentifier(0))
        );
        let trailing = RouteRequest {
            start: vec![1, 999_999],
            targets: vec![3],
            ..request(1, 3)
        };
        assert_eq!(
            plan_route(&catalog, &trailing, day, &config),
            Err(Error::InvalidIdentifier(999_999))
        );
        let trailing = RouteRequest {
            targets: vec![3, 7],
            ..request(1, 3)
        };
        assert_eq!(
            plan_route(&catalog, &trailing, day, &config),
            Err(Error::UnknownBody(id(7)))
        );
        assert_eq!(
            plan_route(&catalog, &RouteRequest::default(), day, &config),
            Err(Error::EmptyRequest)
        );

        let mut odd = request(1, 3);
        odd.heuristic = "time".into();
        assert_eq!(
            plan_route(&catalog, &odd, day, &config),
            Err(Error::UnknownHeuristic("time".into()))
        );

        let tight = RouteConfig {
            max_expansions: Some(1),
            ..config
        };
        assert_eq!(
            plan_route(&catalog, &request(1, 3), day, &tight),
            Err(Error::SearchBudgetExhausted { expanded: 1 })
        );
    }
}
