//! Error types for the route-finding core.
//!
//! A search that finds no route is not an error: it is reported as an
//! empty [`Route`](crate::routing::Route) path.

use thiserror::Error;

use crate::bodies::BodyId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Body id outside `1..=250000`.
    #[error("invalid body id {0} (expected 1..=250000)")]
    InvalidIdentifier(i64),

    /// Non-positive semi-major axis or eccentricity outside `[0, 1)`.
    #[error("invalid orbital elements: {reason} (a = {a}, e = {e})")]
    InvalidElements { a: f64, e: f64, reason: &'static str },

    /// Kepler's equation did not settle within the iteration cap.
    #[error("Kepler's equation failed to converge after {maxiter} iterations (M = {ma}, e = {e})")]
    ConvergenceFailure { ma: f64, e: f64, maxiter: u64 },

    #[error("body {0} is not in the catalog")]
    UnknownBody(BodyId),

    #[error("body {0} appears more than once in the catalog")]
    DuplicateBody(BodyId),

    #[error("unknown route heuristic {0:?}")]
    UnknownHeuristic(String),

    #[error("route request needs at least one start and one target body")]
    EmptyRequest,

    #[error("invalid route configuration: {0}")]
    InvalidConfig(&'static str),

    /// The search hit its expansion budget before settling.
    #[error("route search gave up after expanding {expanded} bodies")]
    SearchBudgetExhausted { expanded: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
