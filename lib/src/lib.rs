#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::doc_markdown
)]
//! Positions of orbiting bodies over time, and routes between them through
//! a catalog of nearby bodies.

pub mod bodies;
pub mod error;
pub mod kepler;
pub mod neighbors;
pub mod routing;
pub mod search;
pub mod snapshot;
pub mod time;

pub use error::{Error, Result};
