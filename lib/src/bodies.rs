//! Orbiting bodies and the catalog that holds them.

use std::{collections::HashMap, fmt, sync::Arc};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    kepler::orbits::{self, OrbitalElements},
    time::AdaliaDay,
};

/// Catalog identifier of a body, always in `1..=250000`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
#[repr(transparent)]
pub struct BodyId(u32);

impl BodyId {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 250_000;

    pub fn new(id: i64) -> Result<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&id) {
            Ok(Self(id as u32))
        } else {
            Err(Error::InvalidIdentifier(id))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for BodyId {
    type Error = Error;

    fn try_from(id: i64) -> Result<Self> {
        Self::new(id)
    }
}

impl From<BodyId> for u32 {
    fn from(id: BodyId) -> Self {
        id.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Size bucket of a body, by physical radius.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeClass {
    pub fn from_radius(radius: u32) -> Self {
        match radius {
            0..=5_000 => Self::Small,
            5_001..=20_000 => Self::Medium,
            20_001..=50_000 => Self::Large,
            _ => Self::Huge,
        }
    }
}

/// One line of an ingested catalog, as supplied by the data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    #[serde(rename = "i")]
    pub id: i64,
    /// Physical radius (m).
    #[serde(rename = "r")]
    pub radius: u32,
    #[serde(rename = "baseName")]
    pub base_name: String,
    #[serde(rename = "customName", default)]
    pub custom_name: String,
    pub orbital: OrbitalElements,
}

/// An orbiting body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    /// Physical radius (m). Only used for size bucketing.
    pub radius: u32,
    /// Name assigned by the catalog.
    pub base_name: Arc<str>,
    /// Name given by the body's owner, if any.
    pub custom_name: Option<Arc<str>>,
    pub orbital: OrbitalElements,
    /// Orbital period (whole days), derived from `orbital.a` on load.
    pub orbital_period: u32,
}

impl Body {
    pub fn new(
        id: BodyId,
        radius: u32,
        base_name: &str,
        custom_name: Option<&str>,
        orbital: OrbitalElements,
    ) -> Result<Self> {
        orbital.validate()?;
        Ok(Self {
            id,
            radius,
            base_name: base_name.into(),
            custom_name: custom_name.filter(|name| !name.is_empty()).map(Into::into),
            orbital,
            orbital_period: orbits::period(orbital.a)?,
        })
    }

    pub fn from_record(record: &BodyRecord) -> Result<Self> {
        Self::new(
            BodyId::new(record.id)?,
            record.radius,
            &record.base_name,
            Some(record.custom_name.as_str()),
            record.orbital,
        )
    }

    /// Display name: the custom name if there is one, else the base name.
    pub fn name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&*self.base_name)
    }

    pub fn size(&self) -> SizeClass {
        SizeClass::from_radius(self.radius)
    }

    /// Heliocentric position (AU) on `day`.
    pub fn position_at(&self, day: AdaliaDay) -> Result<Vector3<f64>> {
        orbits::position(&self.orbital, day.days())
    }

    pub fn current_position(&self) -> Result<Vector3<f64>> {
        self.position_at(AdaliaDay::now())
    }

    /// Positions (AU) for each day of one orbit, starting at epoch.
    pub fn orbit_trace(&self) -> Result<Vec<Vector3<f64>>> {
        orbits::orbit_trace(&self.orbital, self.orbital_period)
    }
}

/// Read-only collection of bodies keyed by id.
///
/// Share it behind an `Arc`; nothing mutates it after construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    bodies: HashMap<BodyId, Arc<Body>>,
}

impl Catalog {
    pub fn from_bodies(bodies: impl IntoIterator<Item = Body>) -> Result<Self> {
        let mut map = HashMap::new();
        for body in bodies {
            let id = body.id;
            if map.insert(id, Arc::new(body)).is_some() {
                return Err(Error::DuplicateBody(id));
            }
        }
        debug!(bodies = map.len(), "loaded catalog");
        Ok(Self { bodies: map })
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BodyRecord>) -> Result<Self> {
        let bodies = records
            .into_iter()
            .map(Body::from_record)
            .collect::<Result<Vec<_>>>()?;
        Self::from_bodies(bodies)
    }

    pub fn get(&self, id: BodyId) -> Result<&Arc<Body>> {
        self.bodies.get(&id).ok_or(Error::UnknownBody(id))
    }

    /// Look up a body by an unchecked id.
    pub fn lookup(&self, id: i64) -> Result<&Arc<Body>> {
        self.get(BodyId::new(id)?)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Body>> {
        self.bodies.values()
    }
}
