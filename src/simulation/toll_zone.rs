//! Toll zones and the registry that holds them for a run

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;
use thiserror::Error;

use super::geometry::{GeometryError, LineSegment, Polygon, Route};
use super::types::{Position, ZoneId};

/// Zone configuration rejected before a run starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    #[error("zone {zone} has an invalid rate {rate} per km")]
    InvalidRate { zone: ZoneId, rate: f64 },

    #[error("zone {zone} has an invalid area: {source}")]
    InvalidArea {
        zone: ZoneId,
        #[source]
        source: GeometryError,
    },

    #[error("zone {0} is defined more than once")]
    DuplicateZone(ZoneId),
}

/// A geofenced area charging a rate per kilometer driven inside it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TollZone {
    pub id: ZoneId,
    pub center: Position,
    pub rate_per_km: f64,
    area: Polygon,
}

impl TollZone {
    /// Buffer `center` into a disc of `buffer_radius` and attach the rate
    pub fn new(
        id: ZoneId,
        center: Position,
        rate_per_km: f64,
        buffer_radius: f64,
        quad_segs: u32,
    ) -> Result<Self, ZoneError> {
        let area = Polygon::buffer(center, buffer_radius, quad_segs)
            .map_err(|source| ZoneError::InvalidArea { zone: id, source })?;
        Self::with_area(id, center, rate_per_km, area)
    }

    /// Build a zone from an explicit area
    pub fn with_area(
        id: ZoneId,
        center: Position,
        rate_per_km: f64,
        area: Polygon,
    ) -> Result<Self, ZoneError> {
        if !rate_per_km.is_finite() || rate_per_km < 0.0 {
            return Err(ZoneError::InvalidRate {
                zone: id,
                rate: rate_per_km,
            });
        }
        Ok(Self {
            id,
            center,
            rate_per_km,
            area,
        })
    }

    pub fn area(&self) -> &Polygon {
        &self.area
    }

    /// Part of the route inside this zone
    pub fn intersect(&self, route: &Route) -> Option<LineSegment> {
        self.area.intersect(route)
    }

    /// Charge for the whole route before any category adjustment
    pub fn raw_toll(&self, route: &Route) -> f64 {
        self.intersect(route)
            .map(|segment| segment.length() * self.rate_per_km)
            .unwrap_or(0.0)
    }
}

/// The fixed set of toll zones for a run, ordered by ascending id
#[derive(Debug, Clone, Default, Serialize)]
pub struct TollRegistry {
    zones: Vec<TollZone>,
}

impl TollRegistry {
    pub fn new(mut zones: Vec<TollZone>) -> Result<Self, ZoneError> {
        let mut seen = BTreeSet::new();
        for zone in &zones {
            if !seen.insert(zone.id) {
                return Err(ZoneError::DuplicateZone(zone.id));
            }
        }
        zones.sort_by_key(|zone| zone.id);
        debug!("Registered {} toll zones", zones.len());
        Ok(Self { zones })
    }

    /// Buffer each `(id, center, rate)` by the same radius and register the result
    pub fn buffered(
        centers: &[(ZoneId, Position, f64)],
        buffer_radius: f64,
        quad_segs: u32,
    ) -> Result<Self, ZoneError> {
        let zones = centers
            .iter()
            .map(|&(id, center, rate)| TollZone::new(id, center, rate, buffer_radius, quad_segs))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(zones)
    }

    pub fn zones(&self) -> &[TollZone] {
        &self.zones
    }

    pub fn iter(&self) -> impl Iterator<Item = &TollZone> {
        self.zones.iter()
    }

    pub fn get(&self, id: ZoneId) -> Option<&TollZone> {
        self.zones
            .binary_search_by_key(&id, |zone| zone.id)
            .ok()
            .map(|index| &self.zones[index])
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Sum of in-zone length times rate over every zone, in registry order
    pub fn raw_toll(&self, route: &Route) -> f64 {
        self.zones.iter().map(|zone| zone.raw_toll(route)).sum()
    }
}
