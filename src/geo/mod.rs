//! Geographic lookup capability consumed by the scoring rules.

pub mod gazetteer;
pub mod matcher;

pub use gazetteer::{CityRecord, Gazetteer};
pub use matcher::{NameMatcher, SequenceMatcher};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_371.0088;

/// Tier assigned to names that cannot be resolved.
pub const UNRESOLVED_TIER: u8 = 5;

/// Resolved location of a city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityInfo {
    /// Population rank, 0 = megacity, 5 = small town or unresolved
    pub tier: u8,
    pub lat: f64,
    pub lon: f64,
}

impl CityInfo {
    /// Fallback for names no known city matches.
    ///
    /// Unresolved cities share the origin, so travel between two of them
    /// measures zero distance.
    pub const UNRESOLVED: CityInfo = CityInfo {
        tier: UNRESOLVED_TIER,
        lat: 0.0,
        lon: 0.0,
    };

    /// Great-circle (haversine) distance to another city in kilometres.
    pub fn distance_km(&self, other: &CityInfo) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}

/// Population-derived tier.
pub fn tier_from_population(population: u64) -> u8 {
    match population {
        p if p >= 5_000_000 => 0,
        p if p >= 1_000_000 => 1,
        p if p >= 500_000 => 2,
        p if p >= 100_000 => 3,
        p if p >= 20_000 => 4,
        _ => UNRESOLVED_TIER,
    }
}

/// Maps a free-text city name to its location and tier.
///
/// Implementations never fail: unknown names resolve to
/// [`CityInfo::UNRESOLVED`].
pub trait GeoResolver: Send + Sync {
    fn resolve(&self, city: &str) -> CityInfo;
}

impl<T: GeoResolver + ?Sized> GeoResolver for &T {
    fn resolve(&self, city: &str) -> CityInfo {
        (**self).resolve(city)
    }
}

impl<T: GeoResolver + ?Sized> GeoResolver for Arc<T> {
    fn resolve(&self, city: &str) -> CityInfo {
        (**self).resolve(city)
    }
}
