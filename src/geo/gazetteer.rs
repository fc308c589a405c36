//! Process-wide city dataset with approximate name lookup

use crate::config::GazetteerConfig;
use crate::geo::matcher::{closest_match, NameMatcher, SequenceMatcher};
use crate::geo::{tier_from_population, CityInfo, GeoResolver};
use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, info};

/// Dataset compiled into the binary, used when no file is configured.
const EMBEDDED_CITIES: &str = include_str!("../../data/cities.json");

/// Default similarity a corrected name must reach.
pub const DEFAULT_MATCH_CUTOFF: f64 = 0.7;

static GLOBAL: OnceCell<Gazetteer> = OnceCell::new();

/// One city as stored in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub population: u64,
}

impl CityRecord {
    pub fn info(&self) -> CityInfo {
        CityInfo {
            tier: tier_from_population(self.population),
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

/// Immutable name → id → city lookup.
pub struct Gazetteer {
    index: HashMap<String, usize>,
    cities: Vec<CityRecord>,
    matcher: Box<dyn NameMatcher>,
    cutoff: f64,
}

impl Gazetteer {
    /// Build from records. When a name repeats, the last record wins.
    pub fn from_records(cities: Vec<CityRecord>) -> Self {
        let index = cities
            .iter()
            .enumerate()
            .map(|(id, city)| (city.name.clone(), id))
            .collect();

        Self {
            index,
            cities,
            matcher: Box::new(SequenceMatcher::new()),
            cutoff: DEFAULT_MATCH_CUTOFF,
        }
    }

    /// Parse a JSON array of [`CityRecord`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cities: Vec<CityRecord> =
            serde_json::from_str(json).context("Failed to parse city dataset")?;
        Ok(Self::from_records(cities))
    }

    /// Load a JSON city dataset from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .context(format!("Failed to read city dataset from {:?}", path))?;
        let gazetteer = Self::from_json_str(&raw)?;

        info!(
            path = %path.display(),
            cities = gazetteer.len(),
            "Loaded city dataset"
        );
        Ok(gazetteer)
    }

    /// The dataset compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_CITIES)
    }

    /// Build from configuration: the configured file, or the embedded dataset.
    pub fn from_config(config: &GazetteerConfig) -> Result<Self> {
        let gazetteer = match &config.data_path {
            Some(path) => Self::from_path(path)?,
            None => Self::embedded()?,
        };
        Ok(gazetteer.with_cutoff(config.match_cutoff))
    }

    pub fn with_matcher(mut self, matcher: impl NameMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Make `gazetteer` the process-wide instance.
    ///
    /// Fails if the global instance was already installed or used.
    pub fn install(gazetteer: Gazetteer) -> Result<&'static Gazetteer> {
        GLOBAL
            .set(gazetteer)
            .map_err(|_| anyhow!("Gazetteer already initialized"))?;
        Ok(Self::global())
    }

    /// Process-wide instance, initialized from the embedded dataset on
    /// first use unless [`Gazetteer::install`] ran before.
    pub fn global() -> &'static Gazetteer {
        GLOBAL.get_or_init(|| {
            Self::embedded().unwrap_or_else(|e| {
                error!(error = %e, "Embedded city dataset unusable, every city will be unresolved");
                Self::from_records(Vec::new())
            })
        })
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Record for an exact name.
    pub fn get(&self, name: &str) -> Option<&CityRecord> {
        self.index.get(name).map(|&id| &self.cities[id])
    }

    /// Known name closest to `name`, or `name` itself when it is known or
    /// nothing clears the cutoff.
    pub fn correct<'a>(&'a self, name: &'a str) -> &'a str {
        if self.index.contains_key(name) {
            return name;
        }
        closest_match(
            self.matcher.as_ref(),
            name,
            self.index.keys().map(String::as_str),
            self.cutoff,
        )
        .unwrap_or(name)
    }
}

impl GeoResolver for Gazetteer {
    fn resolve(&self, city: &str) -> CityInfo {
        let corrected = self.correct(city);
        if corrected != city {
            debug!(input = %city, corrected = %corrected, "City name corrected");
        }

        match self.get(corrected) {
            Some(record) => record.info(),
            None => {
                debug!(city = %city, "City not found, using unresolved fallback");
                CityInfo::UNRESOLVED
            }
        }
    }
}
