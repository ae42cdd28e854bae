//! Dashboard policy: growth snapshot years, ranking size and state exclusions.
//!
//! Stored as an optional JSON object on disk; every key may be omitted:
//! ```json
//! {
//!   "growth_start_year": 2018,
//!   "growth_end_year": 2023,
//!   "growth_metric": "ev",
//!   "top_k": 5,
//!   "excluded_states": ["Alaska", "Hawaii", "Puerto Rico"]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::records::Metric;

/// A named set of states dropped from the contiguous-US sales map.
///
/// Growth and correlation computations never consult this set; they always
/// run over the full dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct StateExclusion {
    states: BTreeSet<String>,
}

impl From<Vec<String>> for StateExclusion {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<StateExclusion> for Vec<String> {
    fn from(exclusion: StateExclusion) -> Self {
        exclusion.states.into_iter().collect()
    }
}

impl StateExclusion {
    /// Alaska, Hawaii and Puerto Rico: the states outside the contiguous map.
    pub fn non_contiguous() -> Self {
        Self::from_names(["Alaska", "Hawaii", "Puerto Rico"])
    }

    /// An exclusion that drops nothing.
    pub fn none() -> Self {
        Self {
            states: BTreeSet::new(),
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            states: names
                .into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .collect(),
        }
    }

    pub fn contains(&self, state: &str) -> bool {
        self.states.contains(state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(String::as_str)
    }
}

impl Default for StateExclusion {
    fn default() -> Self {
        Self::non_contiguous()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub growth_start_year: i32,
    pub growth_end_year: i32,
    pub growth_metric: Metric,
    pub top_k: usize,
    pub excluded_states: StateExclusion,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            growth_start_year: 2018,
            growth_end_year: 2023,
            growth_metric: Metric::Ev,
            top_k: 5,
            excluded_states: StateExclusion::non_contiguous(),
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config '{}'", path.display()))?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
