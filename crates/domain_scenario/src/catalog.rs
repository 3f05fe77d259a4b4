//! In-memory scenario catalog

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use core_kernel::ScenarioCode;

use crate::error::ScenarioError;
use crate::scenario::ClinicalScenario;

#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioDocument {
    Many(Vec<ClinicalScenario>),
    One(Box<ClinicalScenario>),
}

/// Validated scenarios keyed by code
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: BTreeMap<ScenarioCode, Arc<ClinicalScenario>>,
}

impl ScenarioCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document holding one scenario or a list of them
    pub fn load_from_str(&mut self, json: &str) -> Result<usize, ScenarioError> {
        let scenarios = match serde_json::from_str::<ScenarioDocument>(json)
            .map_err(|e| ScenarioError::Parse(e.to_string()))?
        {
            ScenarioDocument::Many(scenarios) => scenarios,
            ScenarioDocument::One(scenario) => vec![*scenario],
        };

        let count = scenarios.len();
        for scenario in scenarios {
            self.insert(scenario)?;
        }
        Ok(count)
    }

    pub fn load_from_file(&mut self, path: &Path) -> Result<usize, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScenarioError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let count = self.load_from_str(&content)?;
        debug!(path = %path.display(), scenarios = count, "Loaded scenario file");
        Ok(count)
    }

    /// Loads every `*.json` file in a directory, in file-name order
    pub fn load_from_dir(&mut self, dir: &Path) -> Result<usize, ScenarioError> {
        let io_error = |e: std::io::Error| ScenarioError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();

        let mut total = 0;
        for file in &files {
            total += self.load_from_file(file)?;
        }

        info!(dir = %dir.display(), files = files.len(), scenarios = total, "Loaded scenario catalog");
        Ok(total)
    }

    /// Validates and registers a scenario
    pub fn insert(&mut self, scenario: ClinicalScenario) -> Result<(), ScenarioError> {
        scenario.validate()?;
        if self.scenarios.contains_key(&scenario.code) {
            return Err(ScenarioError::validation(&scenario.code, "scenario code registered twice"));
        }
        self.scenarios.insert(scenario.code.clone(), Arc::new(scenario));
        Ok(())
    }

    pub fn get(&self, code: &ScenarioCode) -> Result<Arc<ClinicalScenario>, ScenarioError> {
        self.scenarios
            .get(code)
            .cloned()
            .ok_or_else(|| ScenarioError::not_found(code))
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &Arc<ClinicalScenario>> {
        self.scenarios.values()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
