#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

pub const EXPECTED_SCENARIO_COUNT: usize = 27;

#[derive(Debug, Clone, Deserialize)]
pub struct Check {
    pub path: String,
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub patch: Value,
    #[serde(default)]
    pub emitted: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub checks: Vec<Check>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    pub document: Value,
    pub scenarios: Vec<Scenario>,
}

pub fn scenarios_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("deployment_scenarios.json")
}

pub fn load_scenarios() -> ScenarioFile {
    let path = scenarios_path();
    let data = fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {e}", path));
    serde_json::from_str(&data).unwrap_or_else(|e| panic!("failed to parse {:?}: {e}", path))
}

/// The Deployment manifest every scenario starts from.
pub fn deployment() -> Value {
    load_scenarios().document
}
