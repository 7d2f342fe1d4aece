//! On-disk store for benchmark data and model responses.
//!
//! One JSON file per config, named by the config identifier
//! (`{name}_{mode}_{version}_{type}_{size}.json`). A result file holds the
//! original unsorted lists plus every model run recorded so far; re-running a
//! model appends another run unless the caller checks availability first.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::value::Scalar;

/// Named lists for one config, e.g. `list_0` through `list_99`.
pub type ListSet = BTreeMap<String, Vec<Scalar>>;

/// One model's recorded responses for a config, keyed by list name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRun {
    pub model: String,
    /// Raw response text per list name; never reparsed into the store.
    pub sorted_lists: BTreeMap<String, String>,
}

/// Everything recorded for one config: ground truth plus model runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigResults {
    pub unsorted_lists: ListSet,
    pub results: Vec<ModelRun>,
}

/// List config file names under `dir` matching `{name}_{mode}_{version}_` in
/// sorted order.
pub fn fetch_config_names(dir: &Path, name: &str, mode: &str, version: &str) -> Result<Vec<String>> {
    let prefix = format!("{}_{}_{}_", name, mode, version);
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with(&prefix) {
            names.push(file_name);
        }
    }
    names.sort();
    Ok(names)
}

/// Load every result file under `dir`, keyed by config name.
pub fn load_all_results(dir: &Path) -> Result<BTreeMap<String, ConfigResults>> {
    let mut results = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let config_name = entry.file_name().to_string_lossy().into_owned();
        let data = fs::read_to_string(entry.path())?;
        results.insert(config_name, serde_json::from_str(&data)?);
    }
    Ok(results)
}

/// Load one config's results. `None` when the file does not exist yet.
pub fn load_single_result(dir: &Path, config_name: &str) -> Result<Option<ConfigResults>> {
    let path = dir.join(config_name);
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&data)?))
}

/// Whether a (config, model) pairing already has a recorded run on disk.
pub fn has_result(dir: &Path, config_name: &str, model: &str) -> Result<bool> {
    match load_single_result(dir, config_name)? {
        Some(results) => Ok(results.results.iter().any(|run| run.model == model)),
        None => Ok(false),
    }
}

/// Write one config's results, merging with any existing file.
///
/// Unless `overwrite` is set, runs already on disk are kept and the new runs
/// are appended after them.
pub fn write_result(
    dir: &Path,
    config_name: &str,
    results: &ConfigResults,
    overwrite: bool,
) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(config_name);
    let to_write = if !overwrite {
        match load_single_result(dir, config_name)? {
            Some(mut existing) => {
                existing.results.extend(results.results.iter().cloned());
                existing
            }
            None => results.clone(),
        }
    } else {
        results.clone()
    };
    debug!(config = config_name, runs = to_write.results.len(), "writing results");
    fs::write(path, serde_json::to_string(&to_write)?)?;
    Ok(())
}

/// Load benchmark data files (list sets without responses) under `dir`
/// matching `{name}_{mode}_{version}_`, keyed by config name.
pub fn load_benchmark_data(
    dir: &Path,
    name: &str,
    mode: &str,
    version: &str,
) -> Result<BTreeMap<String, ListSet>> {
    let mut configs = BTreeMap::new();
    for config_name in fetch_config_names(dir, name, mode, version)? {
        let data = fs::read_to_string(dir.join(&config_name))?;
        configs.insert(config_name, serde_json::from_str(&data)?);
    }
    Ok(configs)
}
