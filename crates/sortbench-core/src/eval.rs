//! Result table builder: turns stored responses into score rows.
//!
//! Walks the nested result structure (config → model run → list), runs the
//! lenient parser and the metrics over every response, and aggregates one
//! [`ScoreRow`] per (config, model, list) triple. All per-response failures
//! are data, not errors: an unscoreable response produces a row with absent
//! metrics, and only a malformed config name skips a config entirely.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::error::{Result, SortBenchError};
use crate::metrics::{
    count_additional_items, count_missing_items, count_unordered_neighbors, count_unordered_pairs,
};
use crate::parser::parse_response;
use crate::score::{
    combined_score, faithfulness_score, normalize_counts, sorting_score, validity_score,
    RawCounts, ResponseFlags,
};
use crate::store::ConfigResults;
use crate::value::Scalar;

/// Identifying fields decoded from a config name.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigKey {
    pub benchmark: String,
    pub mode: String,
    pub version: String,
    pub data_type: String,
    pub size: u64,
}

impl ConfigKey {
    /// Decode `{name}_{mode}_{version}_{type}_{size}[.ext]`.
    ///
    /// The type field may itself contain underscores (`number_string`), so
    /// the size is taken from the last field and the middle fields rejoin
    /// as the type.
    pub fn parse(config_name: &str) -> Result<Self> {
        let parts: Vec<&str> = config_name.split('_').collect();
        if parts.len() < 5 {
            return Err(SortBenchError::MalformedConfigName(config_name.to_string()));
        }
        let size_field = parts[parts.len() - 1]
            .split('.')
            .next()
            .unwrap_or_default();
        let size = size_field
            .parse::<u64>()
            .map_err(|_| SortBenchError::MalformedConfigName(config_name.to_string()))?;
        Ok(ConfigKey {
            benchmark: parts[0].to_string(),
            mode: parts[1].to_string(),
            version: parts[2].to_string(),
            data_type: parts[3..parts.len() - 1].join("_"),
            size,
        })
    }
}

/// One fully evaluated (config, model, list) record.
///
/// Serde renames double as the CSV header row.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreRow {
    #[serde(rename = "Benchmark")]
    pub benchmark: String,
    #[serde(rename = "Mode")]
    pub mode: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Type")]
    pub data_type: String,
    #[serde(rename = "Size")]
    pub size: u64,
    #[serde(rename = "List Name")]
    pub list_name: String,
    #[serde(rename = "Unordered Pairs Before")]
    pub unordered_pairs_before: Option<u64>,
    #[serde(rename = "Unordered Pairs After")]
    pub unordered_pairs_after: Option<u64>,
    #[serde(rename = "Unordered Neighbors Before")]
    pub unordered_neighbors_before: Option<u64>,
    #[serde(rename = "Unordered Neighbors After")]
    pub unordered_neighbors_after: Option<u64>,
    #[serde(rename = "Missing Items")]
    pub missing_items: Option<u64>,
    #[serde(rename = "Additional Items")]
    pub additional_items: Option<u64>,
    #[serde(rename = "Length Difference")]
    pub length_difference: Option<i64>,
    #[serde(rename = "Parsed")]
    pub parsed: bool,
    #[serde(rename = "Cropped")]
    pub cropped: bool,
    #[serde(rename = "IsList")]
    pub is_list: bool,
    #[serde(rename = "HasEllipsis")]
    pub has_ellipsis: bool,
    #[serde(rename = "Unordered Pairs (%)")]
    pub unordered_pairs_pct: Option<f64>,
    #[serde(rename = "Unordered Neighbors (%)")]
    pub unordered_neighbors_pct: Option<f64>,
    #[serde(rename = "Missing Items (%)")]
    pub missing_items_pct: Option<f64>,
    #[serde(rename = "Additional Items (%)")]
    pub additional_items_pct: Option<f64>,
    #[serde(rename = "Absolute Length Difference (%)")]
    pub abs_length_difference_pct: Option<f64>,
    #[serde(rename = "Validity Score")]
    pub validity_score: f64,
    #[serde(rename = "Sorting Score")]
    pub sorting_score: Option<f64>,
    #[serde(rename = "Faithfulness Score")]
    pub faithfulness_score: Option<f64>,
    #[serde(rename = "Score")]
    pub score: Option<f64>,
}

/// Evaluate every stored config into score rows.
///
/// A config with a malformed name is skipped with a warning; the run
/// continues with the remaining configs.
pub fn evaluate_all(results: &BTreeMap<String, ConfigResults>) -> Vec<ScoreRow> {
    let mut rows = Vec::new();
    for (config_name, config_results) in results {
        match evaluate_config(config_name, config_results) {
            Ok(mut config_rows) => rows.append(&mut config_rows),
            Err(e) => warn!(config = config_name, error = %e, "skipping config"),
        }
    }
    rows
}

/// Evaluate one config's recorded runs into score rows.
pub fn evaluate_config(config_name: &str, results: &ConfigResults) -> Result<Vec<ScoreRow>> {
    let key = ConfigKey::parse(config_name)?;
    let mut rows = Vec::new();
    for run in &results.results {
        for (list_name, response) in &run.sorted_lists {
            let Some(unsorted) = results.unsorted_lists.get(list_name) else {
                warn!(config = config_name, list = list_name, "response without ground truth");
                continue;
            };
            rows.push(evaluate_response(&key, &run.model, list_name, unsorted, response));
        }
    }
    Ok(rows)
}

/// Score a single raw response against its ground-truth list.
pub fn evaluate_response(
    key: &ConfigKey,
    model: &str,
    list_name: &str,
    unsorted: &[Scalar],
    response: &str,
) -> ScoreRow {
    let outcome = parse_response(response);

    // A value that is not a flat scalar sequence, or that fails comparison,
    // is unscoreable and counts as not parsed.
    let counts = outcome
        .value
        .as_ref()
        .and_then(|lit| lit.as_scalar_items())
        .and_then(|items| compute_counts(unsorted, &items).ok());

    let flags = ResponseFlags {
        parsed: counts.is_some(),
        cropped: outcome.cropped,
        is_list: outcome.is_list,
        has_ellipsis: outcome.has_ellipsis,
    };
    let validity = validity_score(&flags);

    let rates = counts.as_ref().map(|c| normalize_counts(c, key.size));
    let sorting = rates.as_ref().map(sorting_score);
    let faithfulness = rates.as_ref().map(faithfulness_score);
    let score = match (sorting, faithfulness) {
        (Some(s), Some(f)) => Some(combined_score(validity, s, f)),
        _ => None,
    };

    ScoreRow {
        benchmark: key.benchmark.clone(),
        mode: key.mode.clone(),
        version: key.version.clone(),
        model: model.to_string(),
        data_type: key.data_type.clone(),
        size: key.size,
        list_name: list_name.to_string(),
        unordered_pairs_before: counts.as_ref().map(|c| c.unordered_pairs_before),
        unordered_pairs_after: counts.as_ref().map(|c| c.unordered_pairs_after),
        unordered_neighbors_before: counts.as_ref().map(|c| c.unordered_neighbors_before),
        unordered_neighbors_after: counts.as_ref().map(|c| c.unordered_neighbors_after),
        missing_items: counts.as_ref().map(|c| c.missing_items),
        additional_items: counts.as_ref().map(|c| c.additional_items),
        length_difference: counts.as_ref().map(|c| c.length_difference),
        parsed: flags.parsed,
        cropped: flags.cropped,
        is_list: flags.is_list,
        has_ellipsis: flags.has_ellipsis,
        unordered_pairs_pct: rates.as_ref().map(|r| r.unordered_pairs),
        unordered_neighbors_pct: rates.as_ref().map(|r| r.unordered_neighbors),
        missing_items_pct: rates.as_ref().map(|r| r.missing_items),
        additional_items_pct: rates.as_ref().map(|r| r.additional_items),
        abs_length_difference_pct: rates.as_ref().map(|r| r.abs_length_difference),
        validity_score: validity,
        sorting_score: sorting,
        faithfulness_score: faithfulness,
        score,
    }
}

fn compute_counts(original: &[Scalar], parsed: &[Scalar]) -> Result<RawCounts> {
    Ok(RawCounts {
        unordered_pairs_before: count_unordered_pairs(original)?,
        unordered_pairs_after: count_unordered_pairs(parsed)?,
        unordered_neighbors_before: count_unordered_neighbors(original)?,
        unordered_neighbors_after: count_unordered_neighbors(parsed)?,
        missing_items: count_missing_items(original, parsed),
        additional_items: count_additional_items(original, parsed),
        length_difference: original.len() as i64 - parsed.len() as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_key_decodes_structured_name() {
        let key = ConfigKey::parse("sortbench_basic_v1.0_integer_16.json").unwrap();
        assert_eq!(
            key,
            ConfigKey {
                benchmark: "sortbench".to_string(),
                mode: "basic".to_string(),
                version: "v1.0".to_string(),
                data_type: "integer".to_string(),
                size: 16,
            }
        );
    }

    #[test]
    fn config_key_without_extension() {
        let key = ConfigKey::parse("sortbench_advanced_v2.1_word_1024").unwrap();
        assert_eq!(key.size, 1024);
        assert_eq!(key.mode, "advanced");
    }

    #[test]
    fn config_key_with_underscored_type() {
        // Advanced-mode types carry underscores of their own.
        let key = ConfigKey::parse("sortbench_advanced_v1.0_number_string_2.json").unwrap();
        assert_eq!(key.data_type, "number_string");
        assert_eq!(key.size, 2);

        let key = ConfigKey::parse("sortbench_advanced_v1.0_prefix_words_512.json").unwrap();
        assert_eq!(key.data_type, "prefix_words");
        assert_eq!(key.size, 512);
    }

    #[test]
    fn malformed_config_names_error() {
        assert!(ConfigKey::parse("sortbench_basic_v1.0").is_err());
        assert!(ConfigKey::parse("sortbench_basic_v1.0_integer_big.json").is_err());
        assert!(ConfigKey::parse("").is_err());
    }

    fn key() -> ConfigKey {
        ConfigKey {
            benchmark: "sortbench".to_string(),
            mode: "basic".to_string(),
            version: "v1.0".to_string(),
            data_type: "integer".to_string(),
            size: 4,
        }
    }

    fn ints(values: &[i64]) -> Vec<Scalar> {
        values.iter().map(|&n| Scalar::Int(n)).collect()
    }

    #[test]
    fn perfect_response_row() {
        let row = evaluate_response(&key(), "m", "list_0", &ints(&[3, 1, 4, 2]), "[1, 2, 3, 4]");
        assert!(row.parsed);
        assert_eq!(row.unordered_pairs_after, Some(0));
        assert_eq!(row.unordered_pairs_before, Some(3));
        assert_eq!(row.missing_items, Some(0));
        assert_eq!(row.additional_items, Some(0));
        assert_eq!(row.length_difference, Some(0));
        assert_eq!(row.validity_score, 1.0);
        assert_eq!(row.score, Some(1.0));
    }

    #[test]
    fn unparseable_response_row_has_absent_metrics() {
        let row = evaluate_response(&key(), "m", "list_0", &ints(&[3, 1, 4, 2]), "I cannot sort");
        assert!(!row.parsed);
        assert_eq!(row.unordered_pairs_after, None);
        assert_eq!(row.missing_items, None);
        assert_eq!(row.score, None);
        assert_eq!(row.validity_score, 0.0);
    }

    #[test]
    fn comparison_failure_counts_as_unparsed() {
        // Parses fine, but the items cannot be compared with each other.
        let row = evaluate_response(&key(), "m", "list_0", &ints(&[2, 1]), "[1, 'a']");
        assert!(!row.parsed);
        assert_eq!(row.score, None);
        assert_eq!(row.validity_score, 0.0);
    }

    #[test]
    fn cropped_response_scores_half_validity() {
        let row = evaluate_response(&key(), "m", "list_0", &ints(&[3, 1, 4, 2]), "[1, 2, 3, 4");
        assert!(row.parsed);
        assert!(row.cropped);
        assert_eq!(row.validity_score, 0.5);
        // One item was lost to cropping.
        assert_eq!(row.length_difference, Some(1));
        assert_eq!(row.missing_items, Some(1));
    }

    #[test]
    fn evaluate_all_skips_malformed_configs() {
        let mut results = BTreeMap::new();
        let mut unsorted_lists = BTreeMap::new();
        unsorted_lists.insert("list_0".to_string(), ints(&[2, 1]));
        let mut sorted_lists = BTreeMap::new();
        sorted_lists.insert("list_0".to_string(), "[1, 2]".to_string());
        let config = ConfigResults {
            unsorted_lists,
            results: vec![crate::store::ModelRun {
                model: "m".to_string(),
                sorted_lists,
            }],
        };
        results.insert("badname.json".to_string(), config.clone());
        results.insert("sortbench_basic_v1.0_integer_2.json".to_string(), config);

        let rows = evaluate_all(&results);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].benchmark, "sortbench");
    }

    #[test]
    fn rows_cover_each_model_and_list() {
        let mut unsorted_lists = BTreeMap::new();
        unsorted_lists.insert("list_0".to_string(), ints(&[2, 1]));
        unsorted_lists.insert("list_1".to_string(), ints(&[4, 3]));
        let runs = ["model-a", "model-b"]
            .iter()
            .map(|m| {
                let mut sorted_lists = BTreeMap::new();
                sorted_lists.insert("list_0".to_string(), "[1, 2]".to_string());
                sorted_lists.insert("list_1".to_string(), "[3, 4]".to_string());
                crate::store::ModelRun {
                    model: m.to_string(),
                    sorted_lists,
                }
            })
            .collect();
        let config = ConfigResults {
            unsorted_lists,
            results: runs,
        };
        let rows = evaluate_config("sortbench_basic_v1.0_integer_2.json", &config).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].model, "model-a");
        assert_eq!(rows[0].list_name, "list_0");
        assert_eq!(rows[3].model, "model-b");
        assert_eq!(rows[3].list_name, "list_1");
    }
}
