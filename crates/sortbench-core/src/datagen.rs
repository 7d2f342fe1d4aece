//! Synthetic benchmark data generation.
//!
//! Basic mode covers plain integers, floats, random strings, and dictionary
//! words. Advanced mode covers the adversarial types: numbers written as
//! strings (so they sort lexicographically), strings with long repeated
//! prefixes, and word pairs sharing a small prefix pool.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::error::Result;
use crate::store::ListSet;
use crate::value::Scalar;

/// Benchmark mode, selecting which data types are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Basic,
    Advanced,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Basic => "basic",
            Mode::Advanced => "advanced",
        }
    }

    /// The data types generated for this mode.
    pub fn data_types(&self) -> &'static [DataType] {
        match self {
            Mode::Basic => &[
                DataType::Integer,
                DataType::Float,
                DataType::String,
                DataType::Word,
            ],
            Mode::Advanced => &[
                DataType::NumberString,
                DataType::PrefixString,
                DataType::PrefixWords,
            ],
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Mode::Basic),
            "advanced" => Ok(Mode::Advanced),
            other => Err(format!("mode must be 'basic' or 'advanced', got '{other}'")),
        }
    }
}

/// Element type of a generated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Float,
    String,
    Word,
    NumberString,
    PrefixString,
    PrefixWords,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::String => "string",
            DataType::Word => "word",
            DataType::NumberString => "number_string",
            DataType::PrefixString => "prefix_string",
            DataType::PrefixWords => "prefix_words",
        };
        write!(f, "{}", name)
    }
}

/// Generation options; defaults match the shipped benchmark sets.
#[derive(Debug, Clone, Copy)]
pub struct GenOptions {
    pub min_value: i64,
    pub max_value: i64,
    /// Emit each value twice, adjacently.
    pub duplicates: bool,
    /// Return the list already sorted.
    pub sorted: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            min_value: 0,
            max_value: 1000,
            duplicates: false,
            sorted: false,
        }
    }
}

const WORDS: &[&str] = &[
    "apple", "anchor", "autumn", "basket", "bridge", "candle", "canyon", "cellar", "copper",
    "dragon", "desert", "ember", "engine", "falcon", "forest", "garden", "glacier", "hammer",
    "harbor", "island", "jungle", "kettle", "ladder", "lantern", "marble", "meadow", "needle",
    "nectar", "orchard", "oyster", "pebble", "pillar", "quartz", "quiver", "ribbon", "river",
    "saddle", "shadow", "timber", "tunnel", "umbrella", "valley", "velvet", "walnut", "willow",
    "yonder", "zephyr",
];

// Prefixes for prefix_words; kept small so many items collide on them.
const PREFIXES: &[&str] = &["north", "south", "east", "west"];

/// Generate one unsorted list of `len` elements of the given type.
pub fn generate_unsorted_list(
    rng: &mut impl Rng,
    len: usize,
    data_type: DataType,
    opts: &GenOptions,
) -> Vec<Scalar> {
    let unique = if opts.duplicates { len.div_ceil(2) } else { len };
    let mut values: Vec<Scalar> = (0..unique)
        .map(|_| generate_value(rng, data_type, opts))
        .collect();

    if opts.duplicates {
        values = values
            .into_iter()
            .flat_map(|v| [v.clone(), v])
            .take(len)
            .collect();
    }

    if opts.sorted {
        values.sort_by(|a, b| a.try_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    }

    values
}

fn generate_value(rng: &mut impl Rng, data_type: DataType, opts: &GenOptions) -> Scalar {
    match data_type {
        DataType::Integer => Scalar::Int(rng.gen_range(opts.min_value..=opts.max_value)),
        DataType::Float => {
            Scalar::Float(rng.gen_range(opts.min_value as f64..=opts.max_value as f64))
        }
        DataType::String => Scalar::Str(random_string(rng, 3, 10)),
        DataType::Word => Scalar::Str(pick(rng, WORDS)),
        DataType::NumberString => {
            Scalar::Str(rng.gen_range(opts.min_value..=opts.max_value).to_string())
        }
        DataType::PrefixString => {
            let c = random_lowercase(rng);
            Scalar::Str(format!("{c}{c}{c}{}", random_string(rng, 2, 7)))
        }
        DataType::PrefixWords => Scalar::Str(format!("{} {}", pick(rng, PREFIXES), pick(rng, WORDS))),
    }
}

fn random_lowercase(rng: &mut impl Rng) -> char {
    (b'a' + rng.gen_range(0..26)) as char
}

fn random_string(rng: &mut impl Rng, min_len: usize, max_len: usize) -> String {
    let len = rng.gen_range(min_len..=max_len);
    (0..len).map(|_| random_lowercase(rng)).collect()
}

fn pick(rng: &mut impl Rng, words: &[&str]) -> String {
    words.choose(rng).copied().unwrap_or_default().to_string()
}

/// The fixed benchmark list sizes: powers of two from 2 to 1024.
pub fn benchmark_sizes() -> Vec<usize> {
    (1..=10).map(|i| 1usize << i).collect()
}

/// Generate a full benchmark data set on disk.
///
/// One JSON file per (type, size) named
/// `{name}_{mode}_{version}_{type}_{size}.json`, each holding `num_lists`
/// lists named `list_0` through `list_{num_lists - 1}`.
pub fn generate_benchmark_data(
    rng: &mut impl Rng,
    dir: &Path,
    name: &str,
    mode: Mode,
    version: &str,
    num_lists: usize,
    sizes: &[usize],
) -> Result<Vec<String>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for &data_type in mode.data_types() {
        for &size in sizes {
            let mut lists: ListSet = BTreeMap::new();
            for i in 0..num_lists {
                let list =
                    generate_unsorted_list(rng, size, data_type, &GenOptions::default());
                lists.insert(format!("list_{i}"), list);
            }
            let config_name =
                format!("{}_{}_{}_{}_{}.json", name, mode.as_str(), version, data_type, size);
            std::fs::write(dir.join(&config_name), serde_json::to_string(&lists)?)?;
            info!(config = %config_name, lists = num_lists, "generated benchmark data");
            written.push(config_name);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn integer_lists_respect_bounds() {
        let opts = GenOptions::default();
        let list = generate_unsorted_list(&mut rng(), 10, DataType::Integer, &opts);
        assert_eq!(list.len(), 10);
        for v in &list {
            match v {
                Scalar::Int(n) => assert!((opts.min_value..=opts.max_value).contains(n)),
                other => panic!("expected integer, got {other:?}"),
            }
        }
    }

    #[test]
    fn float_lists_respect_bounds() {
        let opts = GenOptions::default();
        let list = generate_unsorted_list(&mut rng(), 10, DataType::Float, &opts);
        for v in &list {
            match v {
                Scalar::Float(f) => {
                    assert!((opts.min_value as f64..=opts.max_value as f64).contains(f))
                }
                other => panic!("expected float, got {other:?}"),
            }
        }
    }

    #[test]
    fn string_types_generate_strings() {
        for data_type in [
            DataType::String,
            DataType::Word,
            DataType::NumberString,
            DataType::PrefixWords,
        ] {
            let list =
                generate_unsorted_list(&mut rng(), 10, data_type, &GenOptions::default());
            assert_eq!(list.len(), 10);
            assert!(list.iter().all(|v| matches!(v, Scalar::Str(_))));
        }
    }

    #[test]
    fn prefix_strings_start_with_tripled_char() {
        let list =
            generate_unsorted_list(&mut rng(), 10, DataType::PrefixString, &GenOptions::default());
        for v in &list {
            let Scalar::Str(s) = v else { panic!() };
            let first = s.chars().next().unwrap();
            assert!(s.starts_with(&first.to_string().repeat(3)));
        }
    }

    #[test]
    fn duplicates_come_in_adjacent_pairs() {
        let opts = GenOptions {
            duplicates: true,
            ..GenOptions::default()
        };
        let list = generate_unsorted_list(&mut rng(), 10, DataType::Integer, &opts);
        assert_eq!(list.len(), 10);
        for pair in list.chunks(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }

    #[test]
    fn sorted_option_sorts_ascending() {
        let opts = GenOptions {
            sorted: true,
            ..GenOptions::default()
        };
        let list = generate_unsorted_list(&mut rng(), 10, DataType::Integer, &opts);
        assert_eq!(crate::metrics::count_unordered_pairs(&list).unwrap(), 0);
    }

    #[test]
    fn sizes_are_powers_of_two() {
        assert_eq!(benchmark_sizes().first(), Some(&2));
        assert_eq!(benchmark_sizes().last(), Some(&1024));
        assert_eq!(benchmark_sizes().len(), 10);
    }

    #[test]
    fn generated_files_follow_naming_convention() {
        let dir = tempfile::tempdir().unwrap();
        let written = generate_benchmark_data(
            &mut rng(),
            dir.path(),
            "sortbench",
            Mode::Basic,
            "v1.0",
            2,
            &[2, 4],
        )
        .unwrap();
        assert_eq!(written.len(), 8); // 4 types x 2 sizes
        assert!(written.contains(&"sortbench_basic_v1.0_integer_2.json".to_string()));

        // Every name decodes under the config key convention.
        for name in &written {
            crate::eval::ConfigKey::parse(name).unwrap();
        }

        let configs =
            crate::store::load_benchmark_data(dir.path(), "sortbench", "basic", "v1.0").unwrap();
        assert_eq!(configs.len(), 8);
        let lists = &configs["sortbench_basic_v1.0_integer_2.json"];
        assert_eq!(lists.len(), 2);
        assert_eq!(lists["list_0"].len(), 2);
    }

    #[test]
    fn every_generated_name_decodes_in_both_modes() {
        let dir = tempfile::tempdir().unwrap();
        for mode in [Mode::Basic, Mode::Advanced] {
            let written = generate_benchmark_data(
                &mut rng(),
                dir.path(),
                "sortbench",
                mode,
                "v1.0",
                1,
                &[2, 1024],
            )
            .unwrap();
            for name in &written {
                let key = crate::eval::ConfigKey::parse(name).unwrap();
                assert_eq!(key.benchmark, "sortbench");
                assert_eq!(key.mode, mode.as_str());
                assert!(key.size == 2 || key.size == 1024);
                assert!(
                    mode.data_types().iter().any(|t| t.to_string() == key.data_type),
                    "type {} not decoded for {}",
                    key.data_type,
                    name
                );
            }
        }
    }
}
