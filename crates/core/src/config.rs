//! Configuration system for the cache hierarchy.
//!
//! This module defines the descriptions a hierarchy is built from. It provides:
//! 1. **Defaults:** Baseline level geometry used when a field is omitted.
//! 2. **Structures:** `HierarchyConfig`, an ordered list of `LevelConfig` (top level first).
//! 3. **Enums:** Replacement policy selection.
//! 4. **Loaders:** JSON (serde) and the line-oriented `cachedef` text form.
//! 5. **Validation:** Geometry checks that must pass before a hierarchy is built.
//!
//! # JSON form
//!
//! ```json
//! { "levels": [
//!     { "name": "L1", "line_bytes": 64, "sets": 64, "ways": 8 },
//!     { "name": "L2", "line_bytes": 64, "sets": 1024, "ways": 16, "policy": "PLRU" }
//! ] }
//! ```
//!
//! # cachedef form
//!
//! ```text
//! # number of levels, then one `name line_bytes sets ways [policy]` per level
//! 2
//! L1 64 64 8
//! L2 64 1024 16 plru
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::error::{BuildError, ConfigError};

/// Default values for omitted level fields.
mod defaults {
    /// Default line size in bytes (64 bytes).
    ///
    /// Matches typical modern processor line sizes and DRAM burst length.
    pub const LINE_BYTES: u64 = 64;

    /// Default number of sets (64 sets, a 32 KiB 8-way level with 64-byte lines).
    pub const SETS: u64 = 64;

    /// Default associativity (8 ways).
    pub const WAYS: usize = 8;

    /// Largest number of lines (`sets × ways`) a single level may hold.
    pub const MAX_LINES: u64 = 1 << 40;
}

/// Cache replacement policy types.
///
/// Specifies the algorithm used to select which line to evict when a new
/// line must be installed in a set with no invalid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Least Recently Used replacement policy.
    ///
    /// Evicts the line that was accessed least recently.
    #[default]
    #[serde(alias = "Lru", alias = "lru")]
    Lru,
    /// Pseudo-LRU (tree-based) replacement policy.
    ///
    /// Approximates LRU with one decision bit per internal tree node.
    #[serde(alias = "Plru", alias = "plru")]
    Plru,
    /// First In First Out replacement policy.
    ///
    /// Evicts the line that was installed earliest, regardless of hits.
    #[serde(alias = "Fifo", alias = "fifo")]
    Fifo,
    /// Random replacement policy.
    ///
    /// Evicts a pseudo-randomly selected line from the set.
    #[serde(alias = "Random", alias = "random")]
    Random,
    /// Most Recently Used replacement policy.
    ///
    /// Evicts the line that was accessed most recently.
    #[serde(alias = "Mru", alias = "mru")]
    Mru,
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lru => "LRU",
            Self::Plru => "PLRU",
            Self::Fifo => "FIFO",
            Self::Random => "RANDOM",
            Self::Mru => "MRU",
        };
        f.write_str(name)
    }
}

impl FromStr for ReplacementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LRU" => Ok(Self::Lru),
            "PLRU" => Ok(Self::Plru),
            "FIFO" => Ok(Self::Fifo),
            "RANDOM" => Ok(Self::Random),
            "MRU" => Ok(Self::Mru),
            _ => Err(format!("unknown replacement policy `{s}`")),
        }
    }
}

/// Geometry of one cache level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LevelConfig {
    /// Name printed in reports (e.g. `"L1"`).
    pub name: String,

    /// Line size in bytes; must be a power of two.
    #[serde(
        default = "LevelConfig::default_line",
        alias = "line_size",
        alias = "lineSizeBytes"
    )]
    pub line_bytes: u64,

    /// Number of sets; must be a power of two.
    #[serde(
        default = "LevelConfig::default_sets",
        alias = "num_sets",
        alias = "numSets"
    )]
    pub sets: u64,

    /// Associativity (lines per set); at least 1.
    #[serde(default = "LevelConfig::default_ways", alias = "associativity")]
    pub ways: usize,

    /// Victim selection policy for full sets.
    #[serde(default)]
    pub policy: ReplacementPolicy,
}

impl LevelConfig {
    /// Creates an LRU level description.
    ///
    /// # Arguments
    ///
    /// * `name` - Level name used in reports.
    /// * `line_bytes` - Line size in bytes.
    /// * `sets` - Number of sets.
    /// * `ways` - Associativity.
    pub fn new(name: impl Into<String>, line_bytes: u64, sets: u64, ways: usize) -> Self {
        Self {
            name: name.into(),
            line_bytes,
            sets,
            ways,
            policy: ReplacementPolicy::default(),
        }
    }

    /// Returns this description with a different replacement policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ReplacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Total capacity in bytes (`line_bytes * sets * ways`), saturating.
    pub fn capacity_bytes(&self) -> u64 {
        self.line_bytes
            .saturating_mul(self.sets)
            .saturating_mul(self.ways as u64)
    }

    /// Checks the level's geometry.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: line size and set count must be
    /// powers of two, associativity at least 1, PLRU needs a power-of-two
    /// associativity, and the level may hold at most 2^40 lines.
    pub fn validate(&self) -> Result<(), BuildError> {
        if !self.line_bytes.is_power_of_two() {
            return Err(BuildError::LineSizeNotPowerOfTwo {
                level: self.name.clone(),
                value: self.line_bytes,
            });
        }
        if !self.sets.is_power_of_two() {
            return Err(BuildError::SetCountNotPowerOfTwo {
                level: self.name.clone(),
                value: self.sets,
            });
        }
        if self.ways == 0 {
            return Err(BuildError::ZeroAssociativity {
                level: self.name.clone(),
            });
        }
        if self.policy == ReplacementPolicy::Plru && !self.ways.is_power_of_two() {
            return Err(BuildError::PolicyGeometry {
                level: self.name.clone(),
                policy: self.policy,
                ways: self.ways,
            });
        }
        let lines = u64::try_from(self.ways)
            .ok()
            .and_then(|ways| self.sets.checked_mul(ways))
            .filter(|&lines| lines <= defaults::MAX_LINES && usize::try_from(lines).is_ok());
        if lines.is_none() {
            return Err(BuildError::GeometryTooLarge {
                level: self.name.clone(),
                sets: self.sets,
                ways: self.ways,
            });
        }
        Ok(())
    }

    /// Returns the default line size in bytes.
    fn default_line() -> u64 {
        defaults::LINE_BYTES
    }

    /// Returns the default number of sets.
    fn default_sets() -> u64 {
        defaults::SETS
    }

    /// Returns the default associativity.
    fn default_ways() -> usize {
        defaults::WAYS
    }
}

/// Ordered description of a hierarchy, closest-to-core level first.
///
/// The last level forwards to nothing: its misses and write-backs are absorbed
/// by the unsimulated backing store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HierarchyConfig {
    /// Levels from top (first probed) to bottom.
    pub levels: Vec<LevelConfig>,
}

impl HierarchyConfig {
    /// Creates a description from an ordered list of levels.
    pub fn new(levels: Vec<LevelConfig>) -> Self {
        Self { levels }
    }

    /// Checks every level and the list itself.
    ///
    /// # Errors
    ///
    /// [`BuildError::EmptyHierarchy`] for an empty list, otherwise the first
    /// level error in top-to-bottom order.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.levels.is_empty() {
            return Err(BuildError::EmptyHierarchy);
        }
        self.levels.iter().try_for_each(LevelConfig::validate)
    }

    /// Parses the JSON form and validates it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] for malformed input, [`ConfigError::Build`] for
    /// an invalid hierarchy.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses the `cachedef` text form and validates it.
    ///
    /// Lines starting with `#` and blank lines are skipped. The first
    /// remaining line holds the level count; each following line describes
    /// one level as `name line_bytes sets ways [policy]`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] with the offending line number, or
    /// [`ConfigError::Build`] for an invalid hierarchy.
    pub fn from_cachedef_str(text: &str) -> Result<Self, ConfigError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let Some((count_line, count_text)) = lines.next() else {
            return Err(ConfigError::Parse {
                line: 0,
                message: "missing level count".to_string(),
            });
        };
        let count: usize = count_text.parse().map_err(|_| ConfigError::Parse {
            line: count_line,
            message: format!("expected level count, found `{count_text}`"),
        })?;

        let mut levels = Vec::new();
        for (line, text) in lines.by_ref().take(count) {
            levels.push(parse_cachedef_level(line, text)?);
        }
        if levels.len() < count {
            return Err(ConfigError::Parse {
                line: count_line,
                message: format!("declares {count} levels but describes {}", levels.len()),
            });
        }
        if let Some((line, _)) = lines.next() {
            return Err(ConfigError::Parse {
                line,
                message: format!("more level lines than the declared {count}"),
            });
        }

        let config = Self { levels };
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a description file.
    ///
    /// Files with a `.json` extension use the JSON form; anything else is
    /// read as `cachedef` text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise whatever the
    /// selected parser reports.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_cachedef_str(&text)
        }
    }
}

/// Parses one `name line_bytes sets ways [policy]` cachedef line.
fn parse_cachedef_level(line: usize, text: &str) -> Result<LevelConfig, ConfigError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let parse_err = |message: String| ConfigError::Parse { line, message };

    let [name, line_bytes, sets, ways, rest @ ..] = fields.as_slice() else {
        return Err(parse_err(format!(
            "expected `name line_bytes sets ways [policy]`, found `{text}`"
        )));
    };
    let number = |field: &str, what: &str| -> Result<u64, ConfigError> {
        field
            .parse::<u64>()
            .map_err(|_| parse_err(format!("{what} `{field}` is not a number")))
    };

    let mut level = LevelConfig::new(
        *name,
        number(*line_bytes, "line size")?,
        number(*sets, "set count")?,
        number(*ways, "associativity")? as usize,
    );
    match rest {
        [] => {}
        [policy] => level.policy = policy.parse::<ReplacementPolicy>().map_err(parse_err)?,
        _ => return Err(parse_err(format!("trailing fields in `{text}`"))),
    }
    Ok(level)
}
