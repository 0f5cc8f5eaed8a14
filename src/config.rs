//! Lookup tables loaded once per pipeline lifetime.
//!
//! - [`ConfigMap`]: numeric options read from `<key> <value>` lines
//! - [`CharacterDictionary`]: ordered symbol table for decoding recognizer output
//! - [`PipelineOptions`]: thresholds and size limits used by the orchestrator

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// Key enabling the direction classifier when its value is >= 1
pub const USE_DIRECTION_CLASSIFY: &str = "use_direction_classify";

/// Option name to floating-point value, read-only after loading
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMap {
    values: HashMap<String, f64>,
}

impl ConfigMap {
    /// Load from a text file with one `<key> <value>` pair per line.
    ///
    /// Whitespace-only lines are skipped. Every other line must split on its
    /// first whitespace run into a key and a number, otherwise loading fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_with_origin(&text, path)
    }

    /// Parse config text that did not come from a file
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        Self::parse_with_origin(text, Path::new("<inline>"))
    }

    fn parse_with_origin(text: &str, origin: &Path) -> Result<Self, LoadError> {
        let mut values = HashMap::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let malformed = || LoadError::ConfigLine {
                path: origin.to_path_buf(),
                line: idx + 1,
                content: raw.to_string(),
            };

            let (key, value) = line.split_once(char::is_whitespace).ok_or_else(malformed)?;
            let value: f64 = value.trim().parse().map_err(|_| malformed())?;
            values.insert(key.to_string(), value);
        }

        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Direction classification flag, 0 when absent
    pub fn use_direction_classify(&self) -> bool {
        self.get_or(USE_DIRECTION_CLASSIFY, 0.0) as i64 >= 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Ordered symbol table for CTC-style decoding.
///
/// Index 0 is always the reserved blank symbol and the last entry is always a
/// literal space. Order is fixed at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDictionary {
    symbols: Vec<String>,
}

impl CharacterDictionary {
    pub const BLANK: &'static str = "#";
    pub const SPACE: &'static str = " ";

    /// Load one symbol per line, in file order
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::DictionaryIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_symbols(text.lines()))
    }

    /// Build from raw symbols, adding the blank and trailing space entries
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = vec![Self::BLANK.to_string()];
        table.extend(symbols.into_iter().map(Into::into));
        table.push(Self::SPACE.to_string());
        Self { symbols: table }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(String::as_str)
    }

    pub fn blank_index(&self) -> usize {
        0
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Never true: blank and space are always present
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

/// Thresholds and limits applied by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Confidence threshold handed to the direction classifier
    pub classify_threshold: f32,
    /// Candidates must score strictly above this to be kept
    pub min_score: f32,
    /// Rectified crops narrower or shorter than this are skipped
    pub min_crop_side: u32,
    /// File sources smaller than this on either axis are rejected
    pub min_source_side: u32,
    /// File sources larger than this on either axis are rejected
    pub max_source_side: u32,
    /// Working resolution for live frames
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            classify_threshold: 0.9,
            min_score: 0.1,
            min_crop_side: 4,
            min_source_side: 10,
            max_source_side: 4000,
            frame_width: 448,
            frame_height: 448,
        }
    }
}

impl PipelineOptions {
    /// Load options from a TOML file; missing fields keep their defaults
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let options_error = |reason: String| LoadError::Options {
            path: PathBuf::from(path),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| options_error(e.to_string()))?;
        toml::from_str(&text).map_err(|e| options_error(e.to_string()))
    }
}
