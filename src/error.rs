// Error taxonomy for the OCR pipeline.
//
// Region-level problems are recovered inside the per-region loop and never
// leave it. Image-level problems abort a single `process` call. Load errors
// abort pipeline construction.

use std::path::PathBuf;
use thiserror::Error;

/// Why a detected region was rejected before rectification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionRejection {
    #[error("expected 4 points, got {0}")]
    WrongPointCount(usize),

    #[error("point {point} has {len} coordinates, expected 2")]
    WrongCoordinateCount { point: usize, len: usize },

    #[error("point {point} at ({x}, {y}) lies outside the {width}x{height} image")]
    OutOfBounds {
        point: usize,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}

/// Failures that abort a whole `process` call
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load source image {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("invalid source image dimensions: {width}x{height} (allowed {min}..={max} per side)")]
    InvalidSourceSize {
        width: u32,
        height: u32,
        min: u32,
        max: u32,
    },

    #[error("text detection failed: {0}")]
    Detection(String),
}

/// Failures while building the pipeline's lookup tables
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config line {line} in {path}: {content:?}")]
    ConfigLine {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("failed to read dictionary file {path}: {source}")]
    DictionaryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read pipeline options {path}: {reason}")]
    Options { path: PathBuf, reason: String },
}
