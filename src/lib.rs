pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod visualize;

pub use config::{CharacterDictionary, ConfigMap, PipelineOptions};
pub use detection::{DirectionClassifier, TextDetector, TextRecognizer};
pub use error::{LoadError, PipelineError, RegionRejection};
pub use models::{Point, Quad, RawRegion, RecognitionResult};
pub use pipeline::{
    ImageSource, OcrPipeline, ProcessReport, ProcessStats, RegionOutcome, RegionReport,
    SkipReason,
};

#[cfg(feature = "ocrs-backend")]
pub use detection::ocr::OcrsEngine;
