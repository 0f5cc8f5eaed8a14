mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from ocrpipe for tests
pub use ocrpipe::{
    CharacterDictionary, ConfigMap, DirectionClassifier, ImageSource, OcrPipeline,
    PipelineOptions, RawRegion, RecognitionResult, RegionOutcome, SkipReason, TextDetector,
    TextRecognizer,
};
