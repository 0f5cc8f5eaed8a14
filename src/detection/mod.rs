pub mod ctc;
#[cfg(feature = "ocrs-backend")]
pub mod ocr;
pub mod preprocessing;
pub mod rectify;
pub mod validate;

use image::RgbImage;

use crate::config::{CharacterDictionary, ConfigMap};
use crate::models::{RawRegion, RecognitionResult};

pub use rectify::rectify;
pub use validate::validate;

/// Locates candidate text regions in a 3-channel working image.
///
/// Regions are returned in detection order and are not validated; the
/// orchestrator checks each one against the image bounds before use.
pub trait TextDetector: Send + Sync {
    fn detect(&self, image: &RgbImage, config: &ConfigMap) -> anyhow::Result<Vec<RawRegion>>;

    /// Human-readable backend name (used in logs)
    fn name(&self) -> &str;
}

/// Corrects upside-down crops before recognition.
///
/// Returns the crop rotated when the classifier is confident above
/// `threshold` that it is flipped, otherwise an unchanged copy.
pub trait DirectionClassifier: Send + Sync {
    fn classify(&self, crop: &RgbImage, threshold: f32) -> anyhow::Result<RgbImage>;

    fn name(&self) -> &str;
}

/// Decodes the text of a single upright crop
pub trait TextRecognizer: Send + Sync {
    fn recognize(
        &self,
        crop: &RgbImage,
        dictionary: &CharacterDictionary,
    ) -> anyhow::Result<RecognitionResult>;

    fn name(&self) -> &str;
}
