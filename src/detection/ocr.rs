use image::RgbImage;
use ocrs::{ImageSource, OcrEngine};
use ocrs::OcrEngineParams;
use rten::Model;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{CharacterDictionary, ConfigMap};
use crate::detection::{TextDetector, TextRecognizer};
use crate::models::{RawRegion, RecognitionResult};

/// ocrs reports no per-line score, so recognized text gets this fixed confidence
pub const NOMINAL_CONFIDENCE: f32 = 0.9;

pub const DETECTION_MODEL_FILE: &str = "text-detection.rten";
pub const RECOGNITION_MODEL_FILE: &str = "text-recognition.rten";

/// Standard ocrs model cache location (`~/.cache/ocrs`)
pub fn default_model_dir() -> anyhow::Result<PathBuf> {
    let home_dir = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
    Ok(Path::new(&home_dir).join(".cache/ocrs"))
}

/// Detector and recognizer backed by the ocrs engine.
///
/// Detection reports one axis-aligned quad per text line. Recognition runs
/// the engine on the crop alone and uses its built-in alphabet, so the
/// character dictionary passed in is not consulted.
pub struct OcrsEngine {
    engine: OcrEngine,
}

impl OcrsEngine {
    /// Load both models from `model_dir`
    pub fn from_model_dir(model_dir: &Path) -> anyhow::Result<Self> {
        let detection_model_path = model_dir.join(DETECTION_MODEL_FILE);
        let recognition_model_path = model_dir.join(RECOGNITION_MODEL_FILE);

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            anyhow::bail!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            );
        }

        let detection_model = Model::load_file(&detection_model_path)?;
        let recognition_model = Model::load_file(&recognition_model_path)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })?;

        Ok(Self { engine })
    }

    pub fn from_default_location() -> anyhow::Result<Self> {
        Self::from_model_dir(&default_model_dir()?)
    }
}

impl TextDetector for OcrsEngine {
    fn detect(&self, image: &RgbImage, _config: &ConfigMap) -> anyhow::Result<Vec<RawRegion>> {
        let source = ImageSource::from_bytes(image.as_raw(), image.dimensions())
            .map_err(|e| anyhow::anyhow!("Invalid image buffer: {:?}", e))?;
        let input = self.engine.prepare_input(source)?;

        let words = self.engine.detect_words(&input)?;
        let lines = self.engine.find_text_lines(&input, &words);
        debug!(words = words.len(), lines = lines.len(), "ocrs detection");

        let max_x = image.width().saturating_sub(1) as f32;
        let max_y = image.height().saturating_sub(1) as f32;

        let mut regions = Vec::with_capacity(lines.len());
        for line in &lines {
            let mut min = (f32::INFINITY, f32::INFINITY);
            let mut max = (f32::NEG_INFINITY, f32::NEG_INFINITY);
            for word in line {
                for corner in word.corners() {
                    min = (min.0.min(corner.x), min.1.min(corner.y));
                    max = (max.0.max(corner.x), max.1.max(corner.y));
                }
            }
            if !min.0.is_finite() || !max.0.is_finite() {
                continue;
            }

            let left = min.0.clamp(0.0, max_x).round() as i32;
            let top = min.1.clamp(0.0, max_y).round() as i32;
            let right = max.0.clamp(0.0, max_x).round() as i32;
            let bottom = max.1.clamp(0.0, max_y).round() as i32;

            regions.push(RawRegion::from_corners([
                (left, top),
                (right, top),
                (right, bottom),
                (left, bottom),
            ]));
        }

        Ok(regions)
    }

    fn name(&self) -> &str {
        "ocrs"
    }
}

impl TextRecognizer for OcrsEngine {
    fn recognize(
        &self,
        crop: &RgbImage,
        _dictionary: &CharacterDictionary,
    ) -> anyhow::Result<RecognitionResult> {
        let source = ImageSource::from_bytes(crop.as_raw(), crop.dimensions())
            .map_err(|e| anyhow::anyhow!("Invalid crop buffer: {:?}", e))?;
        let input = self.engine.prepare_input(source)?;

        let text = self.engine.get_text(&input)?;
        let text = text.trim().to_string();

        Ok(RecognitionResult::new(text, NOMINAL_CONFIDENCE))
    }

    fn name(&self) -> &str {
        "ocrs"
    }
}
