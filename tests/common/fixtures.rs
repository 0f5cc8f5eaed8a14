#![allow(dead_code)]

use image::{ImageBuffer, Rgb, RgbImage, RgbaImage, imageops};
use ocrpipe::detection::ctc::greedy_decode;
use ocrpipe::{
    CharacterDictionary, ConfigMap, DirectionClassifier, OcrPipeline, RawRegion,
    RecognitionResult, TextDetector, TextRecognizer,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Detector that returns the same regions (or the same failure) on every call
pub struct ScriptedDetector {
    regions: Vec<RawRegion>,
    fail: bool,
}

impl ScriptedDetector {
    pub fn new(regions: Vec<RawRegion>) -> Self {
        Self {
            regions,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            regions: Vec::new(),
            fail: true,
        }
    }
}

impl TextDetector for ScriptedDetector {
    fn detect(&self, _image: &RgbImage, _config: &ConfigMap) -> anyhow::Result<Vec<RawRegion>> {
        if self.fail {
            anyhow::bail!("detector model crashed");
        }
        Ok(self.regions.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Recognizer that answers calls in order from a script.
///
/// `None` entries fail that call. Calls beyond the script fail too. The
/// dimensions of every crop it receives are recorded.
pub struct ScriptedRecognizer {
    script: Vec<Option<RecognitionResult>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(u32, u32)>>,
}

impl ScriptedRecognizer {
    pub fn new(script: Vec<Option<RecognitionResult>>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Every call succeeds, in order
    pub fn answering(results: &[(&str, f32)]) -> Self {
        Self::new(
            results
                .iter()
                .map(|(text, score)| Some(RecognitionResult::new(*text, *score)))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_dimensions(&self) -> Vec<(u32, u32)> {
        self.seen.lock().unwrap().clone()
    }
}

impl TextRecognizer for ScriptedRecognizer {
    fn recognize(
        &self,
        crop: &RgbImage,
        _dictionary: &CharacterDictionary,
    ) -> anyhow::Result<RecognitionResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(crop.dimensions());
        match self.script.get(call) {
            Some(Some(result)) => Ok(result.clone()),
            _ => anyhow::bail!("recognizer failed on call {}", call),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Recognizer that decodes a fixed probability matrix against the
/// pipeline's dictionary
pub struct CtcRecognizer {
    probs: Vec<Vec<f32>>,
}

impl CtcRecognizer {
    pub fn new(probs: Vec<Vec<f32>>) -> Self {
        Self { probs }
    }
}

impl TextRecognizer for CtcRecognizer {
    fn recognize(
        &self,
        _crop: &RgbImage,
        dictionary: &CharacterDictionary,
    ) -> anyhow::Result<RecognitionResult> {
        Ok(greedy_decode(&self.probs, dictionary))
    }

    fn name(&self) -> &str {
        "ctc"
    }
}

/// One timestep with probability `p` on class `idx` out of `classes`
pub fn one_hot(classes: usize, idx: usize, p: f32) -> Vec<f32> {
    let mut row = vec![0.0; classes];
    row[idx] = p;
    row
}

/// Classifier that turns every crop a quarter turn clockwise
#[derive(Default)]
pub struct RotatingClassifier {
    calls: AtomicUsize,
}

impl RotatingClassifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DirectionClassifier for RotatingClassifier {
    fn classify(&self, crop: &RgbImage, _threshold: f32) -> anyhow::Result<RgbImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(imageops::rotate90(crop))
    }

    fn name(&self) -> &str {
        "rotating"
    }
}

pub struct FailingClassifier;

impl DirectionClassifier for FailingClassifier {
    fn classify(&self, _crop: &RgbImage, _threshold: f32) -> anyhow::Result<RgbImage> {
        anyhow::bail!("classifier unavailable")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Creates a width x height image with a diagonal gradient
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// Creates an image that is `left` for x < split and `right` from there on
pub fn two_tone_image(
    width: u32,
    height: u32,
    split: u32,
    left: Rgb<u8>,
    right: Rgb<u8>,
) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, _| if x < split { left } else { right })
}

/// Creates a solid RGBA frame
pub fn solid_frame(width: u32, height: u32) -> RgbaImage {
    ImageBuffer::from_pixel(width, height, image::Rgba([40, 80, 120, 255]))
}

/// Saves an image as a temporary PNG.
/// The file will be automatically cleaned up when dropped.
pub fn save_temp_png(img: &RgbImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Writes `contents` to a temporary text file
pub fn write_temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Axis-aligned region with its top-left corner at (x, y)
pub fn rect_region(x: i32, y: i32, width: i32, height: i32) -> RawRegion {
    RawRegion::from_corners([
        (x, y),
        (x + width, y),
        (x + width, y + height),
        (x, y + height),
    ])
}

/// Builds a pipeline from in-memory tables
pub fn make_pipeline(
    detector: Arc<dyn TextDetector>,
    classifier: Option<Arc<dyn DirectionClassifier>>,
    recognizer: Arc<dyn TextRecognizer>,
    use_classifier: bool,
) -> OcrPipeline {
    let flag = if use_classifier { 1.0 } else { 0.0 };
    let config: ConfigMap = [("use_direction_classify", flag), ("det_db_thresh", 0.3)]
        .into_iter()
        .collect();
    let dictionary = CharacterDictionary::from_symbols(["0", "1", "2", "a", "b", "c"]);
    OcrPipeline::from_parts(detector, classifier, recognizer, config, dictionary)
}
