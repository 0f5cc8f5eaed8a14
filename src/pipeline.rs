use image::{RgbImage, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{CharacterDictionary, ConfigMap, PipelineOptions};
use crate::detection::{
    DirectionClassifier, TextDetector, TextRecognizer, preprocessing, rectify, validate,
};
use crate::error::{LoadError, PipelineError, RegionRejection};
use crate::models::{RawRegion, RecognitionResult};

/// Where the image for one `process` call comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Still image on disk, processed at native resolution within the size bounds
    File(PathBuf),
    /// Live RGBA capture, converted to 3 channels and resized to the working resolution
    Frame(RgbaImage),
    /// Already-decoded 3-channel image, used as-is
    Image(RgbImage),
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::File(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::File(path.to_path_buf())
    }
}

impl From<RgbaImage> for ImageSource {
    fn from(frame: RgbaImage) -> Self {
        ImageSource::Frame(frame)
    }
}

impl From<RgbImage> for ImageSource {
    fn from(image: RgbImage) -> Self {
        ImageSource::Image(image)
    }
}

/// Why a detected region produced no result
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Rejected(RegionRejection),
    EmptyCrop,
    CropTooSmall { width: u32, height: u32 },
    RecognitionFailed(String),
    EmptyText,
    LowConfidence(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegionOutcome {
    Accepted(RecognitionResult),
    Skipped(SkipReason),
}

/// Outcome of one detected region, in detection order
#[derive(Debug, Clone, PartialEq)]
pub struct RegionReport {
    pub index: usize,
    pub outcome: RegionOutcome,
    /// Classification was requested but failed; the unclassified crop was recognized
    pub classifier_fallback: bool,
}

impl RegionReport {
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, RegionOutcome::Accepted(_))
    }
}

/// Stage timings and counts for one call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessStats {
    pub detect_ms: f64,
    pub recognize_ms: f64,
    pub total_ms: f64,
    pub detected: usize,
    pub accepted: usize,
}

/// Everything produced by one successful run
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub results: Vec<RecognitionResult>,
    pub regions: Vec<RawRegion>,
    pub outcomes: Vec<RegionReport>,
    pub stats: ProcessStats,
    /// The 3-channel image the detector saw
    pub working_image: RgbImage,
}

impl ProcessReport {
    pub fn texts(&self) -> Vec<String> {
        self.results.iter().map(|r| r.text.clone()).collect()
    }
}

/// Detect, rectify, classify and recognize text in one image at a time.
///
/// Holds the three inference collaborators, the option and symbol tables, and
/// a single-slot cache of the last run's output. `process` takes `&mut self`,
/// so calls on one instance are serialized by the borrow checker; share an
/// instance across threads only behind a lock.
pub struct OcrPipeline {
    detector: Arc<dyn TextDetector>,
    classifier: Option<Arc<dyn DirectionClassifier>>,
    recognizer: Arc<dyn TextRecognizer>,
    config: ConfigMap,
    dictionary: CharacterDictionary,
    options: PipelineOptions,
    /// Directory receiving one PNG per rectified crop
    debug_dir: Option<PathBuf>,
    last_texts: Vec<String>,
    last_scores: Vec<f32>,
}

impl OcrPipeline {
    /// Build a pipeline, loading the option map and character dictionary from disk
    pub fn new(
        detector: Arc<dyn TextDetector>,
        classifier: Option<Arc<dyn DirectionClassifier>>,
        recognizer: Arc<dyn TextRecognizer>,
        config_path: impl AsRef<Path>,
        dict_path: impl AsRef<Path>,
    ) -> Result<Self, LoadError> {
        let config = ConfigMap::load(config_path)?;
        let dictionary = CharacterDictionary::load(dict_path)?;
        Ok(Self::from_parts(detector, classifier, recognizer, config, dictionary))
    }

    /// Build a pipeline from already-loaded tables
    pub fn from_parts(
        detector: Arc<dyn TextDetector>,
        classifier: Option<Arc<dyn DirectionClassifier>>,
        recognizer: Arc<dyn TextRecognizer>,
        config: ConfigMap,
        dictionary: CharacterDictionary,
    ) -> Self {
        info!(
            detector = detector.name(),
            classifier = classifier.as_ref().map(|c| c.name()).unwrap_or("none"),
            recognizer = recognizer.name(),
            config_entries = config.len(),
            dictionary_size = dictionary.len(),
            "OCR pipeline ready"
        );
        Self {
            detector,
            classifier,
            recognizer,
            config,
            dictionary,
            options: PipelineOptions::default(),
            debug_dir: None,
            last_texts: Vec::new(),
            last_scores: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.debug_dir = Some(output_dir);

        Ok(self)
    }

    /// Run the pipeline and return the accepted results.
    ///
    /// Whole-image failures are logged and yield an empty result; the
    /// last-result cache is left untouched in that case.
    pub fn process(&mut self, source: impl Into<ImageSource>) -> Vec<RecognitionResult> {
        match self.try_process(source.into()) {
            Ok(report) => report.results,
            Err(e) => {
                warn!("OCR processing failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Like [`process`](Self::process) but returns only the decoded strings
    pub fn process_texts(&mut self, source: impl Into<ImageSource>) -> Vec<String> {
        self.process(source).into_iter().map(|r| r.text).collect()
    }

    /// Run the pipeline, reporting whole-image failures as errors.
    ///
    /// On success the last-result cache is overwritten, even when no region
    /// was accepted.
    pub fn try_process(&mut self, source: ImageSource) -> Result<ProcessReport, PipelineError> {
        let started = Instant::now();
        let image = self.acquire(source)?;
        let (width, height) = image.dimensions();

        let detect_start = Instant::now();
        let regions = self
            .detector
            .detect(&image, &self.config)
            .map_err(|e| PipelineError::Detection(format!("{:#}", e)))?;
        let detect_ms = detect_start.elapsed().as_secs_f64() * 1000.0;
        info!(count = regions.len(), width, height, "Detected text regions");

        let use_classifier = self.config.use_direction_classify();

        let recognize_start = Instant::now();
        let mut results = Vec::new();
        let mut outcomes = Vec::with_capacity(regions.len());

        for (index, region) in regions.iter().enumerate() {
            let report = self.process_region(index, &image, region, use_classifier);
            if let RegionOutcome::Accepted(result) = &report.outcome {
                results.push(result.clone());
            }
            outcomes.push(report);
        }
        let recognize_ms = recognize_start.elapsed().as_secs_f64() * 1000.0;

        self.last_texts = results.iter().map(|r| r.text.clone()).collect();
        self.last_scores = results.iter().map(|r| r.score).collect();

        let stats = ProcessStats {
            detect_ms,
            recognize_ms,
            total_ms: started.elapsed().as_secs_f64() * 1000.0,
            detected: regions.len(),
            accepted: results.len(),
        };
        info!(
            accepted = stats.accepted,
            detected = stats.detected,
            detect_ms = stats.detect_ms,
            recognize_ms = stats.recognize_ms,
            total_ms = stats.total_ms,
            "Recognition completed"
        );

        Ok(ProcessReport {
            results,
            regions,
            outcomes,
            stats,
            working_image: image,
        })
    }

    /// Texts accepted by the most recent successful run
    pub fn last_results(&self) -> &[String] {
        &self.last_texts
    }

    /// Scores parallel to [`last_results`](Self::last_results)
    pub fn last_scores(&self) -> &[f32] {
        &self.last_scores
    }

    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    pub fn dictionary(&self) -> &CharacterDictionary {
        &self.dictionary
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    fn acquire(&self, source: ImageSource) -> Result<RgbImage, PipelineError> {
        match source {
            ImageSource::File(path) => {
                debug!("Loading image file: {}", path.display());
                let image = preprocessing::load_source_file(&path)?;
                let (w, h) = image.dimensions();
                preprocessing::check_source_size(
                    w,
                    h,
                    self.options.min_source_side,
                    self.options.max_source_side,
                )?;
                debug!("Image loaded: {}x{}", w, h);
                Ok(image)
            }
            ImageSource::Frame(frame) => {
                let (w, h) = frame.dimensions();
                if w == 0 || h == 0 {
                    return Err(PipelineError::InvalidSourceSize {
                        width: w,
                        height: h,
                        min: 1,
                        max: u32::MAX,
                    });
                }
                Ok(preprocessing::frame_to_working(
                    &frame,
                    self.options.frame_width,
                    self.options.frame_height,
                ))
            }
            ImageSource::Image(image) => Ok(image),
        }
    }

    /// Validate, rectify, classify and recognize one region.
    ///
    /// Every failure is turned into a skip so the caller's loop always continues.
    fn process_region(
        &self,
        index: usize,
        image: &RgbImage,
        region: &RawRegion,
        use_classifier: bool,
    ) -> RegionReport {
        let mut classifier_fallback = false;
        let skip = |reason: SkipReason, fallback: bool| RegionReport {
            index,
            outcome: RegionOutcome::Skipped(reason),
            classifier_fallback: fallback,
        };

        let quad = match validate(region, image.width(), image.height()) {
            Ok(quad) => quad,
            Err(rejection) => {
                debug!("Invalid box {}: {}", index, rejection);
                return skip(SkipReason::Rejected(rejection), false);
            }
        };

        let Some(mut crop) = rectify(image, &quad) else {
            debug!("Failed to crop image for box {}", index);
            return skip(SkipReason::EmptyCrop, false);
        };

        let min_side = self.options.min_crop_side;
        if crop.width() < min_side || crop.height() < min_side {
            debug!(
                "Crop for box {} too small: {}x{}",
                index,
                crop.width(),
                crop.height()
            );
            return skip(
                SkipReason::CropTooSmall {
                    width: crop.width(),
                    height: crop.height(),
                },
                false,
            );
        }

        self.save_debug_crop(index, &crop);

        if use_classifier {
            if let Some(classifier) = &self.classifier {
                match classifier.classify(&crop, self.options.classify_threshold) {
                    Ok(classified) => crop = classified,
                    Err(e) => {
                        debug!("Classification failed for box {}: {:#}", index, e);
                        classifier_fallback = true;
                    }
                }
            }
        }

        let candidate = match self.recognizer.recognize(&crop, &self.dictionary) {
            Ok(candidate) => candidate,
            Err(e) => {
                debug!("Recognition failed for box {}: {:#}", index, e);
                return skip(
                    SkipReason::RecognitionFailed(format!("{:#}", e)),
                    classifier_fallback,
                );
            }
        };

        if candidate.text.is_empty() {
            return skip(SkipReason::EmptyText, classifier_fallback);
        }
        // NaN scores fail the comparison and are discarded
        if candidate.score.is_nan() || candidate.score <= self.options.min_score {
            debug!(
                "Discarding box {}: '{}' (score {:.4})",
                index, candidate.text, candidate.score
            );
            return skip(
                SkipReason::LowConfidence(candidate.score),
                classifier_fallback,
            );
        }

        debug!(
            "Recognized text: {} (score: {:.4})",
            candidate.text, candidate.score
        );
        RegionReport {
            index,
            outcome: RegionOutcome::Accepted(candidate),
            classifier_fallback,
        }
    }

    fn save_debug_crop(&self, index: usize, crop: &RgbImage) {
        let Some(debug_dir) = &self.debug_dir else {
            return;
        };

        let output_path = debug_dir.join(format!("region_{:03}.png", index));
        match crop.save(&output_path) {
            Ok(()) => debug!("Debug: saved {}", output_path.display()),
            Err(e) => warn!("Failed to save debug crop {}: {}", output_path.display(), e),
        }
    }
}
