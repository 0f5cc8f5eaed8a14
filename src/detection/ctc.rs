//! Greedy CTC decoding against a [`CharacterDictionary`].
//!
//! A library helper for [`TextRecognizer`](crate::detection::TextRecognizer)
//! implementations outside this crate whose models emit per-timestep class
//! probabilities. [`greedy_decode`] turns them into a [`RecognitionResult`]:
//! take the best class at every step, collapse consecutive repeats, and drop
//! the blank. The bundled ocrs backend decodes internally and does not use it.

use crate::config::CharacterDictionary;
use crate::models::RecognitionResult;

/// Decode a `[timesteps][classes]` probability matrix.
///
/// The score is the mean probability of the emitted characters, or 0 when
/// nothing is emitted. Class indices beyond the dictionary are dropped.
pub fn greedy_decode(probs: &[Vec<f32>], dictionary: &CharacterDictionary) -> RecognitionResult {
    let blank = dictionary.blank_index();
    let mut text = String::new();
    let mut kept_probs = Vec::new();
    let mut previous: Option<usize> = None;

    for step in probs {
        let Some((idx, prob)) = argmax(step) else {
            previous = None;
            continue;
        };

        let repeated = previous == Some(idx);
        previous = Some(idx);
        if repeated || idx == blank {
            continue;
        }

        if let Some(symbol) = dictionary.get(idx) {
            text.push_str(symbol);
            kept_probs.push(prob);
        }
    }

    let score = if kept_probs.is_empty() {
        0.0
    } else {
        kept_probs.iter().sum::<f32>() / kept_probs.len() as f32
    };

    RecognitionResult::new(text, score)
}

fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .max_by(|a, b| a.1.total_cmp(&b.1))
}
