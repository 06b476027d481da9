//! Preprocess → score → argmax → label lookup.

use std::sync::Arc;

use foodlens_core::LabelTable;
use image::RgbImage;
use tracing::debug;

use crate::error::InferenceError;
use crate::model::ScoreModel;
use crate::preprocess::preprocess;

/// Result of classifying one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<'a> {
    /// Output slot of the winning class.
    pub index: usize,
    pub label: &'a str,
    /// Raw score of the winning class (logit or probability, per the model).
    pub score: f32,
}

/// A loaded classifier bound to its label table.
///
/// Immutable once built; share it behind an `Arc`.
pub struct Pipeline {
    model: Arc<dyn ScoreModel>,
    labels: LabelTable,
}

impl Pipeline {
    /// Bind a model to a label table.
    ///
    /// Fails if the model declares a class count different from the table size.
    pub fn new(model: Arc<dyn ScoreModel>, labels: LabelTable) -> Result<Self, InferenceError> {
        if let Some(classes) = model.num_classes()
            && classes != labels.len()
        {
            return Err(InferenceError::ScoreLength {
                expected: labels.len(),
                got: classes,
            });
        }
        Ok(Self { model, labels })
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Classify a decoded image.
    pub fn classify(&self, image: &RgbImage) -> Result<Classification<'_>, InferenceError> {
        let tensor = preprocess(image);
        let scores = self.model.scores(&tensor)?;

        if scores.len() != self.labels.len() {
            return Err(InferenceError::ScoreLength {
                expected: self.labels.len(),
                got: scores.len(),
            });
        }

        let index = argmax(&scores).ok_or(InferenceError::NoFiniteScore)?;
        let label = self
            .labels
            .get(index)
            .ok_or(InferenceError::ScoreLength {
                expected: self.labels.len(),
                got: scores.len(),
            })?;

        debug!(index, label, score = scores[index], "classified image");
        Ok(Classification {
            index,
            label,
            score: scores[index],
        })
    }

    /// Label of the best-scoring class.
    pub fn predict(&self, image: &RgbImage) -> Result<&str, InferenceError> {
        Ok(self.classify(image)?.label)
    }
}

/// Index of the largest score; the first one wins ties.
///
/// NaN entries are skipped. Returns `None` if no score is comparable.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, b)| s > b) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::ImageTensor;
    use image::Rgb;
    use std::sync::Mutex;

    /// Always returns the same scores.
    struct FixedScores(Vec<f32>);

    impl ScoreModel for FixedScores {
        fn scores(&self, _input: &ImageTensor) -> Result<Vec<f32>, InferenceError> {
            Ok(self.0.clone())
        }
    }

    /// Scores derived from the mean of each colour plane, so different
    /// images land on different classes.
    struct ChannelMeans {
        classes: usize,
    }

    impl ScoreModel for ChannelMeans {
        fn scores(&self, input: &ImageTensor) -> Result<Vec<f32>, InferenceError> {
            let means: Vec<f32> = (0..3)
                .map(|c| {
                    let plane = input.channel(c);
                    plane.iter().sum::<f32>() / plane.len() as f32
                })
                .collect();
            Ok((0..self.classes).map(|k| means[k % 3] * (k as f32 + 1.0)).collect())
        }

        fn num_classes(&self) -> Option<usize> {
            Some(self.classes)
        }
    }

    /// Records how many times it was called.
    struct Counting {
        calls: Mutex<usize>,
        classes: usize,
    }

    impl ScoreModel for Counting {
        fn scores(&self, _input: &ImageTensor) -> Result<Vec<f32>, InferenceError> {
            *self.calls.lock().unwrap() += 1;
            Ok(vec![0.0; self.classes])
        }
    }

    fn image(rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(320, 240, Rgb(rgb))
    }

    fn pipeline(model: impl ScoreModel + 'static) -> Pipeline {
        Pipeline::new(Arc::new(model), LabelTable::builtin()).unwrap()
    }

    #[test]
    fn argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), Some(1));
    }

    #[test]
    fn argmax_tie_goes_to_lowest_index() {
        assert_eq!(argmax(&[0.0, 5.0, 1.0, 5.0]), Some(1));
        assert_eq!(argmax(&[2.0, 2.0, 2.0]), Some(0));
    }

    #[test]
    fn argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.5, 0.9]), Some(2));
        assert_eq!(argmax(&[0.5, f32::NAN, 0.1]), Some(0));
    }

    #[test]
    fn argmax_empty_or_all_nan() {
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f32::NAN, f32::NAN]), None);
    }

    #[test]
    fn argmax_handles_infinities() {
        assert_eq!(argmax(&[f32::NEG_INFINITY, f32::NEG_INFINITY]), Some(0));
        assert_eq!(argmax(&[1.0, f32::INFINITY, f32::INFINITY]), Some(1));
    }

    #[test]
    fn predict_maps_index_to_label() {
        let mut scores = vec![0.0; 18];
        scores[17] = 4.2;
        let p = pipeline(FixedScores(scores));
        assert_eq!(p.predict(&image([200, 200, 200])).unwrap(), "white_rice");
    }

    #[test]
    fn tie_selects_first_label() {
        let mut scores = vec![0.0; 18];
        scores[3] = 1.0;
        scores[9] = 1.0;
        let p = pipeline(FixedScores(scores));
        let c = p.classify(&image([1, 2, 3])).unwrap();
        assert_eq!(c.index, 3);
        assert_eq!(c.label, "beet_salad");
        assert_eq!(c.score, 1.0);
    }

    #[test]
    fn prediction_is_deterministic() {
        let p = pipeline(ChannelMeans { classes: 18 });
        let img = RgbImage::from_fn(123, 77, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
        let first = p.predict(&img).unwrap().to_string();
        for _ in 0..5 {
            assert_eq!(p.predict(&img).unwrap(), first);
        }
    }

    #[test]
    fn prediction_is_always_a_known_label() {
        let p = pipeline(ChannelMeans { classes: 18 });
        let colours = [
            [0, 0, 0],
            [255, 255, 255],
            [255, 0, 0],
            [0, 255, 0],
            [0, 0, 255],
            [12, 200, 99],
        ];
        for rgb in colours {
            let label = p.predict(&image(rgb)).unwrap();
            assert!(p.labels().contains(label), "{label} not in table");
        }
    }

    #[test]
    fn declared_class_count_must_match_labels() {
        let err = Pipeline::new(Arc::new(ChannelMeans { classes: 101 }), LabelTable::builtin())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            InferenceError::ScoreLength {
                expected: 18,
                got: 101
            }
        ));
    }

    #[test]
    fn wrong_score_length_is_error() {
        let p = pipeline(FixedScores(vec![1.0; 5]));
        let err = p.predict(&image([0, 0, 0])).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::ScoreLength {
                expected: 18,
                got: 5
            }
        ));
        assert!(!err.is_client_error());
    }

    #[test]
    fn all_nan_scores_is_error() {
        let p = pipeline(FixedScores(vec![f32::NAN; 18]));
        assert!(matches!(
            p.predict(&image([0, 0, 0])),
            Err(InferenceError::NoFiniteScore)
        ));
    }

    #[test]
    fn model_called_once_per_prediction() {
        let model = Arc::new(Counting {
            calls: Mutex::new(0),
            classes: 18,
        });
        let p = Pipeline::new(model.clone(), LabelTable::builtin()).unwrap();
        p.predict(&image([9, 9, 9])).unwrap();
        p.predict(&image([9, 9, 9])).unwrap();
        assert_eq!(*model.calls.lock().unwrap(), 2);
    }

    #[test]
    fn concurrent_predictions_agree() {
        let p = pipeline(ChannelMeans { classes: 18 });
        let colours = [[0, 0, 0], [255, 255, 255], [255, 0, 0], [12, 200, 99]];
        let expected: Vec<String> = colours
            .iter()
            .map(|&rgb| p.predict(&image(rgb)).unwrap().to_string())
            .collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let p = &p;
                    let expected = &expected;
                    scope.spawn(move || {
                        for round in 0..4 {
                            let i = (t + round) % colours.len();
                            assert_eq!(p.predict(&image(colours[i])).unwrap(), expected[i]);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        });
    }

    #[test]
    fn custom_label_table() {
        let labels = LabelTable::parse("dhal\nkottu\n").unwrap();
        let p = Pipeline::new(Arc::new(FixedScores(vec![0.2, 0.8])), labels).unwrap();
        assert_eq!(p.predict(&image([0, 0, 0])).unwrap(), "kottu");
    }
}
