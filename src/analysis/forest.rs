//! Seeded Isolation Forest.
//!
//! Each tree isolates a random sub-sample by splitting on a random feature
//! at a random threshold between that feature's min and max. Points that
//! isolate in few splits are anomalous:
//!
//!   s(x) = 2^(-E[h(x)] / c(psi))
//!
//! The decision score is `-s(x) - offset`, where `offset` is the
//! `contamination` percentile of `-s` over the training batch, so roughly
//! that fraction of the batch falls below zero and is called an outlier.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::{check_dimensions, ModelError, OutlierModel, Verdict};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestParams {
    pub trees: usize,
    /// Upper bound on the per-tree sub-sample; the batch size caps it.
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 100,
            max_samples: 256,
            contamination: 0.1,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees == 0 {
            return Err(ModelError::InvalidParameter("trees must be at least 1".into()));
        }
        if self.max_samples == 0 {
            return Err(ModelError::InvalidParameter(
                "max_samples must be at least 1".into(),
            ));
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ModelError::InvalidParameter(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn path_length(&self, row: &[f64]) -> f64 {
        let mut node = self;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    trees: Vec<Node>,
    width: usize,
    sample_size: usize,
    offset: f64,
}

/// Isolation Forest; every `fit` starts over from the configured seed.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    params: ForestParams,
    fitted: Option<Fitted>,
}

impl IsolationForest {
    pub fn new(params: ForestParams) -> Result<Self, ModelError> {
        params.validate()?;
        Ok(Self {
            params,
            fitted: None,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Negated anomaly score `-s(x)`; lower is more abnormal.
    pub fn score_samples(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        check_dimensions(rows, fitted.width)?;
        Ok(raw_scores(&fitted.trees, fitted.sample_size, rows))
    }
}

impl OutlierModel for IsolationForest {
    fn fit(&mut self, rows: &[Vec<f64>]) -> Result<(), ModelError> {
        self.fitted = None;
        let first = rows.first().ok_or(ModelError::EmptyBatch)?;
        let width = first.len();
        check_dimensions(rows, width)?;

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let sample_size = self.params.max_samples.min(rows.len());
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;

        let trees: Vec<Node> = (0..self.params.trees)
            .map(|_| {
                let sample: Vec<&[f64]> = index::sample(&mut rng, rows.len(), sample_size)
                    .into_iter()
                    .map(|i| rows[i].as_slice())
                    .collect();
                grow(&sample, 0, max_depth, width, &mut rng)
            })
            .collect();

        let scores = raw_scores(&trees, sample_size, rows);
        let offset = percentile(&scores, self.params.contamination * 100.0);
        debug!(
            rows = rows.len(),
            trees = trees.len(),
            sample_size,
            offset,
            "isolation forest fitted"
        );

        self.fitted = Some(Fitted {
            trees,
            width,
            sample_size,
            offset,
        });
        Ok(())
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<Verdict>, ModelError> {
        let scores = self.decision_function(rows)?;
        Ok(scores
            .into_iter()
            .map(|s| if s < 0.0 { Verdict::Outlier } else { Verdict::Inlier })
            .collect())
    }

    fn decision_scores(&self, rows: &[Vec<f64>]) -> Result<Option<Vec<f64>>, ModelError> {
        self.decision_function(rows).map(Some)
    }
}

impl IsolationForest {
    fn decision_function(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        let offset = self.fitted.as_ref().ok_or(ModelError::NotFitted)?.offset;
        Ok(self
            .score_samples(rows)?
            .into_iter()
            .map(|s| s - offset)
            .collect())
    }
}

fn grow(sample: &[&[f64]], depth: usize, max_depth: usize, width: usize, rng: &mut StdRng) -> Node {
    if depth >= max_depth || sample.len() <= 1 {
        return Node::Leaf { size: sample.len() };
    }

    // Only features that still vary inside this node can split it.
    let candidates: Vec<(usize, f64, f64)> = (0..width)
        .filter_map(|f| {
            let (lo, hi) = sample.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r[f]), hi.max(r[f]))
            });
            (hi > lo).then_some((f, lo, hi))
        })
        .collect();

    if candidates.is_empty() {
        return Node::Leaf { size: sample.len() };
    }

    let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(lo..hi);
    let (left, right): (Vec<&[f64]>, Vec<&[f64]>) =
        sample.iter().partition(|r| r[feature] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(&left, depth + 1, max_depth, width, rng)),
        right: Box::new(grow(&right, depth + 1, max_depth, width, rng)),
    }
}

fn raw_scores(trees: &[Node], sample_size: usize, rows: &[Vec<f64>]) -> Vec<f64> {
    let norm = average_path_length(sample_size).max(f64::MIN_POSITIVE);
    rows.iter()
        .map(|row| {
            let mean_depth =
                trees.iter().map(|t| t.path_length(row)).sum::<f64>() / trees.len() as f64;
            -(2f64).powf(-mean_depth / norm)
        })
        .collect()
}

/// Expected path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolated percentile, `p` in [0, 100].
fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office_hours_batch() -> Vec<Vec<f64>> {
        let mut rows: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![8.0 + (i % 5) as f64, (i % 5) as f64, 0.0])
            .collect();
        rows.push(vec![3.0, 6.0, 3.0]);
        rows
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) ~ 10.24
        let c = average_path_length(256);
        assert!(c > 10.2 && c < 10.3, "c(256) = {c}");
    }

    #[test]
    fn test_percentile_interpolates() {
        let v = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 50.0), 3.0);
        assert_eq!(percentile(&v, 100.0), 5.0);
        assert!((percentile(&v, 10.0) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_isolated_point_is_outlier() {
        let rows = office_hours_batch();
        let mut forest = IsolationForest::new(ForestParams::default()).unwrap();
        forest.fit(&rows).unwrap();

        let verdicts = forest.predict(&rows).unwrap();
        assert_eq!(verdicts.last(), Some(&Verdict::Outlier));

        let scores = forest.decision_scores(&rows).unwrap().unwrap();
        let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        assert_eq!(scores[40], min);
        assert!(scores[40] < 0.0);
    }

    #[test]
    fn test_same_seed_same_verdicts() {
        let rows = office_hours_batch();
        let mut a = IsolationForest::new(ForestParams::default()).unwrap();
        let mut b = IsolationForest::new(ForestParams::default()).unwrap();
        a.fit(&rows).unwrap();
        b.fit(&rows).unwrap();
        assert_eq!(a.predict(&rows).unwrap(), b.predict(&rows).unwrap());
        assert_eq!(
            a.score_samples(&rows).unwrap(),
            b.score_samples(&rows).unwrap()
        );

        // refitting resets to the seed
        a.fit(&rows).unwrap();
        assert_eq!(
            a.score_samples(&rows).unwrap(),
            b.score_samples(&rows).unwrap()
        );
    }

    #[test]
    fn test_identical_rows_are_all_inliers() {
        let rows = vec![vec![14.0, 2.0, 0.0]; 20];
        let mut forest = IsolationForest::new(ForestParams::default()).unwrap();
        forest.fit(&rows).unwrap();
        assert!(forest
            .predict(&rows)
            .unwrap()
            .iter()
            .all(Verdict::is_inlier));
    }

    #[test]
    fn test_single_row_batch() {
        let rows = vec![vec![10.0, 1.0]];
        let mut forest = IsolationForest::new(ForestParams::default()).unwrap();
        forest.fit(&rows).unwrap();
        assert_eq!(forest.predict(&rows).unwrap(), vec![Verdict::Inlier]);
    }

    #[test]
    fn test_errors() {
        let mut forest = IsolationForest::new(ForestParams::default()).unwrap();
        assert_eq!(forest.predict(&[vec![1.0]]), Err(ModelError::NotFitted));
        assert_eq!(forest.fit(&[]), Err(ModelError::EmptyBatch));
        assert!(!forest.is_fitted());

        forest.fit(&[vec![1.0, 2.0], vec![2.0, 3.0]]).unwrap();
        assert!(matches!(
            forest.predict(&[vec![1.0]]),
            Err(ModelError::DimensionMismatch { .. })
        ));

        let bad = ForestParams {
            contamination: 0.0,
            ..ForestParams::default()
        };
        assert!(matches!(
            IsolationForest::new(bad),
            Err(ModelError::InvalidParameter(_))
        ));
    }
}
