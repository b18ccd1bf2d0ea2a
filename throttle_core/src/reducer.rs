//! Strategies that combine per-sensor averages into one throttle position.

/// Result of reducing the per-sensor averages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reduction {
    pub position: f32,
    /// False when the strategy detected disagreement between sensors.
    pub consistent: bool,
}

pub trait Reducer: Send + Sync {
    /// `averages` is never empty.
    fn reduce(&self, averages: &[f32]) -> Reduction;
}

/// Unweighted arithmetic mean; never flags disagreement.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleAverage;

impl Reducer for SimpleAverage {
    fn reduce(&self, averages: &[f32]) -> Reduction {
        let sum: f32 = averages.iter().sum();
        Reduction {
            position: sum / averages.len() as f32,
            consistent: true,
        }
    }
}

/// Median of N (mean of the middle pair for even N).
#[derive(Debug, Default, Clone, Copy)]
pub struct MedianOfN;

impl Reducer for MedianOfN {
    fn reduce(&self, averages: &[f32]) -> Reduction {
        Reduction {
            position: median(averages),
            consistent: true,
        }
    }
}

/// Average of the sensors that lie within `threshold` of the median.
///
/// Consistent only when a strict majority agrees; otherwise the median is
/// reported as the best available estimate.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdVote {
    pub threshold: f32,
}

impl Reducer for ThresholdVote {
    fn reduce(&self, averages: &[f32]) -> Reduction {
        let med = median(averages);
        let (sum, n) = averages
            .iter()
            .filter(|v| (**v - med).abs() <= self.threshold)
            .fold((0.0f32, 0usize), |(s, n), v| (s + v, n + 1));
        if n * 2 > averages.len() {
            Reduction {
                position: sum / n as f32,
                consistent: true,
            }
        } else {
            Reduction {
                position: med,
                consistent: false,
            }
        }
    }
}

fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Serializable selector for the built-in reducers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ReductionKind {
    #[default]
    Average,
    Median,
    Vote { threshold: f32 },
}

impl ReductionKind {
    pub fn build(self) -> Box<dyn Reducer> {
        match self {
            Self::Average => Box::new(SimpleAverage),
            Self::Median => Box::new(MedianOfN),
            Self::Vote { threshold } => Box::new(ThresholdVote { threshold }),
        }
    }
}
