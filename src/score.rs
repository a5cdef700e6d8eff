use log::debug;
use rustc_hash::FxHashSet;
use std::fmt;

use crate::error::{Result, VcfError};
use crate::variant::{VariantKey, VariantTable};

/// Distinct variants of a table; duplicate rows collapse to one key.
pub type VariantKeySet<'a> = FxHashSet<VariantKey<'a>>;

pub fn key_set(table: &VariantTable) -> VariantKeySet<'_> {
    table.records().iter().map(|r| r.key()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Accuracy,
    Precision,
    Recall,
    F1,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Metric::Accuracy => "Accuracy",
            Metric::Precision => "Precision",
            Metric::Recall => "Recall",
            Metric::F1 => "F1 score",
        };
        f.write_str(s)
    }
}

/// Set cardinalities from comparing a predicted key set `P` with a truth
/// key set `T`. There are no true negatives in variant calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionCounts {
    /// |P ∩ T|
    pub tp: usize,
    /// |P − T|
    pub fp: usize,
    /// |T − P|
    pub fn_: usize,
    /// |P|
    pub n: usize,
    /// |T|
    pub truth: usize,
}

impl ConfusionCounts {
    pub fn from_sets<'a>(predicted: &VariantKeySet<'a>, truth: &VariantKeySet<'a>) -> Self {
        let tp = predicted.intersection(truth).count();
        ConfusionCounts {
            tp,
            fp: predicted.len() - tp,
            fn_: truth.len() - tp,
            n: predicted.len(),
            truth: truth.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub counts: ConfusionCounts,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Metrics {
    /// Fails with [`VcfError::Division`] naming the first metric whose
    /// denominator is zero. When precision and recall are both zero the F1
    /// score is reported as zero.
    pub fn from_counts(counts: ConfusionCounts) -> Result<Self> {
        let accuracy = ratio(counts.tp, counts.n, Metric::Accuracy, "no predicted variants")?;
        let recall = ratio(
            counts.tp,
            counts.tp + counts.fn_,
            Metric::Recall,
            "no truth variants",
        )?;
        let precision = ratio(
            counts.tp,
            counts.tp + counts.fp,
            Metric::Precision,
            "no predicted variants",
        )?;
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Ok(Metrics {
            counts,
            accuracy,
            precision,
            recall,
            f1,
        })
    }
}

fn ratio(num: usize, den: usize, metric: Metric, reason: &str) -> Result<f64> {
    if den == 0 {
        return Err(VcfError::Division {
            metric,
            reason: reason.to_string(),
        });
    }
    Ok(num as f64 / den as f64)
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", Metric::Accuracy, self.accuracy)?;
        writeln!(f, "{}: {}", Metric::Recall, self.recall)?;
        writeln!(f, "{}: {}", Metric::Precision, self.precision)?;
        write!(f, "{}: {}", Metric::F1, self.f1)
    }
}

/// Compare the distinct `(chrom, pos, ref, alt)` keys of `predicted`
/// against those of `truth`.
pub fn score(predicted: &VariantTable, truth: &VariantTable) -> Result<Metrics> {
    let p = key_set(predicted);
    let t = key_set(truth);
    let counts = ConfusionCounts::from_sets(&p, &t);
    debug!(
        "score: {} predicted rows ({} distinct), {} truth rows ({} distinct): tp={} fp={} fn={}",
        predicted.len(),
        counts.n,
        truth.len(),
        counts.truth,
        counts.tp,
        counts.fp,
        counts.fn_
    );
    Metrics::from_counts(counts)
}
