//! Object-change comparison and strategy selection

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::detection::DetectionResult;

/// How the image-damage ratio of an assessment was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMethod {
    ObjectDiff,
    PixelSimilarity,
}

impl ComparisonMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMethod::ObjectDiff => "object_diff",
            ComparisonMethod::PixelSimilarity => "pixel_similarity",
        }
    }
}

impl fmt::Display for ComparisonMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "object_diff" => Ok(ComparisonMethod::ObjectDiff),
            "pixel_similarity" => Ok(ComparisonMethod::PixelSimilarity),
            other => Err(format!("unknown comparison method: {other}")),
        }
    }
}

/// Strategy for deriving the image-damage ratio of a pair
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonStrategy {
    /// Compare the detected object classes
    ObjectDiff {
        pre: DetectionResult,
        post: DetectionResult,
    },
    /// Nothing detected in either image; compare pixels instead
    PixelSimilarity,
}

impl ComparisonStrategy {
    /// Object diff unless both detection results are empty
    pub fn select(pre: DetectionResult, post: DetectionResult) -> Self {
        if pre.is_empty() && post.is_empty() {
            ComparisonStrategy::PixelSimilarity
        } else {
            ComparisonStrategy::ObjectDiff { pre, post }
        }
    }

    pub fn method(&self) -> ComparisonMethod {
        match self {
            ComparisonStrategy::ObjectDiff { .. } => ComparisonMethod::ObjectDiff,
            ComparisonStrategy::PixelSimilarity => ComparisonMethod::PixelSimilarity,
        }
    }
}

/// Measures how much the set of detected classes changed
///
/// Only label presence matters; confidences are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectChangeComparator;

impl ObjectChangeComparator {
    /// Labels present in exactly one of the two results, over the union
    ///
    /// An empty union gives 0.
    pub fn change_ratio(&self, pre: &DetectionResult, post: &DetectionResult) -> f64 {
        let pre: BTreeSet<&str> = pre.labels().collect();
        let post: BTreeSet<&str> = post.labels().collect();

        let union = pre.union(&post).count();
        if union == 0 {
            return 0.0;
        }
        let changed = pre.symmetric_difference(&post).count();
        changed as f64 / union as f64
    }
}
