//! Access analysis: feature extraction, outlier model, classification.

pub mod classifier;
pub mod features;
pub mod forest;
pub mod metrics;
pub mod model;

pub use classifier::{classify_accesses, AccessClass, ClassificationBuckets, ClassifiedAccess};
pub use features::{extract_features, ActorType, FeatureSet, FeatureVariant};
pub use forest::{ForestParams, IsolationForest};
pub use metrics::Metrics;
pub use model::{ModelError, OutlierModel, Verdict};
