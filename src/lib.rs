pub mod classify;
pub mod core;
pub mod export;
pub mod pipeline;
pub mod raster;
pub mod resolve;
pub mod score;
pub mod template;

pub use crate::core::model::{
    CheckboxState, Classification, ConfidenceLevel, ConfidenceReport, DocumentFieldMap,
};
pub use crate::core::thresholds::ClassifierConfig;
pub use crate::resolve::GroupResolution;
pub use crate::score::ScoringConfig;
pub use crate::template::FormTemplate;
