//! Core library: fact extraction, validation, features, token substitution,
//! rule scoring and blending with a classifier's probabilities.

pub mod blender;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod encoding;
pub mod error;
pub mod extractor;
pub mod features;
pub mod models;
pub mod preprocess;
pub mod replacer;
pub mod rules;
pub mod validator;

pub use catalog::{FactType, PatternCatalog, FEATURE_DIM};
pub use models::{
    BlendedPrediction, Category, CategoryDistribution, ExtractedFact, ExtractionResult,
    FeatureVector, RuleScores, ValidationOutcome,
};
pub use preprocess::{PreprocessOptions, Preprocessed, Preprocessor};
