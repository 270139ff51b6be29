pub mod catalog;
pub mod corpus;
pub mod model_builder;
pub mod providers;
pub mod recommender;
pub mod stop_words;
pub mod vectorizer;

pub use corpus::{Corpus, LoadOutcome, MIN_ARTICLES_FOR_ML};
pub use model_builder::{ModelSnapshot, SimilarityModel};
pub use recommender::{BuildOutcome, EngineStats, ModelState, Recommender};
