//! Training material attached to agents (uploaded PDFs and crawled URLs).

mod model;

pub use model::{NewTrainingFile, TrainingFile, TrainingFileKind};
