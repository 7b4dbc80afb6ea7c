//! Rating domain - aggregate of all metric scores for one model

mod entity;
mod weights;

pub use entity::Rating;
pub use weights::NetScoreWeights;
