//! Infrastructure services

mod artifact_service;
mod rating_service;

pub use artifact_service::{ArtifactQuery, ArtifactService, LicenseCheck, WILDCARD_QUERY};
pub use rating_service::RatingService;
