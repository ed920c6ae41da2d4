//! The match service: validation, serialized writes, publication.

pub mod errors;
pub mod match_service;
pub mod request;
pub mod validate;

pub use errors::{ServiceError, ServiceResult};
pub use match_service::MatchService;
pub use request::{BallRequest, WicketRequest};
