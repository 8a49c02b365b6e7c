//! Physics errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("Unknown body: {0}")]
    UnknownBody(u64),

    #[error("Invalid body radius: {0}")]
    InvalidRadius(f32),

    #[error("Invalid scale factor: {0}")]
    InvalidScale(f32),
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
