use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TrackError {
    #[error("invalid tracker parameters: {0}")]
    InvalidParams(String),
    #[error("tracker has not been initialized")]
    NotInitialized,
    #[error("frame buffer does not match the declared image size")]
    ImageSizeMismatch,
    #[error("bounding box lies outside the image")]
    InvalidBoundingBox,
}
