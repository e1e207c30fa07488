use thiserror::Error;

use crate::config::ConfigError;
use crate::scoring::forest::ModelError;

/// Errors that stop an analyzer from being built or a file from being read.
///
/// Analysis itself never fails: unreadable input becomes a verdict.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to load classifier model: {0}")]
    ModelLoad(#[from] ModelError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
