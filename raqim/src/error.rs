use thiserror::Error;

#[derive(Error, Debug)]
pub enum RaqimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine initialization error: {0}")]
    EngineInit(String),

    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("Preprocessing error: {0}")]
    Preprocessing(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RaqimError>;
