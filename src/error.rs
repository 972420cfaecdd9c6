use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlvError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("container format error: {0}")]
    Format(String),

    #[error("session error: {0}")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, FlvError>;
