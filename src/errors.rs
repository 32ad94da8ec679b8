use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("session closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, SessionError>;
