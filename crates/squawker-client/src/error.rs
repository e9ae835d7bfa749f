use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("list controller task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
