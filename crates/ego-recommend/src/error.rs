use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
