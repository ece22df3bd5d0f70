#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("circle {index} has an invalid radius: {radius}")]
    InvalidRadius { index: usize, radius: f64 },
    #[error("force node {index} has a non-finite position or anchor")]
    NonFiniteNode { index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
