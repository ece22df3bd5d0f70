pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] gridscope_layout::Error),

    #[error("invalid {view} config: {message}")]
    InvalidConfig { view: &'static str, message: String },
}
