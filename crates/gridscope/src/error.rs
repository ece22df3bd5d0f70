pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] gridscope_core::Error),
    #[error(transparent)]
    Render(#[from] gridscope_render::Error),
}
