use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("catalog returned no publishable products")]
    EmptyCatalog,
}
