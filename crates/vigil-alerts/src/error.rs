use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    /// A store read or the batched deactivation failed; the sweep is aborted
    /// and pending deactivations re-apply next tick.
    #[error("Store error: {0}")]
    Store(#[from] vigil_store::StoreError),
}

pub type Result<T> = std::result::Result<T, AlertError>;
