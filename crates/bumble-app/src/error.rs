use bumble_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Please log in first")]
    NotLoggedIn,

    #[error("Pick image(s) first")]
    NoFiles,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type AppResult<T> = Result<T, AppError>;
