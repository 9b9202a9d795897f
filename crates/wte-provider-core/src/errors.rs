pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider was not found: {0}")]
    NotFound(String),
    #[error("provider already registered: {0}")]
    AlreadyRegistered(String),
    #[error("provider not registered")]
    NotRegistered,
    #[error("provider {name} failed to register: {source}")]
    RegistrationFailed {
        name: String,
        #[source]
        source: BoxError,
    },
}
