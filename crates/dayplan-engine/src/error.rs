use dayplan_core::DayplanError;
use dayplan_service::ServiceError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Invalid(#[from] DayplanError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("no modal is open")]
    ModalClosed,

    #[error("no item selected")]
    NothingSelected,
}

impl EngineError {
    /// Message shown to the user in a notice.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::Service(ServiceError::Network(_)) => {
                "Server unavailable. Check your connection.".to_string()
            }
            EngineError::Service(ServiceError::Api { detail, .. }) => detail.clone(),
            EngineError::Service(ServiceError::NotFound(detail))
            | EngineError::Service(ServiceError::InvalidInput(detail)) => detail.clone(),
            other => other.to_string(),
        }
    }
}
