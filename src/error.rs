use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Source dataset is unreadable or structurally invalid. Fatal at startup.
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// Search text is blank or unusable. Recoverable, caller re-prompts.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Target user has no rating history (guest or unknown id). Not a
    /// failure: callers suppress the personalized section instead of
    /// surfacing an error.
    #[error("No rating history for user {user_id}")]
    ColdStart { user_id: u32 },
}

impl EngineError {
    pub fn is_cold_start(&self) -> bool {
        matches!(self, EngineError::ColdStart { .. })
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::DataLoad(err.to_string())
    }
}

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        EngineError::DataLoad(err.to_string())
    }
}
