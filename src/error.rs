use thiserror::Error;

/// Failures surfaced by the store and the statistics layer.
///
/// Every variant maps onto one wire error code so handlers can forward it
/// without re-classifying.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    BadParams(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{source}")]
    Db {
        code: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    pub fn bad_params(message: impl Into<String>) -> Self {
        StoreError::BadParams(message.into())
    }

    pub fn query(source: rusqlite::Error) -> Self {
        StoreError::Db {
            code: "db_query_failed",
            source,
        }
    }

    pub fn insert(source: rusqlite::Error) -> Self {
        StoreError::Db {
            code: "db_insert_failed",
            source,
        }
    }

    pub fn update(source: rusqlite::Error) -> Self {
        StoreError::Db {
            code: "db_update_failed",
            source,
        }
    }

    pub fn delete(source: rusqlite::Error) -> Self {
        StoreError::Db {
            code: "db_delete_failed",
            source,
        }
    }

    pub fn tx(source: rusqlite::Error) -> Self {
        StoreError::Db {
            code: "db_tx_failed",
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoreError::BadParams(_) => "bad_params",
            StoreError::NotFound(_) => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::Db { code, .. } => code,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
