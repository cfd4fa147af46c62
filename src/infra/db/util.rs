use crate::application::store::StoreError;

pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.message().contains("duplicate key") => {
            StoreError::Duplicate {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            }
        }
        sqlx::Error::Database(db) if db.message().contains("invalid input syntax") => {
            StoreError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        sqlx::Error::Database(db)
            if db
                .message()
                .contains("canceling statement due to user request") =>
        {
            StoreError::Timeout
        }
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        other => StoreError::from_persistence(other),
    }
}
