use models::errors::ModelError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i64) -> Self { Self::NotFound(format!("{} with id = {} not found", entity, id)) }

    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

    /// Reason text without the variant prefix, as shown to API clients.
    pub fn reason(&self) -> &str {
        match self {
            ServiceError::Validation(m)
            | ServiceError::NotFound(m)
            | ServiceError::Conflict(m)
            | ServiceError::Db(m) => m,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        if e.is_unique_violation() {
            return ServiceError::Conflict("name or email is already in use".into());
        }
        match e {
            ModelError::Validation(m) => ServiceError::Validation(m),
            ModelError::Db(db) => ServiceError::Db(db.to_string()),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self { ModelError::Db(e).into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_strips_prefix() {
        let e = ServiceError::not_found("item", 7);
        assert_eq!(e.reason(), "item with id = 7 not found");
        assert_eq!(e.to_string(), "not found: item with id = 7 not found");
    }

    #[test]
    fn model_validation_stays_validation() {
        let e: ServiceError = ModelError::Validation("name required".into()).into();
        assert_eq!(e, ServiceError::Validation("name required".into()));
        let e: ServiceError = DbErr::Custom("boom".into()).into();
        assert!(matches!(e, ServiceError::Db(_)));
    }
}
