use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    Ok(())
}

/// Minimal shape check: something before and after a single `@`, and a dot in the domain.
pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if !common::is_well_formed_email(email) {
        return Err(errors::ModelError::Validation(format!("invalid email: {email}")));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, name: &str, email: &str) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    validate_email(email)?;
    let am = ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(validate_email("user@user.com").is_ok());
        assert!(validate_email("a.b@mail.example.org").is_ok());
        for bad in ["", "user", "user@", "@user.com", "us er@user.com", "user@@user.com", "user@com", "user@.com"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }
}
