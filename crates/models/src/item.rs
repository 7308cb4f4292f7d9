use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{item_request, user};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
    Request,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity)
                .from(Column::OwnerId)
                .to(user::Column::Id)
                .into(),
            Relation::Request => Entity::belongs_to(item_request::Entity)
                .from(Column::RequestId)
                .to(item_request::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Owner.def() }
}

impl Related<item_request::Entity> for Entity {
    fn to() -> RelationDef { Relation::Request.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields of an item about to be inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

impl NewItem {
    pub fn validate(&self) -> Result<(), errors::ModelError> {
        if self.name.is_empty() || self.description.is_empty() {
            return Err(errors::ModelError::Validation("name and description are required".into()));
        }
        Ok(())
    }
}

pub async fn create(db: &DatabaseConnection, new: NewItem) -> Result<Model, errors::ModelError> {
    new.validate()?;
    let am = ActiveModel {
        name: Set(new.name),
        description: Set(new.description),
        available: Set(new.available),
        owner_id: Set(new.owner_id),
        request_id: Set(new.request_id),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
