use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::user;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_request")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub description: String,
    pub requester_id: i64,
    pub created: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Requester,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Requester => Entity::belongs_to(user::Entity)
                .from(Column::RequesterId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Requester.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    requester_id: i64,
    description: &str,
    created: DateTime,
) -> Result<Model, errors::ModelError> {
    if description.trim().is_empty() {
        return Err(errors::ModelError::Validation("description required".into()));
    }
    let am = ActiveModel {
        description: Set(description.to_string()),
        requester_id: Set(requester_id),
        created: Set(created),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
