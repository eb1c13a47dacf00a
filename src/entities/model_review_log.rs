use super::printing_model::VisibilityStatus;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only audit row for model visibility changes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "model_review_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub model_id: Uuid,
    /// Employee who reviewed; `None` for the owner's own submission.
    #[sea_orm(nullable)]
    pub reviewer_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub previous_status: Option<VisibilityStatus>,
    pub new_status: VisibilityStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::printing_model::Entity",
        from = "Column::ModelId",
        to = "super::printing_model::Column::Id",
        on_delete = "Cascade"
    )]
    PrintingModel,
}

impl Related<super::printing_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrintingModel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
