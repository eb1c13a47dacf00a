use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An uploaded printable model. `slicing_info.weight_g` drives pricing.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "printing_models")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub model_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(nullable)]
    pub category: Option<String>,
    pub visibility_status: VisibilityStatus,
    pub stl_file_path: String,
    #[sea_orm(nullable)]
    pub gcode_file_path: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub slicing_info: Option<Json>,
    pub view_count: i32,
    pub download_count: i32,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::model_review_log::Entity")]
    ReviewLogs,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::model_review_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Sliced weight in grams, if the model has been sliced.
    pub fn weight_g(&self) -> Option<rust_decimal::Decimal> {
        crate::services::pricing::weight_from_slicing_info(self.slicing_info.as_ref())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisibilityStatus {
    #[sea_orm(string_value = "PRIVATE")]
    Private,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PUBLIC")]
    Public,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl VisibilityStatus {
    /// Review workflow: Private/Rejected -> Pending -> Public/Rejected.
    pub fn can_transition_to(self, next: VisibilityStatus) -> bool {
        use VisibilityStatus::*;
        matches!(
            (self, next),
            (Private, Pending) | (Rejected, Pending) | (Pending, Public) | (Pending, Rejected)
        )
    }
}

impl std::fmt::Display for VisibilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VisibilityStatus::Private => "PRIVATE",
            VisibilityStatus::Pending => "PENDING",
            VisibilityStatus::Public => "PUBLIC",
            VisibilityStatus::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}
