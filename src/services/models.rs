//! Printable model catalogue and the staff review workflow.

use crate::{
    auth::AuthUser,
    entities::{
        model_review_log::{self, Entity as ReviewLogEntity},
        order_item,
        printing_model::{self, Entity as PrintingModelEntity, VisibilityStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::pricing::check_slicing_info,
};
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Who is looking at the catalogue. Guests are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Uuid,
    pub is_staff: bool,
}

impl From<&AuthUser> for Viewer {
    fn from(user: &AuthUser) -> Self {
        Self {
            user_id: user.user_id,
            is_staff: user.is_staff(),
        }
    }
}

/// Guests see public models, owners see their own, staff also see the
/// review queue.
pub fn can_view(model: &printing_model::Model, viewer: Option<&Viewer>) -> bool {
    match model.visibility_status {
        VisibilityStatus::Public => true,
        status => viewer.map_or(false, |v| {
            v.user_id == model.owner_id || (v.is_staff && status == VisibilityStatus::Pending)
        }),
    }
}

fn visible_to(viewer: Option<&Viewer>) -> Condition {
    let public = printing_model::Column::VisibilityStatus.eq(VisibilityStatus::Public);
    match viewer {
        None => Condition::all().add(public),
        Some(v) => {
            let mut cond = Condition::any()
                .add(public)
                .add(printing_model::Column::OwnerId.eq(v.user_id));
            if v.is_staff {
                cond = cond.add(printing_model::Column::VisibilityStatus.eq(VisibilityStatus::Pending));
            }
            cond
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateModelRequest {
    #[validate(length(min = 1, max = 255, message = "Model name is required"))]
    pub model_name: String,
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1, message = "STL file path is required"))]
    pub stl_file_path: String,
    pub gcode_file_path: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub slicing_info: Option<Json>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateModelRequest {
    #[validate(length(min = 1, max = 255))]
    pub model_name: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1))]
    pub stl_file_path: Option<String>,
    pub gcode_file_path: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub slicing_info: Option<Json>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub reason: Option<String>,
}

/// Query string for catalogue listings.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModelFilter {
    pub is_featured: Option<bool>,
    pub category: Option<String>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
}

impl ModelFilter {
    fn apply(&self, mut query: Select<PrintingModelEntity>) -> Select<PrintingModelEntity> {
        if let Some(featured) = self.is_featured {
            query = query.filter(printing_model::Column::IsFeatured.eq(featured));
        }
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(printing_model::Column::Category)))
                    .eq(category.to_lowercase()),
            );
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(printing_model::Column::ModelName)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(printing_model::Column::Description)))
                            .like(pattern),
                    ),
            );
        }
        query
    }
}

#[derive(Clone)]
pub struct ModelService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ModelService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(owner_id = %owner_id))]
    pub async fn create(
        &self,
        owner_id: Uuid,
        request: CreateModelRequest,
    ) -> Result<printing_model::Model, ServiceError> {
        request.validate()?;
        check_slicing_info(request.slicing_info.as_ref())?;
        let now = Utc::now();
        let model = printing_model::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            model_name: Set(request.model_name.trim().to_string()),
            description: Set(request.description),
            category: Set(request.category),
            visibility_status: Set(VisibilityStatus::Private),
            stl_file_path: Set(request.stl_file_path),
            gcode_file_path: Set(request.gcode_file_path),
            slicing_info: Set(request.slicing_info),
            view_count: Set(0),
            download_count: Set(0),
            is_featured: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(model_id = %model.id, "model created");
        Ok(model)
    }

    /// Models the viewer may see, newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        viewer: Option<Viewer>,
        filter: ModelFilter,
    ) -> Result<Vec<printing_model::Model>, ServiceError> {
        let query = PrintingModelEntity::find().filter(visible_to(viewer.as_ref()));
        Ok(filter
            .apply(query)
            .order_by_desc(printing_model::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        viewer: Option<Viewer>,
        id: Uuid,
    ) -> Result<printing_model::Model, ServiceError> {
        let model = find_model(&*self.db, id).await?;
        if !can_view(&model, viewer.as_ref()) {
            return Err(ServiceError::not_found("Model", id));
        }
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn my_models(&self, owner_id: Uuid) -> Result<Vec<printing_model::Model>, ServiceError> {
        Ok(PrintingModelEntity::find()
            .filter(printing_model::Column::OwnerId.eq(owner_id))
            .order_by_desc(printing_model::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        viewer: Viewer,
        id: Uuid,
        request: UpdateModelRequest,
    ) -> Result<printing_model::Model, ServiceError> {
        request.validate()?;
        check_slicing_info(request.slicing_info.as_ref())?;
        let model = self.owned_model(viewer, id, "Only the owner can modify this model").await?;

        let mut active: printing_model::ActiveModel = model.into();
        if let Some(name) = request.model_name {
            active.model_name = Set(name.trim().to_string());
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = request.category {
            active.category = Set(Some(category));
        }
        if let Some(path) = request.stl_file_path {
            active.stl_file_path = Set(path);
        }
        if let Some(path) = request.gcode_file_path {
            active.gcode_file_path = Set(Some(path));
        }
        if let Some(info) = request.slicing_info {
            active.slicing_info = Set(Some(info));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        info!(model_id = %id, "model updated");
        Ok(updated)
    }

    /// Models referenced by placed orders cannot be deleted.
    #[instrument(skip(self))]
    pub async fn delete(&self, viewer: Viewer, id: Uuid) -> Result<(), ServiceError> {
        let model = self.owned_model(viewer, id, "Only the owner can delete this model").await?;

        let ordered = order_item::Entity::find()
            .filter(order_item::Column::ModelId.eq(id))
            .count(&*self.db)
            .await?;
        if ordered > 0 {
            return Err(ServiceError::Conflict(
                "Model has been ordered and cannot be deleted".to_string(),
            ));
        }

        model.delete(&*self.db).await?;
        info!(model_id = %id, "model deleted");
        Ok(())
    }

    /// Owner moves a private or rejected model into the review queue.
    #[instrument(skip(self))]
    pub async fn submit_for_review(
        &self,
        viewer: Viewer,
        id: Uuid,
    ) -> Result<printing_model::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let model = find_model(&txn, id).await?;
        if !can_view(&model, Some(&viewer)) {
            return Err(ServiceError::not_found("Model", id));
        }
        if model.owner_id != viewer.user_id {
            return Err(ServiceError::Forbidden(
                "Only the owner can submit for review".to_string(),
            ));
        }
        if !model.visibility_status.can_transition_to(VisibilityStatus::Pending) {
            return Err(ServiceError::InvalidStatus(
                "Only private or rejected models can be submitted for review".to_string(),
            ));
        }

        let updated = transition(
            &txn,
            model,
            VisibilityStatus::Pending,
            None,
            Some("Submitted for review".to_string()),
        )
        .await?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::ModelSubmitted(id));
        info!(model_id = %id, "model submitted for review");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn pending_review(&self) -> Result<Vec<printing_model::Model>, ServiceError> {
        Ok(PrintingModelEntity::find()
            .filter(printing_model::Column::VisibilityStatus.eq(VisibilityStatus::Pending))
            .order_by_asc(printing_model::Column::UpdatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn approve(
        &self,
        reviewer_id: Uuid,
        id: Uuid,
        request: ReviewRequest,
    ) -> Result<printing_model::Model, ServiceError> {
        let reason = request
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "Approved".to_string());
        self.review(reviewer_id, id, VisibilityStatus::Public, reason).await
    }

    #[instrument(skip(self, request))]
    pub async fn reject(
        &self,
        reviewer_id: Uuid,
        id: Uuid,
        request: ReviewRequest,
    ) -> Result<printing_model::Model, ServiceError> {
        let reason = request
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        // Status is checked first so a non-pending model reports that instead.
        let model = find_model(&*self.db, id).await?;
        if model.visibility_status != VisibilityStatus::Pending {
            return Err(ServiceError::InvalidStatus(
                "Only pending models can be rejected".to_string(),
            ));
        }
        let Some(reason) = reason else {
            return Err(ServiceError::ValidationError(
                "Reason is required when rejecting a model".to_string(),
            ));
        };
        self.review(reviewer_id, id, VisibilityStatus::Rejected, reason).await
    }

    /// Review history, newest first.
    #[instrument(skip(self))]
    pub async fn review_logs(
        &self,
        viewer: Option<Viewer>,
        id: Uuid,
    ) -> Result<Vec<model_review_log::Model>, ServiceError> {
        let model = self.get(viewer, id).await?;
        Ok(model
            .find_related(ReviewLogEntity)
            .order_by_desc(model_review_log::Column::Timestamp)
            .all(&*self.db)
            .await?)
    }

    /// Marketplace listing: public models only.
    #[instrument(skip(self))]
    pub async fn list_public(&self, filter: ModelFilter) -> Result<Vec<printing_model::Model>, ServiceError> {
        let query = PrintingModelEntity::find()
            .filter(printing_model::Column::VisibilityStatus.eq(VisibilityStatus::Public));
        Ok(filter
            .apply(query)
            .order_by_desc(printing_model::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Retrieves a public model and counts the view.
    #[instrument(skip(self))]
    pub async fn view_public(&self, id: Uuid) -> Result<printing_model::Model, ServiceError> {
        let result = PrintingModelEntity::update_many()
            .col_expr(
                printing_model::Column::ViewCount,
                Expr::col(printing_model::Column::ViewCount).add(1),
            )
            .filter(printing_model::Column::Id.eq(id))
            .filter(printing_model::Column::VisibilityStatus.eq(VisibilityStatus::Public))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Model", id));
        }
        find_model(&*self.db, id).await
    }

    async fn review(
        &self,
        reviewer_id: Uuid,
        id: Uuid,
        next: VisibilityStatus,
        reason: String,
    ) -> Result<printing_model::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let model = find_model(&txn, id).await?;
        if model.visibility_status != VisibilityStatus::Pending {
            let verb = if next == VisibilityStatus::Public { "approved" } else { "rejected" };
            return Err(ServiceError::InvalidStatus(format!(
                "Only pending models can be {}",
                verb
            )));
        }

        let updated = transition(&txn, model, next, Some(reviewer_id), Some(reason)).await?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::ModelReviewed {
            model_id: id,
            new_status: next.to_string(),
        });
        info!(model_id = %id, reviewer_id = %reviewer_id, new_status = %next, "model reviewed");
        Ok(updated)
    }

    async fn owned_model(
        &self,
        viewer: Viewer,
        id: Uuid,
        forbidden: &str,
    ) -> Result<printing_model::Model, ServiceError> {
        let model = find_model(&*self.db, id).await?;
        if !can_view(&model, Some(&viewer)) {
            return Err(ServiceError::not_found("Model", id));
        }
        if model.owner_id != viewer.user_id {
            return Err(ServiceError::Forbidden(forbidden.to_string()));
        }
        Ok(model)
    }
}

pub(crate) async fn find_model<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<printing_model::Model, ServiceError> {
    PrintingModelEntity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Model", id))
}

/// Updates the status and appends the matching review log row.
async fn transition<C: ConnectionTrait>(
    conn: &C,
    model: printing_model::Model,
    next: VisibilityStatus,
    reviewer_id: Option<Uuid>,
    reason: Option<String>,
) -> Result<printing_model::Model, ServiceError> {
    let previous = model.visibility_status;
    if !previous.can_transition_to(next) {
        return Err(ServiceError::InvalidStatus(format!(
            "Cannot change model status from {} to {}",
            previous, next
        )));
    }

    let now = Utc::now();
    model_review_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        model_id: Set(model.id),
        reviewer_id: Set(reviewer_id),
        previous_status: Set(Some(previous)),
        new_status: Set(next),
        reason: Set(reason),
        timestamp: Set(now),
    }
    .insert(conn)
    .await?;

    let mut active: printing_model::ActiveModel = model.into();
    active.visibility_status = Set(next);
    active.updated_at = Set(now);
    Ok(active.update(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(owner_id: Uuid, status: VisibilityStatus) -> printing_model::Model {
        let now = Utc::now();
        printing_model::Model {
            id: Uuid::new_v4(),
            owner_id,
            model_name: "Benchy".into(),
            description: None,
            category: None,
            visibility_status: status,
            stl_file_path: "models/benchy.stl".into(),
            gcode_file_path: None,
            slicing_info: None,
            view_count: 0,
            download_count: 0,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn guests_only_see_public_models() {
        let owner = Uuid::new_v4();
        assert!(can_view(&model(owner, VisibilityStatus::Public), None));
        assert!(!can_view(&model(owner, VisibilityStatus::Private), None));
        assert!(!can_view(&model(owner, VisibilityStatus::Pending), None));
    }

    #[test]
    fn owners_see_every_status() {
        let owner = Uuid::new_v4();
        let viewer = Viewer {
            user_id: owner,
            is_staff: false,
        };
        for status in [
            VisibilityStatus::Private,
            VisibilityStatus::Pending,
            VisibilityStatus::Rejected,
        ] {
            assert!(can_view(&model(owner, status), Some(&viewer)));
        }
    }

    #[test]
    fn staff_see_pending_but_not_private() {
        let staff = Viewer {
            user_id: Uuid::new_v4(),
            is_staff: true,
        };
        let owner = Uuid::new_v4();
        assert!(can_view(&model(owner, VisibilityStatus::Pending), Some(&staff)));
        assert!(!can_view(&model(owner, VisibilityStatus::Private), Some(&staff)));
        assert!(!can_view(&model(owner, VisibilityStatus::Rejected), Some(&staff)));
    }
}
