//! Calendar endpoints: task/event ledger and the family leaderboard.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CalendarItemResponse, CreateCalendarItemRequest, LeaderboardEntry, ListCalendarItemsQuery,
    UpdateCalendarItemRequest,
};
use domain::services::ledger;
use domain::DomainError;
use persistence::changes::{ChangeCollection, ChangeOp, FamilyChange};
use persistence::repositories::{CalendarItemRepository, NewCalendarItem, UserRepository};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::record_task_completed;

/// GET /api/v1/calendar
pub async fn list_items(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListCalendarItemsQuery>,
) -> Result<Json<Vec<CalendarItemResponse>>, ApiError> {
    let (_, family) = super::family_scope(&state, &auth).await?;

    let items = CalendarItemRepository::new(state.pool.clone())
        .list_for_family(&family.code)
        .await?;

    // Day and kind filtering live in the ledger, next to the capability and
    // point rules that read the same items.
    let view = ledger::items_on(&items, query.date, query.kind);

    Ok(Json(view.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/calendar
pub async fn create_item(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(req): Json<CreateCalendarItemRequest>,
) -> Result<(StatusCode, Json<CalendarItemResponse>), ApiError> {
    req.validate()?;

    let (user, family) = super::family_scope(&state, &auth).await?;

    let item = CalendarItemRepository::new(state.pool.clone())
        .create(NewCalendarItem {
            family_code: &family.code,
            title: req.title.trim(),
            date: req.date,
            color_tag: &req.color_tag,
            kind: req.kind.into(),
            assignee: req.assignee.as_deref(),
            created_by: user.id,
            created_by_name: &user.name,
        })
        .await?;

    tracing::debug!(item_id = %item.id, family_code = %family.code, "calendar item created");

    state.change_hub.publish(FamilyChange {
        family_code: family.code,
        collection: ChangeCollection::CalendarItems,
        entity_id: item.id,
        op: ChangeOp::Created,
    });

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PUT /api/v1/calendar/:item_id
pub async fn update_item(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdateCalendarItemRequest>,
) -> Result<Json<CalendarItemResponse>, ApiError> {
    req.validate()?;

    let (user, family) = super::family_scope(&state, &auth).await?;
    let repo = CalendarItemRepository::new(state.pool.clone());

    let item = repo
        .find_by_id(item_id)
        .await?
        .filter(|item| item.family_code == family.code)
        .ok_or(DomainError::not_found("Calendar item not found"))?;

    if !ledger::can_modify(&item, &user) {
        return Err(DomainError::forbidden(
            "Only the item's creator or assignee can edit it",
        )
        .into());
    }

    let updated = repo
        .update(
            item_id,
            req.title.trim(),
            req.date,
            &req.color_tag,
            req.assignee.as_deref(),
        )
        .await?;

    state.change_hub.publish(FamilyChange {
        family_code: family.code,
        collection: ChangeCollection::CalendarItems,
        entity_id: item_id,
        op: ChangeOp::Updated,
    });

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/calendar/:item_id
pub async fn delete_item(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let (user, family) = super::family_scope(&state, &auth).await?;
    let repo = CalendarItemRepository::new(state.pool.clone());

    let item = repo
        .find_by_id(item_id)
        .await?
        .filter(|item| item.family_code == family.code)
        .ok_or(DomainError::not_found("Calendar item not found"))?;

    if item.created_by != user.id {
        return Err(DomainError::forbidden("Only the item's creator can delete it").into());
    }

    repo.delete(item_id).await?;

    state.change_hub.publish(FamilyChange {
        family_code: family.code,
        collection: ChangeCollection::CalendarItems,
        entity_id: item_id,
        op: ChangeOp::Deleted,
    });

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/calendar/:item_id/complete
pub async fn complete_item(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(item_id): Path<Uuid>,
) -> Result<Json<CalendarItemResponse>, ApiError> {
    let (user, family) = super::family_scope(&state, &auth).await?;
    let repo = CalendarItemRepository::new(state.pool.clone());

    let item = repo
        .find_by_id(item_id)
        .await?
        .filter(|item| item.family_code == family.code)
        .ok_or(DomainError::not_found("Calendar item not found"))?;

    if !ledger::can_complete(&item, &user) {
        return Err(DomainError::forbidden(
            "Only the assignee can complete an open task",
        )
        .into());
    }

    // A concurrent completion loses the race here and gets the same
    // "no longer available" answer as a stale client.
    let completed = repo
        .complete(item_id)
        .await?
        .ok_or(DomainError::not_found("Task is no longer available"))?;

    record_task_completed();
    tracing::debug!(item_id = %item_id, user_id = %user.id, "task completed");

    state.change_hub.publish(FamilyChange {
        family_code: family.code,
        collection: ChangeCollection::CalendarItems,
        entity_id: item_id,
        op: ChangeOp::Updated,
    });

    Ok(Json(completed.into()))
}

/// GET /api/v1/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let (_, family) = super::family_scope(&state, &auth).await?;

    let items = CalendarItemRepository::new(state.pool.clone())
        .list_for_family(&family.code)
        .await?;

    let users = UserRepository::new(state.pool.clone())
        .find_by_ids(&family.members)
        .await?;

    // Members in family-record order, so leaderboard ties stay stable.
    let members: Vec<(Uuid, String)> = family
        .members
        .iter()
        .filter_map(|id| {
            users
                .iter()
                .find(|u| u.id == *id)
                .map(|u| (*id, u.name.clone()))
        })
        .collect();

    Ok(Json(ledger::leaderboard(&items, &members)))
}
