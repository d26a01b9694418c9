//! Family membership endpoints: create, join, member administration, leave.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    generate_join_code, CreateFamilyRequest, FamilyMember, FamilyResponse, JoinFamilyRequest,
    LeaveFamilyRequest, SetDeputyRequest,
};
use domain::services::membership;
use domain::DomainError;
use persistence::changes::{ChangeCollection, ChangeOp, FamilyChange};
use persistence::repositories::{FamilyRepository, UserRepository};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// POST /api/v1/families
pub async fn create_family(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(req): Json<CreateFamilyRequest>,
) -> Result<(StatusCode, Json<FamilyResponse>), ApiError> {
    req.validate()?;

    let user = super::current_user(&state, &auth).await?;
    if user.family_code.is_some() {
        return Err(ApiError::Conflict(
            "Leave your current family before creating a new one".into(),
        ));
    }

    let families = FamilyRepository::new(state.pool.clone());
    let code = families.generate_unique_code(generate_join_code).await?;
    let family = families.create(&code, req.name.trim(), user.id).await?;

    tracing::info!(family_code = %family.code, user_id = %user.id, "family created");

    state.change_hub.publish(FamilyChange {
        family_code: family.code.clone(),
        collection: ChangeCollection::Families,
        entity_id: user.id,
        op: ChangeOp::Created,
    });

    Ok((StatusCode::CREATED, Json(family.into())))
}

/// POST /api/v1/families/join
pub async fn join_family(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(req): Json<JoinFamilyRequest>,
) -> Result<Json<FamilyResponse>, ApiError> {
    req.validate()?;

    let user = super::current_user(&state, &auth).await?;
    if user.family_code.is_some() {
        return Err(ApiError::Conflict(
            "Leave your current family before joining another".into(),
        ));
    }

    let families = FamilyRepository::new(state.pool.clone());
    families
        .find_by_code(&req.code)
        .await?
        .ok_or(DomainError::InvalidCode)?;

    let family = families.add_member(&req.code, user.id).await?;

    tracing::info!(family_code = %family.code, user_id = %user.id, "member joined family");

    state.change_hub.publish(FamilyChange {
        family_code: family.code.clone(),
        collection: ChangeCollection::Families,
        entity_id: user.id,
        op: ChangeOp::Updated,
    });

    Ok(Json(family.into()))
}

/// GET /api/v1/families/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<FamilyMember>>, ApiError> {
    let (_, family) = super::family_scope(&state, &auth).await?;

    let users = UserRepository::new(state.pool.clone())
        .find_by_ids(&family.members)
        .await?;

    Ok(Json(membership::resolve_members(&family, &users)))
}

/// PUT /api/v1/families/deputy
pub async fn set_deputy(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(req): Json<SetDeputyRequest>,
) -> Result<Json<FamilyResponse>, ApiError> {
    let (user, family) = super::family_scope(&state, &auth).await?;

    membership::ensure_can_set_deputy(&family, user.id, req.member_id)?;

    let updated = FamilyRepository::new(state.pool.clone())
        .set_deputy(&family.code, req.member_id)
        .await?;

    tracing::info!(family_code = %family.code, deputy_id = %req.member_id, "deputy designated");

    state.change_hub.publish(FamilyChange {
        family_code: family.code,
        collection: ChangeCollection::Families,
        entity_id: req.member_id,
        op: ChangeOp::Updated,
    });

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/families/members/:member_id
pub async fn remove_member(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(member_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let (user, family) = super::family_scope(&state, &auth).await?;

    membership::ensure_can_remove(&family, user.id, member_id)?;

    FamilyRepository::new(state.pool.clone())
        .remove_member(&family.code, member_id)
        .await?;

    tracing::info!(family_code = %family.code, member_id = %member_id, "member removed");

    state.change_hub.publish(FamilyChange {
        family_code: family.code,
        collection: ChangeCollection::Families,
        entity_id: member_id,
        op: ChangeOp::Updated,
    });

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/families/leave
pub async fn leave_family(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(req): Json<LeaveFamilyRequest>,
) -> Result<StatusCode, ApiError> {
    let (user, family) = super::family_scope(&state, &auth).await?;

    let plan = membership::plan_leave(&family, user.id, req.successor_id)?;

    FamilyRepository::new(state.pool.clone())
        .leave(&family.code, user.id, plan.new_creator)
        .await?;

    tracing::info!(family_code = %family.code, user_id = %user.id, "member left family");

    state.change_hub.publish(FamilyChange {
        family_code: family.code,
        collection: ChangeCollection::Families,
        entity_id: user.id,
        op: ChangeOp::Updated,
    });

    Ok(StatusCode::NO_CONTENT)
}
