//! Ownership checks shared by the resource routes
//!
//! Every lookup runs the 404 check before the 403 check: a missing row is
//! reported as missing even to callers who could not have seen it.

use farmctl_core::{Crop, Farm};
use sqlx::PgPool;
use uuid::Uuid;

use super::error::ApiError;
use crate::clients::AuthUser;
use crate::db::{CropRepo, FarmRepo, MemberRepo};

/// 403 unless the user belongs to the organization.
pub async fn require_member(
    pool: &PgPool,
    organization_id: Uuid,
    user: &AuthUser,
) -> Result<(), ApiError> {
    if MemberRepo::new(pool).is_member(organization_id, user.id).await? {
        Ok(())
    } else {
        tracing::warn!(%organization_id, user_id = %user.id, "Access denied");
        Err(ApiError::forbidden())
    }
}

/// Load a farm the user may act on.
pub async fn farm_for_user(pool: &PgPool, farm_id: Uuid, user: &AuthUser) -> Result<Farm, ApiError> {
    let farm = FarmRepo::new(pool).get(farm_id).await?;
    require_member(pool, farm.organization_id, user).await?;
    Ok(farm)
}

/// Load a crop the user may act on, through its farm.
pub async fn crop_for_user(pool: &PgPool, crop_id: Uuid, user: &AuthUser) -> Result<Crop, ApiError> {
    let crop = CropRepo::new(pool).get(crop_id).await?;
    farm_for_user(pool, crop.farm_id, user).await?;
    Ok(crop)
}
