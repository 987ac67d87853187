use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use modkit::{AuthUser, ProblemResponse, Role};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    AdvancedSearchParams, AvailabilityDto, AvailabilityRange, BasicSearchQuery, PortfolioDto,
    PortfolioReq, ProfileReq, ReviewAddedDto, ReviewReq, SearchResponse, SetAvailabilityReq,
    VendorDto,
};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::AvailabilityEntry;
use crate::domain::model::VendorDetail;
use crate::domain::service::Service;

pub async fn basic_search(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Query(q): Query<BasicSearchQuery>,
) -> Result<Json<Vec<VendorDto>>, ProblemResponse> {
    let city = q.city.or(q.location);
    match svc.basic_search(city, q.service_type).await {
        Ok(found) => Ok(Json(found.into_iter().map(Into::into).collect())),
        Err(e) => {
            error!("Vendor search failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn advanced_search(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Query(params): Query<AdvancedSearchParams>,
) -> Result<Json<SearchResponse>, ProblemResponse> {
    match svc.advanced_search(params.into()).await {
        Ok(result) => Ok(Json(result.into())),
        Err(e) => {
            error!("Advanced vendor search failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_own_profile(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<VendorDto>, ProblemResponse> {
    user.require_role(Role::Vendor)?;
    svc.get_own_profile(user.id)
        .await
        .map(|d| Json(d.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn upsert_profile(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<ProfileReq>,
) -> Result<Json<VendorDto>, ProblemResponse> {
    user.require_role(Role::Vendor)?;
    info!(user_id = %user.id, "saving vendor profile");
    match svc.upsert_profile(user.id, req.into()).await {
        Ok(profile) => Ok(Json(
            VendorDetail {
                profile,
                owner: None,
            }
            .into(),
        )),
        Err(e) => {
            error!("Failed to save vendor profile: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn set_availability(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<SetAvailabilityReq>,
) -> Result<Json<Vec<AvailabilityEntry>>, ProblemResponse> {
    user.require_role(Role::Vendor)?;
    match svc.set_availability(user.id, req.dates).await {
        Ok(calendar) => Ok(Json(calendar)),
        Err(e) => {
            error!("Failed to update availability: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn add_portfolio_image(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<PortfolioReq>,
) -> Result<(StatusCode, Json<PortfolioDto>), ProblemResponse> {
    user.require_role(Role::Vendor)?;
    match svc.add_portfolio_image(user.id, &req.image_url).await {
        Ok(portfolio) => Ok((StatusCode::CREATED, Json(PortfolioDto { portfolio }))),
        Err(e) => {
            info!("Portfolio image rejected: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_vendor(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorDto>, ProblemResponse> {
    match svc.get_vendor(id).await {
        Ok(d) => Ok(Json(d.into())),
        Err(e) => {
            error!("Failed to get vendor {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_availability(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Query(range): Query<AvailabilityRange>,
) -> Result<Json<AvailabilityDto>, ProblemResponse> {
    svc.availability(id, range.start, range.end)
        .await
        .map(|availability| {
            Json(AvailabilityDto {
                vendor_id: id,
                availability,
            })
        })
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn add_review(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewReq>,
) -> Result<(StatusCode, Json<ReviewAddedDto>), ProblemResponse> {
    info!(vendor_id = %id, user_id = %user.id, rating = req.rating, "adding review");
    match svc.add_review(id, user.id, req.into()).await {
        Ok(profile) => Ok((
            StatusCode::CREATED,
            Json(ReviewAddedDto {
                review: profile.reviews.last().cloned(),
                average_rating: profile.average_rating,
                total_reviews: profile.total_reviews,
            }),
        )),
        Err(e) => {
            info!("Review rejected: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
