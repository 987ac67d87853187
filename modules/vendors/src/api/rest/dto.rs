use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{
    AvailabilityEntry, Location, NewReview, PricingTier, ProfileInput, Review,
};
use crate::domain::model::{Listing, Owner, SearchQuery, SearchResult, VendorDetail};
use crate::domain::search::{SearchFilter, SortKey};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OwnerDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<Owner> for OwnerDto {
    fn from(o: Owner) -> Self {
        Self {
            id: o.id,
            name: o.name,
            email: o.email,
        }
    }
}

/// Full profile, as shown on a vendor page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VendorDto {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OwnerDto>,
    pub business_name: Option<String>,
    pub service_type: String,
    pub description: Option<String>,
    pub location: Location,
    pub pricing_tiers: Vec<PricingTier>,
    pub availability: Vec<AvailabilityEntry>,
    pub portfolio: Vec<String>,
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub contact_phone: Option<String>,
    pub years_of_experience: u32,
    pub response_time: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VendorDetail> for VendorDto {
    fn from(d: VendorDetail) -> Self {
        let p = d.profile;
        Self {
            id: p.id,
            user: d.owner.map(Into::into),
            business_name: p.business_name,
            service_type: p.service_type,
            description: p.description,
            location: p.location,
            pricing_tiers: p.pricing_tiers,
            availability: p.availability,
            portfolio: p.portfolio,
            reviews: p.reviews,
            average_rating: p.average_rating,
            total_reviews: p.total_reviews,
            contact_phone: p.contact_phone,
            years_of_experience: p.years_of_experience,
            response_time: p.response_time,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Search projection: no reviews, no calendar.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListingDto {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OwnerDto>,
    pub business_name: Option<String>,
    pub service_type: String,
    pub description: Option<String>,
    pub location: Location,
    pub pricing_tiers: Vec<PricingTier>,
    pub portfolio: Vec<String>,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub years_of_experience: u32,
    pub response_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available_on_date: Option<bool>,
    pub min_package_price: Option<f64>,
    pub max_package_price: Option<f64>,
}

impl From<Listing> for ListingDto {
    fn from(l: Listing) -> Self {
        let hit = l.hit;
        let p = hit.profile;
        Self {
            id: p.id,
            user: l.owner.map(Into::into),
            business_name: p.business_name,
            service_type: p.service_type,
            description: p.description,
            location: p.location,
            pricing_tiers: p.pricing_tiers,
            portfolio: p.portfolio,
            average_rating: p.average_rating,
            total_reviews: p.total_reviews,
            years_of_experience: p.years_of_experience,
            response_time: p.response_time,
            distance: hit.distance.map(|d| d.round()),
            is_available_on_date: hit.is_available_on_date,
            min_package_price: hit.min_package_price,
            max_package_price: hit.max_package_price,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicSearchQuery {
    pub city: Option<String>,
    /// Older clients send `location` for the city.
    pub location: Option<String>,
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvancedSearchParams {
    pub service_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub date: Option<NaiveDate>,
    pub min_rating: Option<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub max_distance: Option<f64>,
    pub sort_by: Option<SortKey>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl From<AdvancedSearchParams> for SearchQuery {
    fn from(p: AdvancedSearchParams) -> Self {
        Self {
            service_type: p.service_type,
            city: p.city,
            state: p.state,
            min_price: p.min_price,
            max_price: p.max_price,
            date: p.date,
            min_rating: p.min_rating,
            lat: p.lat,
            lon: p.lon,
            max_distance: p.max_distance,
            sort_by: p.sort_by,
            page: p.page,
            limit: p.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationDto {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_results: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FiltersDto {
    pub service_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub date: Option<NaiveDate>,
    pub min_rating: f64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub max_distance: f64,
    pub sort_by: SortKey,
}

impl From<&SearchFilter> for FiltersDto {
    fn from(f: &SearchFilter) -> Self {
        Self {
            service_type: f.service_type.clone(),
            city: f.city.clone(),
            state: f.state.clone(),
            min_price: f.min_price,
            max_price: f.max_price,
            date: f.date,
            min_rating: f.min_rating,
            lat: f.near.map(|c| c.lat),
            lon: f.near.map(|c| c.lon),
            max_distance: f.max_distance,
            sort_by: f.sort_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResponse {
    pub vendors: Vec<ListingDto>,
    pub pagination: PaginationDto,
    pub filters: FiltersDto,
}

impl From<SearchResult> for SearchResponse {
    fn from(r: SearchResult) -> Self {
        let pagination = PaginationDto {
            current_page: r.filter.page,
            total_pages: r.total_pages(),
            total_results: r.total,
            limit: r.filter.limit,
        };
        let filters = FiltersDto::from(&r.filter);
        Self {
            vendors: r.listings.into_iter().map(Into::into).collect(),
            pagination,
            filters,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProfileReq {
    #[serde(default)]
    pub business_name: Option<String>,
    pub service_type: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: Location,
    #[serde(default)]
    pub pricing_tiers: Vec<PricingTier>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub years_of_experience: u32,
    #[serde(default)]
    pub response_time: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

impl From<ProfileReq> for ProfileInput {
    fn from(r: ProfileReq) -> Self {
        Self {
            business_name: r.business_name,
            service_type: r.service_type,
            description: r.description,
            location: r.location,
            pricing_tiers: r.pricing_tiers,
            contact_phone: r.contact_phone,
            years_of_experience: r.years_of_experience,
            response_time: r.response_time,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetAvailabilityReq {
    pub dates: Vec<AvailabilityEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailabilityDto {
    pub vendor_id: Uuid,
    pub availability: Vec<AvailabilityEntry>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PortfolioReq {
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PortfolioDto {
    pub portfolio: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReviewReq {
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub booking_id: Option<Uuid>,
}

impl From<ReviewReq> for NewReview {
    fn from(r: ReviewReq) -> Self {
        Self {
            rating: r.rating,
            comment: r.comment,
            booking_id: r.booking_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewAddedDto {
    pub review: Option<Review>,
    pub average_rating: f64,
    pub total_reviews: u32,
}
