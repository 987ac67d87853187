use chrono::NaiveDate;
use uuid::Uuid;

use crate::contract::model::VendorProfile;
use crate::domain::search::{Candidate, SearchFilter, SortKey};

/// Public fields of the user that owns a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct VendorDetail {
    pub profile: VendorProfile,
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone)]
pub struct Listing {
    pub hit: Candidate,
    pub owner: Option<Owner>,
}

/// Raw advanced-search parameters as they arrive from the query string.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
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

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub listings: Vec<Listing>,
    pub total: u64,
    /// The filter after defaults were applied.
    pub filter: SearchFilter,
}

impl SearchResult {
    pub fn total_pages(&self) -> u64 {
        if self.filter.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.filter.limit)
    }
}
