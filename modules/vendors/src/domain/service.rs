use std::collections::HashMap;
use std::sync::Arc;

use accounts::contract::AccountsApi;
use chrono::{NaiveDate, Utc};
use modkit::ClientHub;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::VendorsConfig;
use crate::contract::client::ReviewEligibility;
use crate::contract::model::{
    AvailabilityEntry, AvailabilityStatus, Coordinates, NewReview, ProfileInput, Review,
    VendorProfile,
};
use crate::domain::error::DomainError;
use crate::domain::model::{Listing, Owner, SearchQuery, SearchResult, VendorDetail};
use crate::domain::repo::{TextMatch, VendorsRepository};
use crate::domain::search::{self, SearchFilter, SortKey, Stage};

#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn VendorsRepository>,
    accounts: Option<Arc<dyn AccountsApi>>,
    hub: Arc<ClientHub>,
    config: VendorsConfig,
}

impl Service {
    pub fn new(
        repo: Arc<dyn VendorsRepository>,
        accounts: Option<Arc<dyn AccountsApi>>,
        hub: Arc<ClientHub>,
        config: VendorsConfig,
    ) -> Self {
        Self {
            repo,
            accounts,
            hub,
            config,
        }
    }

    /// Creates the caller's profile, or replaces its editable fields.
    /// Calendar, portfolio and reviews survive an update.
    #[instrument(name = "vendors.service.upsert_profile", skip(self, input), fields(user_id = %user_id))]
    pub async fn upsert_profile(
        &self,
        user_id: Uuid,
        input: ProfileInput,
    ) -> Result<VendorProfile, DomainError> {
        let input = validate_profile(input)?;
        let now = Utc::now();
        match self.find_by_user(user_id).await? {
            Some(mut profile) => {
                profile.business_name = input.business_name;
                profile.service_type = input.service_type;
                profile.description = input.description;
                profile.location = input.location;
                profile.pricing_tiers = input.pricing_tiers;
                profile.contact_phone = input.contact_phone;
                profile.years_of_experience = input.years_of_experience;
                profile.response_time = input.response_time;
                profile.is_active = input.is_active;
                profile.updated_at = now;
                self.repo
                    .update_details(&profile)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?;
                info!(vendor_id = %profile.id, "vendor profile updated");
                Ok(profile)
            }
            None => {
                let profile = VendorProfile {
                    id: Uuid::new_v4(),
                    user_id,
                    business_name: input.business_name,
                    service_type: input.service_type,
                    description: input.description,
                    location: input.location,
                    pricing_tiers: input.pricing_tiers,
                    availability: Vec::new(),
                    portfolio: Vec::new(),
                    reviews: Vec::new(),
                    average_rating: 0.0,
                    total_reviews: 0,
                    contact_phone: input.contact_phone,
                    years_of_experience: input.years_of_experience,
                    response_time: input.response_time,
                    is_active: input.is_active,
                    created_at: now,
                    updated_at: now,
                };
                self.repo
                    .insert(profile.clone())
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?;
                info!(vendor_id = %profile.id, "vendor profile created");
                Ok(profile)
            }
        }
    }

    #[instrument(name = "vendors.service.get_own_profile", skip(self), fields(user_id = %user_id))]
    pub async fn get_own_profile(&self, user_id: Uuid) -> Result<VendorDetail, DomainError> {
        let profile = self
            .find_by_user(user_id)
            .await?
            .ok_or(DomainError::ProfileMissing { user_id })?;
        Ok(self.with_owner(profile).await)
    }

    /// Profile owned by `user_id`, if any. No owner join.
    pub async fn profile_of_user(&self, user_id: Uuid) -> Result<Option<VendorProfile>, DomainError> {
        self.find_by_user(user_id).await
    }

    #[instrument(name = "vendors.service.get_vendor", skip(self), fields(vendor_id = %id))]
    pub async fn get_vendor(&self, id: Uuid) -> Result<VendorDetail, DomainError> {
        let profile = self.load(id).await?;
        Ok(self.with_owner(profile).await)
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<VendorProfile, DomainError> {
        self.load(id).await
    }

    /// Case-insensitive match on city and service type over active
    /// vendors, best rated first.
    #[instrument(name = "vendors.service.basic_search", skip(self))]
    pub async fn basic_search(
        &self,
        city: Option<String>,
        service_type: Option<String>,
    ) -> Result<Vec<VendorDetail>, DomainError> {
        let text = TextMatch {
            service_type: non_blank(service_type),
            city: non_blank(city),
            state: None,
        };
        let active = self.list_active(&text).await?;
        let stages = [
            Stage::Match {
                service_type: text.service_type,
                city: text.city,
                state: None,
            },
            Stage::Sort {
                key: SortKey::Rating,
                geo: false,
            },
        ];
        let hits = search::execute(&stages, active);
        debug!(found = hits.len(), "basic search done");
        let mut owners = HashMap::new();
        let mut out = Vec::with_capacity(hits.len());
        for hit in hits {
            let owner = self.owner_cached(hit.profile.user_id, &mut owners).await;
            out.push(VendorDetail {
                profile: hit.profile,
                owner,
            });
        }
        Ok(out)
    }

    #[instrument(name = "vendors.service.advanced_search", skip(self, query))]
    pub async fn advanced_search(&self, query: SearchQuery) -> Result<SearchResult, DomainError> {
        let filter = self.normalize(query)?;
        let active = self
            .list_active(&TextMatch {
                service_type: filter.service_type.clone(),
                city: filter.city.clone(),
                state: filter.state.clone(),
            })
            .await?;
        let page = search::run(active, &filter);
        debug!(total = page.total, returned = page.items.len(), "advanced search done");

        let mut owners = HashMap::new();
        let mut listings = Vec::with_capacity(page.items.len());
        for hit in page.items {
            let owner = self.owner_cached(hit.profile.user_id, &mut owners).await;
            listings.push(Listing { hit, owner });
        }
        Ok(SearchResult {
            listings,
            total: page.total,
            filter,
        })
    }

    /// Calendar entries inside `[start, end]`, ordered by date. Open bounds
    /// are unrestricted.
    #[instrument(name = "vendors.service.availability", skip(self), fields(vendor_id = %id))]
    pub async fn availability(
        &self,
        id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<AvailabilityEntry>, DomainError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(DomainError::validation("start", "must not be after end"));
            }
        }
        let profile = self.load(id).await?;
        let mut entries: Vec<_> = profile
            .availability
            .into_iter()
            .filter(|a| start.is_none_or(|s| a.date >= s) && end.is_none_or(|e| a.date <= e))
            .collect();
        entries.sort_by_key(|a| a.date);
        Ok(entries)
    }

    /// Upserts each entry into the caller's calendar and returns the whole
    /// calendar.
    #[instrument(name = "vendors.service.set_availability", skip(self, entries), fields(user_id = %user_id, count = entries.len()))]
    pub async fn set_availability(
        &self,
        user_id: Uuid,
        entries: Vec<AvailabilityEntry>,
    ) -> Result<Vec<AvailabilityEntry>, DomainError> {
        let mut profile = self.own(user_id).await?;
        for entry in entries {
            upsert_date(&mut profile.availability, entry.date, entry.status);
        }
        self.repo
            .write_calendar(profile.id, &profile.availability, Utc::now())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(profile.availability)
    }

    #[instrument(name = "vendors.service.set_date_status", skip(self), fields(vendor_id = %vendor_id))]
    pub async fn set_date_status(
        &self,
        vendor_id: Uuid,
        date: NaiveDate,
        status: AvailabilityStatus,
    ) -> Result<(), DomainError> {
        let mut profile = self.load(vendor_id).await?;
        upsert_date(&mut profile.availability, date, status);
        self.repo
            .write_calendar(vendor_id, &profile.availability, Utc::now())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(%date, ?status, "calendar date updated");
        Ok(())
    }

    #[instrument(name = "vendors.service.add_portfolio_image", skip(self), fields(user_id = %user_id))]
    pub async fn add_portfolio_image(
        &self,
        user_id: Uuid,
        image_url: &str,
    ) -> Result<Vec<String>, DomainError> {
        let parsed = url::Url::parse(image_url.trim())
            .map_err(|e| DomainError::validation("image_url", e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::validation(
                "image_url",
                "only http and https URLs are accepted",
            ));
        }
        let mut profile = self.own(user_id).await?;
        profile.portfolio.push(parsed.to_string());
        self.repo
            .write_portfolio(profile.id, &profile.portfolio, Utc::now())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(profile.portfolio)
    }

    /// Appends a review and recomputes the rating summary. The review is
    /// marked verified when the reviewer has a completed booking with the
    /// vendor.
    #[instrument(name = "vendors.service.add_review", skip(self, new), fields(vendor_id = %vendor_id, user_id = %user_id))]
    pub async fn add_review(
        &self,
        vendor_id: Uuid,
        user_id: Uuid,
        new: NewReview,
    ) -> Result<VendorProfile, DomainError> {
        let rating = u8::try_from(new.rating)
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or(DomainError::InvalidRating { rating: new.rating })?;
        let mut profile = self.load(vendor_id).await?;

        let completed = match self.hub.get::<dyn ReviewEligibility>() {
            Ok(check) => check.completed_booking(user_id, vendor_id).await,
            Err(e) => {
                debug!(error = %e, "booking history unavailable, review stays unverified");
                None
            }
        };

        profile.reviews.push(Review {
            id: Uuid::new_v4(),
            user_id,
            booking_id: new.booking_id.or(completed),
            rating,
            comment: new
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            is_verified_booking: completed.is_some(),
            date: Utc::now(),
        });
        recompute_rating(&mut profile);
        profile.updated_at = Utc::now();
        self.repo
            .write_reviews(
                vendor_id,
                &profile.reviews,
                profile.average_rating,
                profile.total_reviews,
                profile.updated_at,
            )
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(
            average = profile.average_rating,
            total = profile.total_reviews,
            "review added"
        );
        Ok(profile)
    }

    fn normalize(&self, q: SearchQuery) -> Result<SearchFilter, DomainError> {
        for (field, v) in [
            ("min_price", q.min_price),
            ("max_price", q.max_price),
            ("max_distance", q.max_distance),
            ("min_rating", q.min_rating),
        ] {
            if v.is_some_and(|v| !v.is_finite() || v < 0.0) {
                return Err(DomainError::validation(field, "must be a non-negative number"));
            }
        }
        let near = match (q.lat, q.lon) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(DomainError::validation("lat/lon", "out of range"));
                }
                Some(Coordinates { lat, lon })
            }
            _ => None,
        };
        let limit = q
            .limit
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size.max(1));
        Ok(SearchFilter {
            service_type: non_blank(q.service_type),
            city: non_blank(q.city),
            state: non_blank(q.state),
            min_price: q.min_price,
            max_price: q.max_price,
            date: q.date,
            min_rating: q.min_rating.unwrap_or(0.0),
            near,
            max_distance: q.max_distance.unwrap_or(self.config.default_max_distance),
            sort_by: q.sort_by.unwrap_or_default(),
            page: q.page.unwrap_or(1).max(1),
            limit,
        })
    }

    async fn with_owner(&self, profile: VendorProfile) -> VendorDetail {
        let owner = self.owner(profile.user_id).await;
        VendorDetail { profile, owner }
    }

    async fn owner(&self, user_id: Uuid) -> Option<Owner> {
        let accounts = self.accounts.as_ref()?;
        match accounts.get_user(user_id).await {
            Ok(u) => Some(Owner {
                id: u.id,
                name: u.name,
                email: u.email,
            }),
            Err(e) => {
                warn!(%user_id, error = %e, "vendor owner lookup failed");
                None
            }
        }
    }

    async fn owner_cached(
        &self,
        user_id: Uuid,
        seen: &mut HashMap<Uuid, Option<Owner>>,
    ) -> Option<Owner> {
        if let Some(hit) = seen.get(&user_id) {
            return hit.clone();
        }
        let owner = self.owner(user_id).await;
        seen.insert(user_id, owner.clone());
        owner
    }

    async fn load(&self, id: Uuid) -> Result<VendorProfile, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::vendor_not_found(id))
    }

    async fn own(&self, user_id: Uuid) -> Result<VendorProfile, DomainError> {
        self.find_by_user(user_id)
            .await?
            .ok_or(DomainError::ProfileMissing { user_id })
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<VendorProfile>, DomainError> {
        self.repo
            .find_by_user(user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    async fn list_active(&self, text: &TextMatch) -> Result<Vec<VendorProfile>, DomainError> {
        self.repo
            .list_active(text)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn validate_profile(mut input: ProfileInput) -> Result<ProfileInput, DomainError> {
    input.service_type = input.service_type.trim().to_string();
    if input.service_type.is_empty() {
        return Err(DomainError::validation("service_type", "must not be empty"));
    }
    input.location.city = input.location.city.trim().to_string();
    if input.location.city.is_empty() {
        return Err(DomainError::validation("location.city", "must not be empty"));
    }
    if let Some(c) = input.location.coordinates {
        if !(-90.0..=90.0).contains(&c.lat) || !(-180.0..=180.0).contains(&c.lon) {
            return Err(DomainError::validation(
                "location.coordinates",
                "latitude or longitude out of range",
            ));
        }
    }
    for tier in &mut input.pricing_tiers {
        tier.package_name = tier.package_name.trim().to_string();
        if tier.package_name.is_empty() {
            return Err(DomainError::validation(
                "pricing_tiers.package_name",
                "must not be empty",
            ));
        }
        if !tier.price.is_finite() || tier.price < 0.0 {
            return Err(DomainError::validation(
                "pricing_tiers.price",
                format!("'{}' must have a non-negative price", tier.package_name),
            ));
        }
    }
    input.business_name = non_blank(input.business_name);
    input.description = non_blank(input.description);
    input.contact_phone = non_blank(input.contact_phone);
    input.response_time = non_blank(input.response_time);
    Ok(input)
}

/// Replaces the status of an existing date or inserts it, keeping the
/// calendar ordered.
fn upsert_date(calendar: &mut Vec<AvailabilityEntry>, date: NaiveDate, status: AvailabilityStatus) {
    match calendar.iter_mut().find(|a| a.date == date) {
        Some(entry) => entry.status = status,
        None => calendar.push(AvailabilityEntry { date, status }),
    }
    calendar.sort_by_key(|a| a.date);
}

fn recompute_rating(profile: &mut VendorProfile) {
    let count = profile.reviews.len();
    profile.total_reviews = count as u32;
    profile.average_rating = if count == 0 {
        0.0
    } else {
        let sum: u32 = profile.reviews.iter().map(|r| u32::from(r.rating)).sum();
        (f64::from(sum) / count as f64 * 10.0).round() / 10.0
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    #[test]
    fn upsert_replaces_and_orders() {
        let mut cal = vec![];
        upsert_date(&mut cal, d(9), AvailabilityStatus::Available);
        upsert_date(&mut cal, d(3), AvailabilityStatus::Blocked);
        upsert_date(&mut cal, d(9), AvailabilityStatus::Booked);
        assert_eq!(
            cal,
            vec![
                AvailabilityEntry {
                    date: d(3),
                    status: AvailabilityStatus::Blocked
                },
                AvailabilityEntry {
                    date: d(9),
                    status: AvailabilityStatus::Booked
                },
            ]
        );
    }

    #[test]
    fn profile_validation_trims_and_rejects() {
        let base = ProfileInput {
            business_name: Some("  ".into()),
            service_type: " Catering ".into(),
            description: None,
            location: crate::contract::model::Location {
                address: "MG Road".into(),
                city: "Pune ".into(),
                state: "MH".into(),
                coordinates: None,
            },
            pricing_tiers: vec![],
            contact_phone: None,
            years_of_experience: 3,
            response_time: None,
            is_active: true,
        };
        let ok = validate_profile(base.clone()).unwrap();
        assert_eq!(ok.service_type, "Catering");
        assert_eq!(ok.location.city, "Pune");
        assert_eq!(ok.business_name, None);

        let mut bad = base.clone();
        bad.location.coordinates = Some(Coordinates {
            lat: 91.0,
            lon: 0.0,
        });
        assert!(validate_profile(bad).is_err());

        let mut bad = base;
        bad.pricing_tiers.push(crate::contract::model::PricingTier {
            package_name: "Gold".into(),
            price: -5.0,
            currency: "INR".into(),
            description: None,
            inclusions: vec![],
        });
        assert!(validate_profile(bad).is_err());
    }
}
