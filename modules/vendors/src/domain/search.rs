//! Advanced vendor search.
//!
//! A filter is compiled into a fixed list of [`Stage`]s that run in order
//! over the active profiles. The count uses the same list cut before the
//! sort stage, so `total` always matches what paging walks through.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{AvailabilityStatus, Coordinates, VendorProfile};

/// Mean earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Rating,
    PriceLow,
    PriceHigh,
    Distance,
    Reviews,
}

/// Normalized search input; defaults are applied by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub service_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub date: Option<NaiveDate>,
    pub min_rating: f64,
    pub near: Option<Coordinates>,
    pub max_distance: f64,
    pub sort_by: SortKey,
    pub page: u64,
    pub limit: u64,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            service_type: None,
            city: None,
            state: None,
            min_price: None,
            max_price: None,
            date: None,
            min_rating: 0.0,
            near: None,
            max_distance: 50_000.0,
            sort_by: SortKey::Rating,
            page: 1,
            limit: 20,
        }
    }
}

/// A profile travelling through the pipeline with its derived fields.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub profile: VendorProfile,
    pub distance: Option<f64>,
    pub is_available_on_date: Option<bool>,
    pub min_package_price: Option<f64>,
    pub max_package_price: Option<f64>,
}

impl From<VendorProfile> for Candidate {
    fn from(profile: VendorProfile) -> Self {
        Self {
            profile,
            distance: None,
            is_available_on_date: None,
            min_package_price: None,
            max_package_price: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Near {
        origin: Coordinates,
        max_distance: f64,
    },
    Match {
        service_type: Option<String>,
        city: Option<String>,
        state: Option<String>,
    },
    AvailableOn(NaiveDate),
    PackagePrices,
    PriceAndRating {
        min_price: Option<f64>,
        max_price: Option<f64>,
        min_rating: f64,
    },
    Sort {
        key: SortKey,
        geo: bool,
    },
    Skip(u64),
    Limit(u64),
}

#[derive(Debug, Clone)]
pub struct SearchPage {
    pub items: Vec<Candidate>,
    pub total: u64,
}

pub fn haversine_m(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

pub fn build_pipeline(f: &SearchFilter) -> Vec<Stage> {
    let mut stages = Vec::with_capacity(8);
    if let Some(origin) = f.near {
        stages.push(Stage::Near {
            origin,
            max_distance: f.max_distance,
        });
    }
    stages.push(Stage::Match {
        service_type: f.service_type.clone(),
        city: f.city.clone(),
        state: f.state.clone(),
    });
    if let Some(date) = f.date {
        stages.push(Stage::AvailableOn(date));
    }
    stages.push(Stage::PackagePrices);
    stages.push(Stage::PriceAndRating {
        min_price: f.min_price,
        max_price: f.max_price,
        min_rating: f.min_rating,
    });
    stages.push(Stage::Sort {
        key: f.sort_by,
        geo: f.near.is_some(),
    });
    stages.push(Stage::Skip(f.page.saturating_sub(1).saturating_mul(f.limit)));
    stages.push(Stage::Limit(f.limit));
    stages
}

/// The filtering prefix used for counting.
pub fn count_prefix(pipeline: &[Stage]) -> &[Stage] {
    let end = pipeline
        .iter()
        .position(|s| matches!(s, Stage::Sort { .. }))
        .unwrap_or(pipeline.len());
    &pipeline[..end]
}

pub fn execute(stages: &[Stage], input: Vec<VendorProfile>) -> Vec<Candidate> {
    let mut rows: Vec<Candidate> = input.into_iter().map(Candidate::from).collect();
    for stage in stages {
        rows = apply(stage, rows);
    }
    rows
}

pub fn run(profiles: Vec<VendorProfile>, filter: &SearchFilter) -> SearchPage {
    let pipeline = build_pipeline(filter);
    let total = execute(count_prefix(&pipeline), profiles.clone()).len() as u64;
    let items = execute(&pipeline, profiles);
    SearchPage { items, total }
}

fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
    match needle {
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
        None => true,
    }
}

fn apply(stage: &Stage, mut rows: Vec<Candidate>) -> Vec<Candidate> {
    match stage {
        Stage::Near {
            origin,
            max_distance,
        } => rows
            .into_iter()
            .filter_map(|mut c| {
                let at = c.profile.location.coordinates?;
                let d = haversine_m(*origin, at);
                (d <= *max_distance).then(|| {
                    c.distance = Some(d);
                    c
                })
            })
            .collect(),
        Stage::Match {
            service_type,
            city,
            state,
        } => rows
            .into_iter()
            .filter(|c| {
                let p = &c.profile;
                p.is_active
                    && contains_ci(&p.service_type, service_type)
                    && contains_ci(&p.location.city, city)
                    && contains_ci(&p.location.state, state)
            })
            .collect(),
        Stage::AvailableOn(date) => rows
            .into_iter()
            .filter_map(|mut c| {
                let open = c
                    .profile
                    .availability
                    .iter()
                    .any(|a| a.date == *date && a.status == AvailabilityStatus::Available);
                c.is_available_on_date = Some(open);
                open.then_some(c)
            })
            .collect(),
        Stage::PackagePrices => {
            for c in &mut rows {
                let prices = c.profile.pricing_tiers.iter().map(|t| t.price);
                c.min_package_price = prices.clone().reduce(f64::min);
                c.max_package_price = prices.reduce(f64::max);
            }
            rows
        }
        Stage::PriceAndRating {
            min_price,
            max_price,
            min_rating,
        } => rows
            .into_iter()
            .filter(|c| {
                let price_ok = match (min_price, max_price) {
                    (None, None) => true,
                    _ => c.min_package_price.is_some_and(|p| {
                        max_price.is_none_or(|max| p <= max) && min_price.is_none_or(|min| p >= min)
                    }),
                };
                price_ok && c.profile.average_rating >= *min_rating
            })
            .collect(),
        Stage::Sort { key, geo } => {
            rows.sort_by(|a, b| compare(a, b, *key, *geo));
            rows
        }
        Stage::Skip(n) => rows.into_iter().skip(*n as usize).collect(),
        Stage::Limit(n) => {
            rows.truncate(*n as usize);
            rows
        }
    }
}

/// Ascending with missing values last.
fn asc_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending with missing values last.
fn desc_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        _ => asc_missing_last(a, b),
    }
}

fn compare(a: &Candidate, b: &Candidate, key: SortKey, geo: bool) -> Ordering {
    let rating = || b.profile.average_rating.total_cmp(&a.profile.average_rating);
    let reviews = || b.profile.total_reviews.cmp(&a.profile.total_reviews);
    match key {
        SortKey::PriceLow => {
            asc_missing_last(a.min_package_price, b.min_package_price).then_with(rating)
        }
        SortKey::PriceHigh => {
            desc_missing_last(a.min_package_price, b.min_package_price).then_with(rating)
        }
        SortKey::Distance if geo => asc_missing_last(a.distance, b.distance),
        SortKey::Distance => rating(),
        SortKey::Reviews => reviews().then_with(rating),
        SortKey::Rating => rating()
            .then_with(reviews)
            .then_with(|| asc_missing_last(a.min_package_price, b.min_package_price)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{AvailabilityEntry, Location, PricingTier};
    use chrono::Utc;
    use uuid::Uuid;

    const MUMBAI: Coordinates = Coordinates {
        lat: 19.0760,
        lon: 72.8777,
    };
    const PUNE: Coordinates = Coordinates {
        lat: 18.5204,
        lon: 73.8567,
    };

    fn vendor(service: &str, city: &str, prices: &[f64], rating: f64, reviews: u32) -> VendorProfile {
        let now = Utc::now();
        VendorProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            business_name: Some(format!("{service} co")),
            service_type: service.into(),
            description: None,
            location: Location {
                address: "1 Main St".into(),
                city: city.into(),
                state: "Maharashtra".into(),
                coordinates: None,
            },
            pricing_tiers: prices
                .iter()
                .map(|p| PricingTier {
                    package_name: format!("P{p}"),
                    price: *p,
                    currency: "INR".into(),
                    description: None,
                    inclusions: vec![],
                })
                .collect(),
            availability: vec![],
            portfolio: vec![],
            reviews: vec![],
            average_rating: rating,
            total_reviews: reviews,
            contact_phone: None,
            years_of_experience: 0,
            response_time: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn names(page: &SearchPage) -> Vec<String> {
        page.items
            .iter()
            .map(|c| c.profile.business_name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn haversine_matches_known_distance() {
        let d = haversine_m(MUMBAI, PUNE);
        assert!((115_000.0..125_000.0).contains(&d), "got {d}");
        assert!(haversine_m(MUMBAI, MUMBAI) < 1e-6);
    }

    #[test]
    fn pipeline_has_geo_stage_only_with_coordinates() {
        let plain = build_pipeline(&SearchFilter::default());
        assert!(matches!(plain[0], Stage::Match { .. }));
        assert_eq!(count_prefix(&plain).len(), 3);

        let geo = build_pipeline(&SearchFilter {
            near: Some(MUMBAI),
            date: NaiveDate::from_ymd_opt(2026, 5, 1),
            ..Default::default()
        });
        assert!(matches!(geo[0], Stage::Near { .. }));
        assert!(geo.contains(&Stage::AvailableOn(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())));
        assert_eq!(count_prefix(&geo).len(), 5);
    }

    #[test]
    fn every_filter_applies_at_once() {
        let mut a = vendor("Catering", "Mumbai", &[40_000.0, 90_000.0], 4.5, 10);
        let b = vendor("Catering", "Pune", &[30_000.0], 4.9, 3);
        let c = vendor("Photography", "Mumbai", &[20_000.0], 4.8, 8);
        let mut d = vendor("catering", "Navi Mumbai", &[120_000.0], 4.7, 2);
        let mut e = vendor("Catering", "Mumbai", &[45_000.0], 3.0, 30);
        let mut f = vendor("Catering", "Mumbai", &[50_000.0], 4.6, 1);
        f.is_active = false;
        let date = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        for p in [&mut a, &mut d, &mut e] {
            p.availability.push(AvailabilityEntry {
                date,
                status: AvailabilityStatus::Available,
            });
        }

        let filter = SearchFilter {
            service_type: Some("CATER".into()),
            city: Some("mumbai".into()),
            min_price: Some(35_000.0),
            max_price: Some(100_000.0),
            date: Some(date),
            min_rating: 4.0,
            ..Default::default()
        };
        let page = run(vec![a, b, c, d, e, f], &filter);
        assert_eq!(page.total, 1);
        assert_eq!(names(&page), vec!["Catering co"]);
        let hit = &page.items[0];
        assert_eq!(hit.min_package_price, Some(40_000.0));
        assert_eq!(hit.max_package_price, Some(90_000.0));
        assert_eq!(hit.is_available_on_date, Some(true));
    }

    #[test]
    fn booked_date_excludes_vendor() {
        let mut v = vendor("DJ", "Pune", &[10_000.0], 4.0, 1);
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        v.availability.push(AvailabilityEntry {
            date,
            status: AvailabilityStatus::Booked,
        });
        let page = run(
            vec![v],
            &SearchFilter {
                date: Some(date),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 0);
    }

    #[test]
    fn proximity_filters_and_sorts_by_distance() {
        let mut near = vendor("Venue", "Mumbai", &[1.0], 3.0, 0);
        near.business_name = Some("near".into());
        near.location.coordinates = Some(Coordinates {
            lat: 19.08,
            lon: 72.88,
        });
        let mut mid = vendor("Venue", "Thane", &[1.0], 5.0, 0);
        mid.business_name = Some("mid".into());
        mid.location.coordinates = Some(Coordinates {
            lat: 19.2183,
            lon: 72.9781,
        });
        let mut far = vendor("Venue", "Pune", &[1.0], 5.0, 0);
        far.location.coordinates = Some(PUNE);
        let nowhere = vendor("Venue", "Mumbai", &[1.0], 5.0, 0);

        let page = run(
            vec![mid, far, nowhere, near],
            &SearchFilter {
                near: Some(MUMBAI),
                max_distance: 50_000.0,
                sort_by: SortKey::Distance,
                ..Default::default()
            },
        );
        assert_eq!(page.total, 2);
        assert_eq!(names(&page), vec!["near", "mid"]);
        assert!(page.items[0].distance.unwrap() < page.items[1].distance.unwrap());
    }

    #[test]
    fn sort_keys() {
        let mut cheap = vendor("X", "C", &[100.0], 3.0, 50);
        cheap.business_name = Some("cheap".into());
        let mut pricey = vendor("X", "C", &[900.0], 4.0, 5);
        pricey.business_name = Some("pricey".into());
        let mut top = vendor("X", "C", &[500.0], 5.0, 5);
        top.business_name = Some("top".into());
        let mut bare = vendor("X", "C", &[], 5.0, 1);
        bare.business_name = Some("bare".into());
        let all = vec![cheap, pricey, top, bare];

        let by = |key| names(&run(all.clone(), &SearchFilter { sort_by: key, ..Default::default() }));
        assert_eq!(by(SortKey::PriceLow), vec!["cheap", "top", "pricey", "bare"]);
        assert_eq!(by(SortKey::PriceHigh), vec!["pricey", "top", "cheap", "bare"]);
        assert_eq!(by(SortKey::Reviews), vec!["cheap", "top", "pricey", "bare"]);
        assert_eq!(by(SortKey::Rating), vec!["top", "bare", "pricey", "cheap"]);
        // Without coordinates distance falls back to rating.
        assert_eq!(by(SortKey::Distance)[0], "top");
    }

    #[test]
    fn paging_reports_full_total() {
        let all: Vec<_> = (0..7)
            .map(|i| vendor("Decor", "Goa", &[i as f64 * 10.0], 4.0, i))
            .collect();
        let page = run(
            all,
            &SearchFilter {
                sort_by: SortKey::PriceLow,
                page: 3,
                limit: 3,
                ..Default::default()
            },
        );
        assert_eq!(page.total, 7);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].min_package_price, Some(60.0));
    }
}
