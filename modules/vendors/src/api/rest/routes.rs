use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};
use std::sync::Arc;

use crate::api::rest::dto::{
    AvailabilityDto, PortfolioDto, PortfolioReq, ProfileReq, ReviewAddedDto, ReviewReq,
    SearchResponse, SetAvailabilityReq, VendorDto,
};
use crate::api::rest::handlers;
use crate::contract::model::AvailabilityEntry;
use crate::domain::service::Service;

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    router = OperationBuilder::<Missing, Missing, ()>::get("/api/vendors/search")
        .operation_id("vendors.search")
        .summary("Search vendors by city and service type")
        .tag("vendors")
        .query_param("city", false, "City, case-insensitive substring")
        .query_param("service_type", false, "Service type, case-insensitive substring")
        .handler(handlers::basic_search)
        .json_list_response::<VendorDto>(openapi, 200, "Active vendors, best rated first")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/vendors/search/advanced")
        .operation_id("vendors.advanced_search")
        .summary("Filtered, sorted and paged vendor search")
        .description("Combines proximity, text, date, price and rating filters")
        .tag("vendors")
        .query_param("service_type", false, "Service type")
        .query_param("city", false, "City")
        .query_param("state", false, "State")
        .query_param("min_price", false, "Lowest acceptable starting price")
        .query_param("max_price", false, "Highest acceptable starting price")
        .query_param("date", false, "Required free date (YYYY-MM-DD)")
        .query_param("min_rating", false, "Minimum average rating")
        .query_param("lat", false, "Latitude for proximity search")
        .query_param("lon", false, "Longitude for proximity search")
        .query_param("max_distance", false, "Radius in metres (default 50000)")
        .query_param("sort_by", false, "rating, price_low, price_high, distance or reviews")
        .query_param("page", false, "1-based page")
        .query_param("limit", false, "Page size, at most 100")
        .handler(handlers::advanced_search)
        .json_response_with_schema::<SearchResponse>(
            openapi,
            200,
            "Vendors, pagination and applied filters",
        )
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/vendors/profile")
        .operation_id("vendors.get_own_profile")
        .summary("Caller's vendor profile")
        .tag("vendors")
        .bearer_auth()
        .handler(handlers::get_own_profile)
        .json_response_with_schema::<VendorDto>(openapi, 200, "Vendor profile")
        .problem_response(openapi, 403, "Vendor role required")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/vendors/profile")
        .operation_id("vendors.upsert_profile")
        .summary("Create or update the caller's vendor profile")
        .tag("vendors")
        .bearer_auth()
        .json_request::<ProfileReq>(openapi, "Profile fields")
        .handler(handlers::upsert_profile)
        .json_response_with_schema::<VendorDto>(openapi, 200, "Saved profile")
        .problem_response(openapi, 403, "Vendor role required")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::put("/api/vendors/profile/availability")
        .operation_id("vendors.set_availability")
        .summary("Set calendar dates")
        .tag("vendors")
        .bearer_auth()
        .json_request::<SetAvailabilityReq>(
            openapi,
            "Dates with status available, booked or blocked",
        )
        .handler(handlers::set_availability)
        .json_list_response::<AvailabilityEntry>(openapi, 200, "Full calendar")
        .problem_response(openapi, 403, "Vendor role required")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/vendors/portfolio")
        .operation_id("vendors.add_portfolio_image")
        .summary("Add a portfolio image URL")
        .tag("vendors")
        .bearer_auth()
        .json_request::<PortfolioReq>(openapi, "Image URL")
        .handler(handlers::add_portfolio_image)
        .json_response_with_schema::<PortfolioDto>(openapi, 201, "Portfolio")
        .problem_response(openapi, 403, "Vendor role required")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/vendors/{id}")
        .operation_id("vendors.get")
        .summary("Vendor by id")
        .tag("vendors")
        .path_param("id", "Vendor profile UUID")
        .handler(handlers::get_vendor)
        .json_response_with_schema::<VendorDto>(openapi, 200, "Vendor")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/vendors/{id}/availability")
        .operation_id("vendors.get_availability")
        .summary("Calendar entries in a date range")
        .tag("vendors")
        .path_param("id", "Vendor profile UUID")
        .query_param("start", false, "First date (inclusive)")
        .query_param("end", false, "Last date (inclusive)")
        .handler(handlers::get_availability)
        .json_response_with_schema::<AvailabilityDto>(openapi, 200, "Calendar entries")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/vendors/{id}/reviews")
        .operation_id("vendors.add_review")
        .summary("Review a vendor")
        .tag("vendors")
        .bearer_auth()
        .path_param("id", "Vendor profile UUID")
        .json_request::<ReviewReq>(openapi, "Rating 1-5 and optional comment")
        .handler(handlers::add_review)
        .json_response_with_schema::<ReviewAddedDto>(
            openapi,
            201,
            "Review and new rating summary",
        )
        .standard_errors(openapi)
        .register(router, openapi);

    router = router.layer(Extension(service));
    Ok(router)
}
