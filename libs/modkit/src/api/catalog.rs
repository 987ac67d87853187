//! In-memory catalog of registered operations and component schemas,
//! rendered as an OpenAPI 3.1 document on demand.

use dashmap::DashMap;
use http::Method;
use std::collections::BTreeMap;
use utoipa::openapi::{
    path::{OperationBuilder as DocOperationBuilder, ParameterBuilder, ParameterIn, PathItem},
    request_body::RequestBodyBuilder,
    schema::{Array, ObjectBuilder, Schema, Type},
    security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme},
    ComponentsBuilder, Content, Info, OpenApi, OpenApiBuilder, PathsBuilder, Ref, RefOr,
    Required, ResponseBuilder,
};

use super::operation_builder::{OpenApiRegistry, OperationSpec, ParamLocation, SchemaCollection};

const BEARER_SCHEME: &str = "bearerAuth";

#[derive(Default)]
pub struct RouteCatalog {
    ops: DashMap<(String, String), OperationSpec>,
    schemas: DashMap<String, RefOr<Schema>>,
}

impl RouteCatalog {
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn contains(&self, method: &str, path: &str) -> bool {
        self.ops
            .contains_key(&(method.to_ascii_uppercase(), path.to_string()))
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn document(&self, title: &str, version: &str) -> OpenApi {
        let mut items: BTreeMap<String, PathItem> = BTreeMap::new();
        for entry in self.ops.iter() {
            let spec = entry.value();
            let item = items.entry(spec.path.clone()).or_default();
            let op = Some(operation(spec));
            match spec.method {
                Method::GET => item.get = op,
                Method::POST => item.post = op,
                Method::PUT => item.put = op,
                Method::PATCH => item.patch = op,
                Method::DELETE => item.delete = op,
                _ => tracing::warn!(method = %spec.method, path = %spec.path, "method left out of the document"),
            }
        }
        let paths = items
            .into_iter()
            .fold(PathsBuilder::new(), |b, (path, item)| b.path(path, item));

        let mut sorted: Vec<(String, RefOr<Schema>)> = self
            .schemas
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        let components = sorted
            .into_iter()
            .fold(ComponentsBuilder::new(), |b, (name, schema)| b.schema(name, schema))
            .security_scheme(
                BEARER_SCHEME,
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
            .build();

        OpenApiBuilder::new()
            .info(Info::new(title, version))
            .paths(paths.build())
            .components(Some(components))
            .build()
    }
}

impl OpenApiRegistry for RouteCatalog {
    fn register_operation(&self, spec: &OperationSpec) {
        let key = (spec.method.as_str().to_string(), spec.path.clone());
        if self.ops.insert(key, spec.clone()).is_some() {
            tracing::warn!(method = %spec.method, path = %spec.path, "operation registered twice");
        }
    }

    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String {
        for (component, schema) in schemas {
            // First registration wins; DTO names are unique per module.
            self.schemas.entry(component).or_insert(schema);
        }
        name.to_string()
    }
}

fn content(schema_name: Option<&str>, list: bool) -> Content {
    Content::new(schema_name.map(|n| {
        let item = RefOr::<Schema>::Ref(Ref::from_schema_name(n));
        if list {
            RefOr::T(Schema::Array(Array::new(item)))
        } else {
            item
        }
    }))
}

fn operation(spec: &OperationSpec) -> utoipa::openapi::path::Operation {
    let mut op = DocOperationBuilder::new()
        .operation_id(spec.operation_id.clone())
        .summary(spec.summary.clone())
        .description(spec.description.clone());
    if !spec.tags.is_empty() {
        op = op.tags(Some(spec.tags.clone()));
    }

    // Authorization is expressed through `security`, not as a parameter.
    for p in spec
        .params
        .iter()
        .filter(|p| p.location != ParamLocation::Header || p.name != "Authorization")
    {
        let location = match p.location {
            ParamLocation::Path => ParameterIn::Path,
            ParamLocation::Query => ParameterIn::Query,
            ParamLocation::Header => ParameterIn::Header,
        };
        let required = if p.required || p.location == ParamLocation::Path {
            Required::True
        } else {
            Required::False
        };
        op = op.parameter(
            ParameterBuilder::new()
                .name(p.name.clone())
                .parameter_in(location)
                .required(required)
                .description(p.description.clone())
                .schema(Some(RefOr::T(Schema::Object(
                    ObjectBuilder::new().schema_type(Type::String).build(),
                )))),
        );
    }

    if let Some(body) = &spec.request_body {
        let required = if body.required {
            Required::True
        } else {
            Required::False
        };
        op = op.request_body(Some(
            RequestBodyBuilder::new()
                .description(body.description.clone())
                .required(Some(required))
                .content(body.content_type, content(Some(&body.schema_name), false))
                .build(),
        ));
    }

    for r in &spec.responses {
        op = op.response(
            r.status.to_string(),
            RefOr::T(
                ResponseBuilder::new()
                    .description(r.description.clone())
                    .content(r.content_type, content(r.schema_name.as_deref(), r.list))
                    .build(),
            ),
        );
    }

    if spec.secured {
        op = op.security(SecurityRequirement::new(BEARER_SCHEME, Vec::<String>::new()));
    }
    op.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Missing, OperationBuilder};
    use axum::Router;
    use serde_json::json;

    #[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
    struct VendorPatch {
        business_name: Option<String>,
        years_of_experience: Option<u32>,
    }

    #[derive(serde::Serialize, utoipa::ToSchema)]
    struct VendorView {
        id: uuid::Uuid,
        business_name: String,
    }

    async fn noop() -> &'static str {
        "ok"
    }

    #[test]
    fn document_groups_methods_under_paths() {
        let catalog = RouteCatalog::default();
        let r = OperationBuilder::<Missing, Missing, ()>::get("/api/vendors/{id}")
            .operation_id("vendors.get")
            .path_param("id", "Vendor id")
            .handler(noop)
            .json_response_with_schema::<VendorView>(&catalog, 200, "Vendor")
            .register(Router::new(), &catalog);
        let r = OperationBuilder::<Missing, Missing, ()>::get("/api/vendors")
            .operation_id("vendors.list")
            .handler(noop)
            .json_list_response::<VendorView>(&catalog, 200, "Vendors")
            .register(r, &catalog);
        let _ = OperationBuilder::<Missing, Missing, ()>::put("/api/vendors/{id}")
            .bearer_auth()
            .json_request::<VendorPatch>(&catalog, "Patch")
            .handler(noop)
            .json_response_with_schema::<VendorView>(&catalog, 200, "Updated")
            .problem_response(&catalog, 403, "Not the owner")
            .register(r, &catalog);

        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("put", "/api/vendors/{id}"));
        assert!(catalog.has_schema("VendorView"));
        assert!(catalog.has_schema("Problem"));

        let doc = serde_json::to_value(catalog.document("EventHub API", "0.1.0")).unwrap();
        let path = &doc["paths"]["/api/vendors/{id}"];
        assert_eq!(path["get"]["operationId"], "vendors.get");
        assert_eq!(path["get"]["parameters"][0]["in"], "path");
        assert_eq!(
            path["get"]["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/VendorView"
        );
        assert_eq!(
            path["put"]["requestBody"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/VendorPatch"
        );
        let list = &doc["paths"]["/api/vendors"]["get"]["responses"]["200"]["content"]
            ["application/json"]["schema"];
        assert_eq!(list["type"], "array");
        assert_eq!(list["items"]["$ref"], "#/components/schemas/VendorView");
        assert_eq!(path["put"]["security"][0]["bearerAuth"], json!([]));
        assert_eq!(
            path["put"]["responses"]["403"]["content"]["application/problem+json"]["schema"]["$ref"],
            "#/components/schemas/Problem"
        );
        assert!(path["put"].get("parameters").is_none());

        let schemas = &doc["components"]["schemas"];
        assert!(schemas["VendorPatch"]["properties"]["business_name"].is_object());
        assert!(schemas["Problem"]["properties"]["code"].is_object());
        assert_eq!(
            doc["components"]["securitySchemes"]["bearerAuth"]["scheme"],
            "bearer"
        );
    }
}
