//! Type-state route builder.
//!
//! An operation can only be registered once it has a handler and at least one
//! declared response; both are tracked in the type (`Missing`/`Present`).
//! Registration adds the route to the router and records its description in
//! the host's route catalog. Request and response bodies name `utoipa`
//! component schemas, registered on first use.

use axum::{handler::Handler, routing::MethodRouter, Router};
use http::Method;
use serde::Serialize;
use std::marker::PhantomData;
use utoipa::openapi::{schema::Schema, RefOr};

use crate::api::problem::{Problem, APPLICATION_PROBLEM_JSON};

/// A component schema and every schema it references, root first.
pub type SchemaCollection = Vec<(String, RefOr<Schema>)>;

pub mod state {
    #[derive(Debug, Clone, Copy)]
    pub struct Missing;

    #[derive(Debug, Clone, Copy)]
    pub struct Present;
}

pub use state::{Missing, Present};

mod sealed {
    pub trait Sealed {}
}

/// Maps handler state to the router slot: nothing while `Missing`,
/// a real `MethodRouter<S>` once `Present`.
pub trait HandlerSlot<S>: sealed::Sealed {
    type Slot;
}

impl sealed::Sealed for Missing {}
impl sealed::Sealed for Present {}

impl<S> HandlerSlot<S> for Missing {
    type Slot = ();
}

impl<S> HandlerSlot<S> for Present {
    type Slot = MethodRouter<S>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RequestBodySpec {
    pub content_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Component referenced by `$ref`.
    pub schema_name: String,
    pub required: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResponseSpec {
    pub status: u16,
    pub content_type: &'static str,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// The body is a JSON array of `schema_name`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub list: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct OperationSpec {
    #[serde(serialize_with = "ser_method")]
    pub method: Method,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub params: Vec<ParamSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodySpec>,
    pub responses: Vec<ResponseSpec>,
    /// Bearer token required.
    pub secured: bool,
}

fn ser_method<S: serde::Serializer>(m: &Method, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(m.as_str())
}

/// Sink for operation descriptions. Implemented by the REST host.
pub trait OpenApiRegistry: Send + Sync {
    fn register_operation(&self, spec: &OperationSpec);

    /// Adds `schemas` under components unless `name` is already there and
    /// returns the component name to reference.
    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String;
}

/// Registers `T` and its dependencies, returning the component name.
pub fn ensure_schema<T>(registry: &dyn OpenApiRegistry) -> String
where
    T: utoipa::ToSchema + 'static,
{
    let name = T::name().to_string();
    let mut collected: SchemaCollection = vec![(name.clone(), <T as utoipa::PartialSchema>::schema())];
    T::schemas(&mut collected);
    registry.ensure_schema_raw(&name, collected)
}

pub struct OperationBuilder<H, R, S = ()>
where
    H: HandlerSlot<S>,
{
    spec: OperationSpec,
    method_router: <H as HandlerSlot<S>>::Slot,
    _handler: PhantomData<H>,
    _response: PhantomData<R>,
    _state: PhantomData<fn() -> S>,
}

impl<S> OperationBuilder<Missing, Missing, S> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            spec: OperationSpec {
                method,
                path: path.into(),
                operation_id: None,
                summary: None,
                description: None,
                tags: Vec::new(),
                params: Vec::new(),
                request_body: None,
                responses: Vec::new(),
                secured: false,
            },
            method_router: (),
            _handler: PhantomData,
            _response: PhantomData,
            _state: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }
}

impl<H, R, S> OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.spec.summary = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.spec.description = Some(text.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(tag.into());
        self
    }

    pub fn path_param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.spec.params.push(ParamSpec {
            name: name.into(),
            location: ParamLocation::Path,
            required: true,
            description: Some(description.into()),
        });
        self
    }

    pub fn query_param(
        mut self,
        name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        self.spec.params.push(ParamSpec {
            name: name.into(),
            location: ParamLocation::Query,
            required,
            description: Some(description.into()),
        });
        self
    }

    pub fn json_request<T>(
        mut self,
        registry: &dyn OpenApiRegistry,
        description: impl Into<String>,
    ) -> Self
    where
        T: utoipa::ToSchema + 'static,
    {
        self.spec.request_body = Some(RequestBodySpec {
            content_type: "application/json",
            description: Some(description.into()),
            schema_name: ensure_schema::<T>(registry),
            required: true,
        });
        self
    }

    /// Marks the operation as requiring `Authorization: Bearer <jwt>`.
    pub fn bearer_auth(mut self) -> Self {
        self.spec.secured = true;
        self.spec.params.push(ParamSpec {
            name: "Authorization".into(),
            location: ParamLocation::Header,
            required: true,
            description: None,
        });
        self
    }
}

impl<R, S> OperationBuilder<Missing, R, S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn handler<F, T>(self, h: F) -> OperationBuilder<Present, R, S>
    where
        F: Handler<T, S> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        let method_router = match self.spec.method {
            Method::GET => axum::routing::get(h),
            Method::POST => axum::routing::post(h),
            Method::PUT => axum::routing::put(h),
            Method::PATCH => axum::routing::patch(h),
            Method::DELETE => axum::routing::delete(h),
            _ => axum::routing::any(h),
        };
        OperationBuilder {
            spec: self.spec,
            method_router,
            _handler: PhantomData,
            _response: self._response,
            _state: self._state,
        }
    }
}

impl<H, S> OperationBuilder<H, Missing, S>
where
    H: HandlerSlot<S>,
{
    fn first_response(mut self, resp: ResponseSpec) -> OperationBuilder<H, Present, S> {
        self.spec.responses.push(resp);
        OperationBuilder {
            spec: self.spec,
            method_router: self.method_router,
            _handler: self._handler,
            _response: PhantomData,
            _state: self._state,
        }
    }

    /// JSON body without a published schema.
    pub fn json_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.first_response(ResponseSpec {
            status,
            content_type: "application/json",
            description: description.into(),
            schema_name: None,
            list: false,
        })
    }

    pub fn json_response_with_schema<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + 'static,
    {
        let schema_name = Some(ensure_schema::<T>(registry));
        self.first_response(ResponseSpec {
            status,
            content_type: "application/json",
            description: description.into(),
            schema_name,
            list: false,
        })
    }

    pub fn json_list_response<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + 'static,
    {
        let schema_name = Some(ensure_schema::<T>(registry));
        self.first_response(ResponseSpec {
            status,
            content_type: "application/json",
            description: description.into(),
            schema_name,
            list: true,
        })
    }

    pub fn text_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.first_response(ResponseSpec {
            status,
            content_type: "text/plain",
            description: description.into(),
            schema_name: None,
            list: false,
        })
    }

    /// `text/event-stream` whose `data:` lines carry `T` as JSON.
    pub fn sse_json<T>(
        self,
        registry: &dyn OpenApiRegistry,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + 'static,
    {
        let schema_name = Some(ensure_schema::<T>(registry));
        self.first_response(ResponseSpec {
            status: 200,
            content_type: "text/event-stream",
            description: description.into(),
            schema_name,
            list: false,
        })
    }
}

impl<H, S> OperationBuilder<H, Present, S>
where
    H: HandlerSlot<S>,
{
    pub fn json_response_with_schema<T>(
        mut self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> Self
    where
        T: utoipa::ToSchema + 'static,
    {
        self.spec.responses.push(ResponseSpec {
            status,
            content_type: "application/json",
            description: description.into(),
            schema_name: Some(ensure_schema::<T>(registry)),
            list: false,
        });
        self
    }

    pub fn problem_response(
        mut self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> Self {
        self.spec.responses.push(ResponseSpec {
            status,
            content_type: APPLICATION_PROBLEM_JSON,
            description: description.into(),
            schema_name: Some(ensure_schema::<Problem>(registry)),
            list: false,
        });
        self
    }

    /// 400, 401, 404 and 500 as problem responses.
    pub fn standard_errors(self, registry: &dyn OpenApiRegistry) -> Self {
        self.problem_response(registry, 400, "Bad Request")
            .problem_response(registry, 401, "Unauthorized")
            .problem_response(registry, 404, "Not Found")
            .problem_response(registry, 500, "Internal Server Error")
    }
}

impl<S> OperationBuilder<Present, Present, S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn register(self, router: Router<S>, openapi: &dyn OpenApiRegistry) -> Router<S> {
        openapi.register_operation(&self.spec);
        router.route(&self.spec.path, self.method_router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::Json;
    use parking_lot::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct Recorder {
        ops: Mutex<Vec<OperationSpec>>,
        schemas: Mutex<Vec<String>>,
    }

    impl OpenApiRegistry for Recorder {
        fn register_operation(&self, spec: &OperationSpec) {
            self.ops.lock().push(spec.clone());
        }

        fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String {
            let mut seen = self.schemas.lock();
            for (n, _) in schemas {
                if !seen.contains(&n) {
                    seen.push(n);
                }
            }
            name.to_string()
        }
    }

    #[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
    struct NewEvent {
        name: String,
        guests: Vec<Guest>,
    }

    #[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
    struct Guest {
        email: String,
    }

    async fn list_events() -> Json<serde_json::Value> {
        Json(serde_json::json!([]))
    }

    async fn create_event() -> Json<serde_json::Value> {
        Json(serde_json::json!({"id": 1}))
    }

    #[test]
    fn descriptive_methods_fill_the_spec() {
        let b = OperationBuilder::<Missing, Missing, ()>::get("/api/events/{id}")
            .operation_id("events.get")
            .summary("Get event")
            .tag("events")
            .path_param("id", "Event id")
            .bearer_auth();
        let spec = b.spec();
        assert_eq!(spec.method, Method::GET);
        assert_eq!(spec.operation_id.as_deref(), Some("events.get"));
        assert!(spec.secured);
        assert_eq!(spec.params.len(), 2);
        assert_eq!(spec.params[0].location, ParamLocation::Path);
    }

    #[tokio::test]
    async fn routes_on_one_path_share_it_by_method() {
        let rec = Recorder::default();
        let router = OperationBuilder::<Missing, Missing, ()>::get("/api/events")
            .handler(list_events)
            .json_response(200, "Events")
            .register(Router::new(), &rec);
        let router = OperationBuilder::<Missing, Missing, ()>::post("/api/events")
            .json_request::<NewEvent>(&rec, "New event")
            .handler(create_event)
            .json_response(201, "Created")
            .standard_errors(&rec)
            .register(router, &rec);

        let ops = rec.ops.lock();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[1].responses.len(), 5);
        assert_eq!(ops[1].responses[1].content_type, APPLICATION_PROBLEM_JSON);
        assert_eq!(ops[1].responses[1].schema_name.as_deref(), Some("Problem"));
        assert_eq!(
            ops[1].request_body.as_ref().map(|b| b.schema_name.as_str()),
            Some("NewEvent")
        );
        drop(ops);

        let resp = router
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/api/events")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
    }

    #[test]
    fn request_schema_brings_its_dependencies() {
        let rec = Recorder::default();
        let _ = OperationBuilder::<Missing, Missing, ()>::post("/api/events")
            .json_request::<NewEvent>(&rec, "New event");
        let schemas = rec.schemas.lock();
        assert_eq!(schemas[0], "NewEvent");
        assert!(schemas.contains(&"Guest".to_string()), "{schemas:?}");
    }

    #[test]
    fn spec_serializes_method_as_text() {
        let b = OperationBuilder::<Missing, Missing, ()>::delete("/api/messages/{id}")
            .handler(list_events)
            .json_response(200, "Deleted");
        let v = serde_json::to_value(b.spec()).unwrap();
        assert_eq!(v["method"], "DELETE");
        assert_eq!(v["responses"][0]["status"], 200);
    }
}
