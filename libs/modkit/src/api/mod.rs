//! HTTP surface helpers: the route builder, the route catalog and Problem
//! Details responses.

pub mod catalog;
pub mod operation_builder;
pub mod problem;
pub mod response;

pub use catalog::RouteCatalog;
pub use operation_builder::{
    ensure_schema, state, Missing, OpenApiRegistry, OperationBuilder, OperationSpec,
    ParamLocation, ParamSpec, Present, ResponseSpec, SchemaCollection,
};
