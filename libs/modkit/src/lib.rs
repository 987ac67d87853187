//! # ModKit
//!
//! Module kit for the EventHub server. A module is a struct implementing
//! [`Module`] plus any of the capability traits ([`DbModule`],
//! [`RestfulModule`], [`RestHostModule`], [`StatefulModule`]). The server
//! registers modules explicitly with a [`registry::RegistryBuilder`]; the
//! runner drives them through the phases
//! init → db → rest → start → stop.
//!
//! ```rust,ignore
//! let mut b = ModuleRegistry::builder();
//! b.register_core("vendors", &["accounts"], vendors.clone())
//!     .register_db("vendors", vendors.clone())
//!     .register_rest("vendors", vendors);
//! let registry = b.build()?;
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod api;
pub mod auth;
pub mod client_hub;
pub mod context;
pub mod contracts;
pub mod http;
pub mod registry;
pub mod runtime;

pub use api::problem::{
    bad_request, conflict, forbidden, from_parts, internal_error, not_found, unauthorized,
    Problem, ProblemResponse, ValidationError,
};
pub use api::{OpenApiRegistry, OperationBuilder, RouteCatalog};
pub use auth::{AuthUser, JwtAuth, Role};
pub use client_hub::ClientHub;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};
pub use contracts::*;
pub use http::client::TracedClient;
pub use http::sse::{NamedEvent, SseBroadcaster};
pub use registry::{ModuleRegistry, RegistryBuilder, RegistryError};
pub use runtime::{run, DbOptions, RunOptions, ShutdownOptions};
