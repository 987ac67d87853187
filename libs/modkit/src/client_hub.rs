//! Typed registry of in-process clients.
//!
//! A module publishes its contract once (`register::<dyn AccountsApi>(..)`)
//! and consumers fetch it by the same interface type. Keys are
//! `type_name::<T>()`, which also works for `T = dyn Trait`.

use parking_lot::RwLock;
use std::{any::Any, collections::HashMap, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum ClientHubError {
    #[error("client not registered: {0}")]
    NotFound(&'static str),

    #[error("stored client does not match requested type: {0}")]
    TypeMismatch(&'static str),
}

type Boxed = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ClientHub {
    map: RwLock<HashMap<&'static str, Boxed>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the client for interface `T`.
    /// Arcs already handed out stay valid after a replacement.
    pub fn register<T>(&self, client: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.map
            .write()
            .insert(std::any::type_name::<T>(), Box::new(client));
    }

    pub fn get<T>(&self) -> Result<Arc<T>, ClientHubError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = std::any::type_name::<T>();
        let map = self.map.read();
        let boxed = map.get(key).ok_or(ClientHubError::NotFound(key))?;
        boxed
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(ClientHubError::TypeMismatch(key))
    }

    pub fn remove<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let boxed = self.map.write().remove(std::any::type_name::<T>())?;
        boxed.downcast::<Arc<T>>().ok().map(|b| *b)
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[async_trait::async_trait]
    trait Greeter: Send + Sync {
        async fn greet(&self) -> String;
    }

    struct English;
    #[async_trait::async_trait]
    impl Greeter for English {
        async fn greet(&self) -> String {
            "hello".into()
        }
    }

    struct French;
    #[async_trait::async_trait]
    impl Greeter for French {
        async fn greet(&self) -> String {
            "bonjour".into()
        }
    }

    #[tokio::test]
    async fn dyn_trait_roundtrips_through_the_hub() {
        let hub = ClientHub::new();
        let api: Arc<dyn Greeter> = Arc::new(English);
        hub.register::<dyn Greeter>(api.clone());

        let got = hub.get::<dyn Greeter>().unwrap();
        assert_eq!(got.greet().await, "hello");
        assert!(Arc::ptr_eq(&api, &got));
    }

    #[tokio::test]
    async fn replacement_keeps_old_handles_alive() {
        let hub = ClientHub::new();
        hub.register::<dyn Greeter>(Arc::new(English));
        let old = hub.get::<dyn Greeter>().unwrap();

        hub.register::<dyn Greeter>(Arc::new(French));
        assert_eq!(old.greet().await, "hello");
        assert_eq!(hub.get::<dyn Greeter>().unwrap().greet().await, "bonjour");
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn missing_client_is_reported_by_type() {
        let hub = ClientHub::new();
        let err = hub.get::<dyn Greeter>().err().unwrap();
        assert!(matches!(err, ClientHubError::NotFound(name) if name.contains("Greeter")));
        assert!(hub.remove::<dyn Greeter>().is_none());
    }
}
