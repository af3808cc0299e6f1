use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::repository::{QuoteRepository, RepositoryError};

/// Which lead store to open and how.
///
/// `backend` selects a registered [`RepositoryFactory`]; `connection_string`
/// is handed to it untouched.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `sqlite`   | `leads.db`, `:memory:`              |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Opens a [`QuoteRepository`] for one storage backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase key the factory is registered under.
    fn backend_name(&self) -> &'static str;

    /// Connect, migrate if needed, and hand back a ready repository.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError>;
}

/// Backend factories keyed by name. The app registers every compiled-in
/// backend at startup and opens the one named in its settings.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A later factory with the same name replaces the earlier one.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Sorted.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// # Errors
    /// * [`RepositoryError::Configuration`] if `config.backend` is not
    ///   registered. The message names both the requested backend and the
    ///   registered ones.
    /// * Whatever the selected factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        info!(backend = %config.backend, "opening lead store");
        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::{DbConfig, QuoteRepository, RepositoryError, RepositoryFactory, RepositoryRegistry};
    use crate::models::{
        Material, NewQuoteRequest, Pounds, QuoteRequest, ServiceType, UnitPrice,
    };

    // ── fakes ────────────────────────────────────────────────────────────
    // The registry only routes; the repository methods are never reached.
    struct NullRepository;

    #[async_trait]
    impl QuoteRepository for NullRepository {
        async fn create_request(
            &self,
            _request: NewQuoteRequest,
        ) -> Result<QuoteRequest, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn get_request(
            &self,
            _id: i64,
        ) -> Result<QuoteRequest, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn list_requests(
            &self,
            _service: Option<ServiceType>,
        ) -> Result<Vec<QuoteRequest>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn delete_request(
            &self,
            _id: i64,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn list_unit_prices(&self) -> Result<Vec<UnitPrice>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn upsert_unit_price(
            &self,
            _service: ServiceType,
            _material: Material,
            _unit_price: Pounds,
        ) -> Result<(), RepositoryError> {
            Ok(())
        }
        async fn upsert_unit_prices(
            &self,
            _prices: &[UnitPrice],
        ) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    struct CountingFactory {
        name: &'static str,
        opened: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RepositoryFactory for CountingFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(NullRepository))
        }
    }

    struct BrokenFactory;

    #[async_trait]
    impl RepositoryFactory for BrokenFactory {
        fn backend_name(&self) -> &'static str {
            "broken"
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
            Err(RepositoryError::Connection("disk unplugged".to_string()))
        }
    }

    fn counting(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<AtomicUsize>) {
        let opened = Arc::new(AtomicUsize::new(0));
        (
            Box::new(CountingFactory {
                name,
                opened: opened.clone(),
            }),
            opened,
        )
    }

    fn config(backend: &str) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: ":memory:".to_string(),
        }
    }

    // ── DbConfig ─────────────────────────────────────────────────────────

    #[test]
    fn default_config_is_in_memory_sqlite() {
        assert_eq!(DbConfig::default(), config("sqlite"));
    }

    // ── registration ─────────────────────────────────────────────────────

    #[test]
    fn empty_registry_lists_nothing() {
        assert!(RepositoryRegistry::default().available_backends().is_empty());
    }

    #[test]
    fn backends_are_listed_alphabetically() {
        let mut registry = RepositoryRegistry::new();
        registry.register(counting("sqlite").0);
        registry.register(counting("memory").0);

        assert_eq!(registry.available_backends(), vec!["memory", "sqlite"]);
    }

    #[tokio::test]
    async fn re_registering_replaces_the_factory() {
        let mut registry = RepositoryRegistry::new();
        let (first, first_opened) = counting("sqlite");
        let (second, second_opened) = counting("sqlite");
        registry.register(first);
        registry.register(second);

        registry.create(&config("sqlite")).await.unwrap();

        assert_eq!(registry.available_backends(), vec!["sqlite"]);
        assert_eq!(first_opened.load(Ordering::SeqCst), 0);
        assert_eq!(second_opened.load(Ordering::SeqCst), 1);
    }

    // ── routing ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn create_routes_to_named_backend_only() {
        let mut registry = RepositoryRegistry::new();
        let (sqlite, sqlite_opened) = counting("sqlite");
        let (memory, memory_opened) = counting("memory");
        registry.register(sqlite);
        registry.register(memory);

        let repo = registry.create(&config("sqlite")).await.unwrap();

        assert!(repo.list_requests(None).await.unwrap().is_empty());
        assert_eq!(sqlite_opened.load(Ordering::SeqCst), 1);
        assert_eq!(memory_opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_backend_is_a_configuration_error() {
        let mut registry = RepositoryRegistry::new();
        registry.register(counting("sqlite").0);

        match registry.create(&config("postgres")).await {
            Err(RepositoryError::Configuration(msg)) => {
                assert!(msg.contains("postgres"));
                assert!(msg.contains("sqlite"));
            }
            Err(other) => panic!("expected Configuration error, got {other:?}"),
            Ok(_) => panic!("expected Configuration error, got a repository"),
        }
    }

    #[tokio::test]
    async fn factory_errors_pass_through() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(BrokenFactory));

        let result = registry.create(&config("broken")).await;

        assert!(matches!(
            result,
            Err(RepositoryError::Connection(msg)) if msg == "disk unplugged"
        ));
    }
}
