use async_trait::async_trait;
use glazing_core::db::{DbConfig, QuoteRepository, RepositoryError, RepositoryFactory};
use sqlx::sqlite::SqlitePoolOptions;

use crate::repository::SqliteRepository;

/// Turns a connection string from settings into a sqlx URL.
///
/// * `:memory:` (or empty) becomes `sqlite::memory:`.
/// * Anything already starting with `sqlite:` passes through.
/// * A bare path is opened read-write and created if missing.
pub fn database_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() || trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", trimmed)
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use glazing_core::db::RepositoryRegistry;
/// use glazing_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database and applies pending migrations.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);

        // Each in-memory connection is its own database; keep to one.
        let repo = if url == "sqlite::memory:" {
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&url)
                .await
                .map_err(|e| RepositoryError::Connection(e.to_string()))?;
            SqliteRepository::new_with_pool(pool)
        } else {
            SqliteRepository::new(&url).await?
        };

        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use glazing_core::db::{DbConfig, RepositoryFactory};
    use glazing_core::{Material, Pounds, ServiceType};
    use pretty_assertions::assert_eq;

    use super::{SqliteRepositoryFactory, database_url};

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[test]
    fn connection_strings_map_to_sqlx_urls() {
        assert_eq!(database_url(":memory:"), "sqlite::memory:");
        assert_eq!(database_url(""), "sqlite::memory:");
        assert_eq!(database_url("leads.db"), "sqlite:leads.db?mode=rwc");
        assert_eq!(database_url("sqlite:x.db"), "sqlite:x.db");
    }

    #[tokio::test]
    async fn creates_in_memory_repository() {
        let repo = SqliteRepositoryFactory
            .create(&DbConfig::default())
            .await
            .expect("failed to create in-memory repository");

        repo.upsert_unit_price(ServiceType::Doors, Material::Composite, Pounds::new(1500))
            .await
            .unwrap();
        assert_eq!(repo.list_unit_prices().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn creates_file_database_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.db");
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: path.display().to_string(),
        };

        let repo = SqliteRepositoryFactory.create(&config).await.unwrap();

        assert!(path.exists());
        assert!(repo.list_requests(None).await.unwrap().is_empty());
    }
}
