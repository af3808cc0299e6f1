use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glazing_core::{
    Material, NewQuoteRequest, Pounds, QuoteRepository, QuoteRequest, RepositoryError,
    ServiceType, UnitPrice,
};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::debug;

use crate::columns::{get_i64, get_material, get_pounds, get_quantity, get_service, get_string};

const REQUEST_COLUMNS: &str = "id, service, material, quantity, name, email, phone, \
                               estimated_price, created_at";

const UPSERT_UNIT_PRICE: &str = "INSERT INTO unit_price (service, material, unit_price, updated_at)
     VALUES (?, ?, ?, ?)
     ON CONFLICT (service, material)
     DO UPDATE SET unit_price = excluded.unit_price, updated_at = excluded.updated_at";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| {
                RepositoryError::Connection(format!(
                    "Failed to connect to database '{}': {}",
                    database_url, e
                ))
            })?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to run migrations: {}", e)))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_quote_request(row: &SqliteRow) -> Result<QuoteRequest, RepositoryError> {
    Ok(QuoteRequest {
        id: get_i64(row, "id")?,
        service: get_service(row, "service")?,
        material: get_material(row, "material")?,
        quantity: get_quantity(row, "quantity")?,
        name: get_string(row, "name")?,
        email: get_string(row, "email")?,
        phone: get_string(row, "phone")?,
        estimated_price: get_pounds(row, "estimated_price")?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

fn row_to_unit_price(row: &SqliteRow) -> Result<UnitPrice, RepositoryError> {
    Ok(UnitPrice {
        service: get_service(row, "service")?,
        material: get_material(row, "material")?,
        unit_price: get_pounds(row, "unit_price")?,
    })
}

#[async_trait]
impl QuoteRepository for SqliteRepository {
    async fn create_request(
        &self,
        request: NewQuoteRequest,
    ) -> Result<QuoteRequest, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO quote_request (
                service, material, quantity, name, email, phone,
                estimated_price, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.service.as_str())
        .bind(request.material.as_str())
        .bind(i64::from(request.quantity.get()))
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(i64::from(request.estimated_price.get()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        debug!(id, service = request.service.as_str(), "quote request stored");
        self.get_request(id).await
    }

    async fn get_request(
        &self,
        id: i64,
    ) -> Result<QuoteRequest, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM quote_request WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_quote_request(&row)
    }

    async fn list_requests(
        &self,
        service: Option<ServiceType>,
    ) -> Result<Vec<QuoteRequest>, RepositoryError> {
        let rows = match service {
            Some(service) => {
                sqlx::query(&format!(
                    "SELECT {REQUEST_COLUMNS} FROM quote_request
                     WHERE service = ? ORDER BY created_at DESC, id DESC"
                ))
                .bind(service.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {REQUEST_COLUMNS} FROM quote_request
                     ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_quote_request).collect()
    }

    async fn delete_request(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM quote_request WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_unit_prices(&self) -> Result<Vec<UnitPrice>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT service, material, unit_price FROM unit_price ORDER BY service, material",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_unit_price).collect()
    }

    async fn upsert_unit_price(
        &self,
        service: ServiceType,
        material: Material,
        unit_price: Pounds,
    ) -> Result<(), RepositoryError> {
        sqlx::query(UPSERT_UNIT_PRICE)
        .bind(service.as_str())
        .bind(material.as_str())
        .bind(i64::from(unit_price.get()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn upsert_unit_prices(
        &self,
        prices: &[UnitPrice],
    ) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let now = Utc::now();
        for price in prices {
            sqlx::query(UPSERT_UNIT_PRICE)
                .bind(price.service.as_str())
                .bind(price.material.as_str())
                .bind(i64::from(price.unit_price.get()))
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
        }

        // Dropping `tx` on an early return rolls everything back.
        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        debug!(count = prices.len(), "unit prices upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glazing_core::Quantity;
    use pretty_assertions::assert_eq;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool);
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn new_request(
        service: ServiceType,
        material: Material,
        quantity: u32,
        price: u32,
    ) -> NewQuoteRequest {
        NewQuoteRequest {
            service,
            material,
            quantity: Quantity::new(quantity).unwrap(),
            name: "Dana Miller".to_string(),
            email: "dana@example.com".to_string(),
            phone: "020 8889 9982".to_string(),
            estimated_price: Pounds::new(price),
        }
    }

    // =========================================================================
    // quote requests
    // =========================================================================

    #[tokio::test]
    async fn test_create_and_get_request() {
        let repo = setup_test_db().await;

        let created = repo
            .create_request(new_request(ServiceType::Windows, Material::Upvc, 4, 2600))
            .await
            .expect("Should create request");

        assert!(created.id > 0);
        let fetched = repo
            .get_request(created.id)
            .await
            .expect("Should fetch request");
        assert_eq!(fetched, created);
        assert_eq!(fetched.material, Material::Upvc);
        assert_eq!(fetched.quantity.get(), 4);
        assert_eq!(fetched.estimated_price, Pounds::new(2600));
    }

    #[tokio::test]
    async fn test_get_request_not_found() {
        let repo = setup_test_db().await;

        let result = repo.get_request(999).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_requests_newest_first() {
        let repo = setup_test_db().await;
        let first = repo
            .create_request(new_request(ServiceType::Windows, Material::Aluminium, 1, 1200))
            .await
            .unwrap();
        let second = repo
            .create_request(new_request(ServiceType::Doors, Material::Composite, 1, 1500))
            .await
            .unwrap();

        let all = repo.list_requests(None).await.expect("Should list all");

        let ids: Vec<i64> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_list_requests_filters_by_service() {
        let repo = setup_test_db().await;
        repo.create_request(new_request(ServiceType::Windows, Material::Upvc, 2, 1300))
            .await
            .unwrap();
        repo.create_request(new_request(ServiceType::Doors, Material::Aluminium, 1, 3800))
            .await
            .unwrap();

        let doors = repo
            .list_requests(Some(ServiceType::Doors))
            .await
            .expect("Should list doors");

        assert_eq!(doors.len(), 1);
        assert_eq!(doors[0].service, ServiceType::Doors);
        assert_eq!(doors[0].estimated_price, Pounds::new(3800));
    }

    #[tokio::test]
    async fn test_delete_request() {
        let repo = setup_test_db().await;
        let created = repo
            .create_request(new_request(ServiceType::Windows, Material::Upvc, 1, 650))
            .await
            .unwrap();

        repo.delete_request(created.id)
            .await
            .expect("Should delete request");

        assert_eq!(repo.get_request(created.id).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.delete_request(created.id).await, Err(RepositoryError::NotFound));
    }

    // =========================================================================
    // unit prices
    // =========================================================================

    #[tokio::test]
    async fn test_unit_prices_start_empty() {
        let repo = setup_test_db().await;

        assert!(repo.list_unit_prices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_unit_price_replaces_existing() {
        let repo = setup_test_db().await;

        repo.upsert_unit_price(ServiceType::Windows, Material::Upvc, Pounds::new(650))
            .await
            .unwrap();
        repo.upsert_unit_price(ServiceType::Windows, Material::Upvc, Pounds::new(700))
            .await
            .unwrap();

        let prices = repo.list_unit_prices().await.unwrap();
        assert_eq!(
            prices,
            vec![UnitPrice {
                service: ServiceType::Windows,
                material: Material::Upvc,
                unit_price: Pounds::new(700),
            }]
        );
    }

    #[tokio::test]
    async fn test_list_unit_prices_ordered() {
        let repo = setup_test_db().await;
        repo.upsert_unit_price(ServiceType::Windows, Material::Upvc, Pounds::new(650))
            .await
            .unwrap();
        repo.upsert_unit_price(ServiceType::Doors, Material::Composite, Pounds::new(1500))
            .await
            .unwrap();
        repo.upsert_unit_price(ServiceType::Doors, Material::Aluminium, Pounds::new(3800))
            .await
            .unwrap();

        let keys: Vec<(ServiceType, Material)> = repo
            .list_unit_prices()
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.service, p.material))
            .collect();

        assert_eq!(
            keys,
            vec![
                (ServiceType::Doors, Material::Aluminium),
                (ServiceType::Doors, Material::Composite),
                (ServiceType::Windows, Material::Upvc),
            ]
        );
    }

    #[tokio::test]
    async fn test_upsert_unit_prices_is_all_or_nothing() {
        let repo = setup_test_db().await;
        let batch = [
            UnitPrice {
                service: ServiceType::Windows,
                material: Material::Upvc,
                unit_price: Pounds::new(700),
            },
            UnitPrice {
                service: ServiceType::Doors,
                material: Material::Composite,
                unit_price: Pounds::new(0),
            },
        ];

        let result = repo.upsert_unit_prices(&batch).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
        assert!(repo.list_unit_prices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_unit_prices_stores_batch() {
        let repo = setup_test_db().await;
        let batch = [
            UnitPrice {
                service: ServiceType::Doors,
                material: Material::Composite,
                unit_price: Pounds::new(1550),
            },
            UnitPrice {
                service: ServiceType::Windows,
                material: Material::Upvc,
                unit_price: Pounds::new(700),
            },
        ];

        repo.upsert_unit_prices(&batch).await.unwrap();

        assert_eq!(repo.list_unit_prices().await.unwrap(), batch.to_vec());
    }
}
