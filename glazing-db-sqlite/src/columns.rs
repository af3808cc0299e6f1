use glazing_core::{Material, Pounds, Quantity, RepositoryError, ServiceType};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

fn column<'r, T>(
    row: &'r SqliteRow,
    column: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to read '{}': {}", column, e)))
}

pub fn get_i64(
    row: &SqliteRow,
    name: &str,
) -> Result<i64, RepositoryError> {
    column(row, name)
}

pub fn get_string(
    row: &SqliteRow,
    name: &str,
) -> Result<String, RepositoryError> {
    column(row, name)
}

pub fn get_service(
    row: &SqliteRow,
    name: &str,
) -> Result<ServiceType, RepositoryError> {
    let raw: String = column(row, name)?;
    ServiceType::parse(&raw)
        .ok_or_else(|| RepositoryError::Database(format!("Unknown service '{}' in '{}'", raw, name)))
}

pub fn get_material(
    row: &SqliteRow,
    name: &str,
) -> Result<Material, RepositoryError> {
    let raw: String = column(row, name)?;
    Material::parse(&raw)
        .ok_or_else(|| RepositoryError::Database(format!("Unknown material '{}' in '{}'", raw, name)))
}

pub fn get_quantity(
    row: &SqliteRow,
    name: &str,
) -> Result<Quantity, RepositoryError> {
    let raw: i64 = column(row, name)?;
    u32::try_from(raw)
        .ok()
        .and_then(|n| Quantity::new(n).ok())
        .ok_or_else(|| RepositoryError::Database(format!("Quantity {} in '{}' out of range", raw, name)))
}

pub fn get_pounds(
    row: &SqliteRow,
    name: &str,
) -> Result<Pounds, RepositoryError> {
    let raw: i64 = column(row, name)?;
    u32::try_from(raw)
        .map(Pounds::new)
        .map_err(|_| RepositoryError::Database(format!("Amount {} in '{}' out of range", raw, name)))
}
