use std::io::Read;

use glazing_core::{Material, Pounds, PriceTable, QuoteRepository, RepositoryError, ServiceType, UnitPrice};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading a price table.
#[derive(Debug, Error)]
pub enum PriceTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Line {line}: unknown service '{value}'")]
    UnknownService { line: usize, value: String },

    #[error("Line {line}: unknown material '{value}'")]
    UnknownMaterial { line: usize, value: String },

    #[error("Line {line}: {material} is not offered for {service}")]
    MaterialNotOffered {
        line: usize,
        service: ServiceType,
        material: Material,
    },

    #[error("Line {line}: unit price must be greater than zero")]
    ZeroPrice { line: usize },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for PriceTableLoaderError {
    fn from(err: csv::Error) -> Self {
        PriceTableLoaderError::CsvParse(err.to_string())
    }
}

/// One row of the price CSV, as written.
///
/// - `service`: `windows` or `doors`
/// - `material`: `aluminium`, `upvc` or `composite` (any case)
/// - `unit_price`: whole pounds per unit
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct RawRecord {
    service: String,
    material: String,
    unit_price: u32,
}

/// A validated price row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitPriceRecord {
    pub service: ServiceType,
    pub material: Material,
    pub unit_price: Pounds,
}

impl From<UnitPriceRecord> for UnitPrice {
    fn from(record: UnitPriceRecord) -> Self {
        UnitPrice {
            service: record.service,
            material: record.material,
            unit_price: record.unit_price,
        }
    }
}

/// Reads `service,material,unit_price` CSV files into a [`PriceTable`] or a
/// [`QuoteRepository`].
pub struct PriceTableLoader;

impl PriceTableLoader {
    /// Parse and validate every row. Stops at the first bad row.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<UnitPriceRecord>, PriceTableLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let raw: RawRecord = result?;
            // Header is line 1.
            records.push(Self::validate(index + 2, raw)?);
        }

        debug!(count = records.len(), "parsed price rows");
        Ok(records)
    }

    fn validate(
        line: usize,
        raw: RawRecord,
    ) -> Result<UnitPriceRecord, PriceTableLoaderError> {
        let service = ServiceType::parse(&raw.service).ok_or_else(|| {
            PriceTableLoaderError::UnknownService {
                line,
                value: raw.service.clone(),
            }
        })?;
        let material = Material::parse(&raw.material).ok_or_else(|| {
            PriceTableLoaderError::UnknownMaterial {
                line,
                value: raw.material.clone(),
            }
        })?;
        if !service.offers(material) {
            return Err(PriceTableLoaderError::MaterialNotOffered {
                line,
                service,
                material,
            });
        }
        if raw.unit_price == 0 {
            return Err(PriceTableLoaderError::ZeroPrice { line });
        }

        Ok(UnitPriceRecord {
            service,
            material,
            unit_price: Pounds::new(raw.unit_price),
        })
    }

    /// Built-in prices overridden by `records`. Later rows win.
    pub fn to_table(records: &[UnitPriceRecord]) -> PriceTable {
        records
            .iter()
            .fold(PriceTable::default(), |table, r| {
                table.with_unit_price(r.service, r.material, r.unit_price)
            })
    }

    /// Upsert every record into the repository in one batch. Either all
    /// rows are stored or none are, and re-running with the same file leaves
    /// the same prices.
    pub async fn load<R: QuoteRepository + ?Sized>(
        repo: &R,
        records: &[UnitPriceRecord],
    ) -> Result<usize, PriceTableLoaderError> {
        let prices: Vec<UnitPrice> = records.iter().cloned().map(UnitPrice::from).collect();
        repo.upsert_unit_prices(&prices).await?;

        info!(count = records.len(), "unit prices stored");
        Ok(records.len())
    }
}
