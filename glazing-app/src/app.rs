//! Wiring shared by every subcommand: the lead store, the pricing service
//! and estimate delivery.

use std::fmt::Write as _;
use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use glazing_core::catalog::COMPANY;
use glazing_core::db::RepositoryRegistry;
use glazing_core::service::{EstimateDispatcher, ServiceError, SimulatedPricingService};
use glazing_core::{
    Estimate, NewQuoteRequest, PriceTable, QuoteRepository, QuoteRequest, VatNotice,
};
use glazing_data::PriceTableLoader;
use glazing_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

use crate::config::Settings;

/// Every compiled-in lead-store backend.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(settings: &Settings) -> Result<Arc<dyn QuoteRepository>> {
    debug!("connecting to {} backend", settings.database.backend);
    let repo = build_registry()
        .create(&settings.database)
        .await
        .with_context(|| {
            format!(
                "Failed to open {} database '{}'",
                settings.database.backend, settings.database.connection_string
            )
        })?;
    Ok(Arc::from(repo))
}

/// Built-in prices, overridden by stored prices, overridden by the CSV
/// named in settings.
pub async fn effective_price_table(
    settings: &Settings,
    repo: &dyn QuoteRepository,
) -> Result<PriceTable> {
    let mut table = PriceTable::default();

    let stored = repo
        .list_unit_prices()
        .await
        .context("Failed to read stored unit prices")?;
    debug!(count = stored.len(), "stored unit prices");
    for row in stored {
        table.set_unit_price(row.service, row.material, row.unit_price);
    }

    if let Some(path) = &settings.pricing.price_table_csv {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = PriceTableLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        info!(count = records.len(), path = %path.display(), "price overrides loaded");
        for record in records {
            table.set_unit_price(record.service, record.material, record.unit_price);
        }
    }

    Ok(table)
}

pub async fn pricing_service(
    settings: &Settings,
    repo: &dyn QuoteRepository,
) -> Result<SimulatedPricingService> {
    let table = effective_price_table(settings, repo).await?;
    Ok(SimulatedPricingService::new(settings.pricing.delay(), table))
}

/// Records each finished estimate as a lead.
pub struct LeadRecorder {
    repo: Arc<dyn QuoteRepository>,
}

impl LeadRecorder {
    pub fn new(repo: Arc<dyn QuoteRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl EstimateDispatcher for LeadRecorder {
    async fn dispatch(
        &self,
        estimate: &Estimate,
    ) -> Result<(), ServiceError> {
        let stored = self
            .repo
            .create_request(NewQuoteRequest::from(estimate))
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        info!(id = stored.id, price = stored.estimated_price.get(), "quote request recorded");
        Ok(())
    }
}

/// Text block shown at the result step.
pub fn format_estimate(estimate: &Estimate) -> String {
    let selection = &estimate.selection;
    let vat = &estimate.vat;
    let mut out = String::new();

    let _ = writeln!(out, "{}", estimate.heading());
    let _ = writeln!(
        out,
        "  {}: {} x {}",
        selection.service.label(),
        selection.quantity,
        selection.material
    );
    let _ = writeln!(out, "  {} {}", estimate.price, vat.label());
    let _ = writeln!(
        out,
        "  (VAT {}, {} including VAT)",
        VatNotice::format_amount(vat.amount(estimate.price)),
        VatNotice::format_amount(vat.gross(estimate.price))
    );
    let _ = writeln!(
        out,
        "A copy has been sent to {}. Final price is confirmed after a free site survey.",
        selection.contact.email
    );
    out
}

pub fn format_request(request: &QuoteRequest) -> String {
    format!(
        "#{:<4} {}  {:<8} {:<9} x{:<2} {:>8}  {} <{}> {}",
        request.id,
        request.created_at.format("%Y-%m-%d %H:%M"),
        request.service.as_str(),
        request.material.as_str(),
        request.quantity.get(),
        request.estimated_price.to_string(),
        request.name,
        request.email,
        request.phone
    )
}

pub fn format_price_table(table: &PriceTable) -> String {
    let mut out = String::new();
    for row in table.rows() {
        let _ = writeln!(
            out,
            "{:<18} {:<10} {:>8} per unit",
            row.service.label(),
            row.material.as_str(),
            row.unit_price.to_string()
        );
    }
    out
}

/// Booking prompt shown after `proceed`.
pub fn booking_message(anchor: &str) -> String {
    format!(
        "Book your free site survey: call {} ({}) or email {}.\n\
         Showroom: {} {}\n[#{}]",
        COMPANY.phone, COMPANY.hours, COMPANY.email, COMPANY.address, COMPANY.maps_link, anchor
    )
}
