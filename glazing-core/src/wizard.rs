//! The quote estimator as a linear four-step state machine.
//!
//! ```text
//! ServiceSelection ──next──▶ Configuration ──next──▶ ContactCapture ──calculate──▶ Result
//!        ▲                        │    ▲                    │                        │
//!        └─────────back───────────┘    └───────back─────────┘                        │
//!        ▲                                                                           │
//!        └──────────────────────────────── restart ──────────────────────────────────┘
//! ```
//!
//! Pricing is asynchronous. [`QuoteWizard::begin_calculation`] marks a
//! request in flight and returns a [`PricingRequest`];
//! [`QuoteWizard::complete_calculation`] applies the outcome. A failed
//! outcome rolls back to `ContactCapture` with a message for the customer.
//! Leaving the step (back/restart) abandons the request, and a late answer
//! for it is rejected as stale.
//!
//! # Example
//!
//! ```
//! use glazing_core::service::SimulatedPricingService;
//! use glazing_core::wizard::{QuoteWizard, WizardStep};
//! use glazing_core::{ContactDetails, Material, Pounds, ServiceType};
//!
//! # tokio_test_block(async {
//! let mut wizard = QuoteWizard::new();
//! wizard.select_service(ServiceType::Windows).unwrap();
//! wizard.next().unwrap();
//! wizard.set_quantity(4).unwrap();
//! wizard.select_material(Material::Upvc).unwrap();
//! wizard.next().unwrap();
//! wizard
//!     .set_contact(ContactDetails::new("Sam Jones", "sam@example.com", "020 8889 9982"))
//!     .unwrap();
//!
//! let pricing = SimulatedPricingService::new(std::time::Duration::ZERO, Default::default());
//! let estimate = wizard.calculate(&pricing).await.unwrap();
//! assert_eq!(estimate.price, Pounds::new(2600));
//! assert_eq!(wizard.step(), WizardStep::Result);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::QuoteError;
use crate::models::{ContactDetails, Estimate, Material, Pounds, Quantity, QuoteSelection, ServiceType};
use crate::service::{PricingRequest, PricingService, ServiceError};

/// The four estimator steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    ServiceSelection,
    Configuration,
    ContactCapture,
    Result,
}

impl WizardStep {
    /// 1-based position.
    pub fn number(&self) -> u8 {
        match self {
            Self::ServiceSelection => 1,
            Self::Configuration => 2,
            Self::ContactCapture => 3,
            Self::Result => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::ServiceSelection => "System Selection",
            Self::Configuration => "Dimensions & Material",
            Self::ContactCapture => "Your Details",
            Self::Result => "Your Estimate",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

/// Where the host should take the customer after the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationIntent {
    /// The contact / site survey booking section.
    ContactSection,
}

impl NavigationIntent {
    /// Page anchor the host scrolls to.
    pub fn anchor(&self) -> &'static str {
        match self {
            Self::ContactSection => "contact-form",
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuoteWizard {
    step: WizardStep,
    selection: QuoteSelection,
    pending: Option<u64>,
    next_ticket: u64,
    estimate: Option<Estimate>,
    last_error: Option<String>,
}

impl Default for QuoteWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::ServiceSelection,
            selection: QuoteSelection::default(),
            pending: None,
            next_ticket: 1,
            estimate: None,
            last_error: None,
        }
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selection(&self) -> &QuoteSelection {
        &self.selection
    }

    /// Present only at [`WizardStep::Result`].
    pub fn estimate(&self) -> Option<&Estimate> {
        self.estimate.as_ref()
    }

    pub fn is_calculating(&self) -> bool {
        self.pending.is_some()
    }

    /// Message from the last failed pricing attempt, cleared on retry.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Materials offered for the currently selected service.
    pub fn material_options(&self) -> &'static [Material] {
        self.selection.service.materials()
    }

    /// Whether the calculate action is enabled.
    pub fn can_calculate(&self) -> bool {
        self.step == WizardStep::ContactCapture
            && self.pending.is_none()
            && self.selection.contact.is_complete()
    }

    // ── navigation ───────────────────────────────────────────────────────

    /// Advances from step 1 to 2 or from 2 to 3. Step 3 advances only
    /// through a calculation.
    pub fn next(&mut self) -> Result<WizardStep, QuoteError> {
        let target = match self.step {
            WizardStep::ServiceSelection => WizardStep::Configuration,
            WizardStep::Configuration => WizardStep::ContactCapture,
            step => {
                return Err(QuoteError::InvalidTransition {
                    action: "advance",
                    step,
                });
            }
        };
        if target == WizardStep::Configuration {
            self.revalidate_material();
        }
        self.move_to(target);
        Ok(target)
    }

    /// Steps back from 2 to 1 or from 3 to 2, keeping every selection.
    /// Leaving step 3 abandons any calculation in flight.
    pub fn back(&mut self) -> Result<WizardStep, QuoteError> {
        let target = match self.step {
            WizardStep::Configuration => WizardStep::ServiceSelection,
            WizardStep::ContactCapture => WizardStep::Configuration,
            step => {
                return Err(QuoteError::InvalidTransition {
                    action: "go back",
                    step,
                });
            }
        };
        self.cancel_calculation();
        self.move_to(target);
        Ok(target)
    }

    /// Back to the initial state: step 1, Windows, one unit, Aluminium,
    /// empty contact, no estimate.
    pub fn restart(&mut self) {
        if self.cancel_calculation() {
            info!("restart abandoned pricing request");
        }
        self.step = WizardStep::ServiceSelection;
        self.selection = QuoteSelection::default();
        self.estimate = None;
        self.last_error = None;
        debug!("wizard restarted");
    }

    /// Signals that the customer wants to book a survey. State is unchanged.
    pub fn proceed(&self) -> Result<NavigationIntent, QuoteError> {
        self.require(WizardStep::Result, "proceed")?;
        Ok(NavigationIntent::ContactSection)
    }

    // ── step 1 ───────────────────────────────────────────────────────────

    pub fn select_service(
        &mut self,
        service: ServiceType,
    ) -> Result<(), QuoteError> {
        self.require(WizardStep::ServiceSelection, "select a service")?;
        self.selection.service = service;
        self.revalidate_material();
        Ok(())
    }

    // ── step 2 ───────────────────────────────────────────────────────────

    pub fn set_quantity(
        &mut self,
        quantity: u32,
    ) -> Result<(), QuoteError> {
        self.require(WizardStep::Configuration, "set quantity")?;
        self.selection.quantity = Quantity::new(quantity)?;
        Ok(())
    }

    /// Slider input: out-of-range values snap to 1 or 20.
    pub fn set_quantity_clamped(
        &mut self,
        quantity: i64,
    ) -> Result<Quantity, QuoteError> {
        self.require(WizardStep::Configuration, "set quantity")?;
        self.selection.quantity = Quantity::clamped(quantity);
        Ok(self.selection.quantity)
    }

    pub fn select_material(
        &mut self,
        material: Material,
    ) -> Result<(), QuoteError> {
        self.require(WizardStep::Configuration, "select a material")?;
        let service = self.selection.service;
        if !service.offers(material) {
            return Err(QuoteError::InvalidMaterial { service, material });
        }
        self.selection.material = material;
        Ok(())
    }

    // ── step 3 ───────────────────────────────────────────────────────────

    pub fn set_name(
        &mut self,
        name: impl Into<String>,
    ) -> Result<(), QuoteError> {
        self.require_editable_contact()?;
        self.selection.contact.name = name.into();
        Ok(())
    }

    pub fn set_email(
        &mut self,
        email: impl Into<String>,
    ) -> Result<(), QuoteError> {
        self.require_editable_contact()?;
        self.selection.contact.email = email.into();
        Ok(())
    }

    pub fn set_phone(
        &mut self,
        phone: impl Into<String>,
    ) -> Result<(), QuoteError> {
        self.require_editable_contact()?;
        self.selection.contact.phone = phone.into();
        Ok(())
    }

    pub fn set_contact(
        &mut self,
        contact: ContactDetails,
    ) -> Result<(), QuoteError> {
        self.require_editable_contact()?;
        self.selection.contact = contact;
        Ok(())
    }

    /// Marks a pricing request in flight and returns it.
    ///
    /// # Errors
    ///
    /// * [`QuoteError::InvalidTransition`] outside `ContactCapture`.
    /// * [`QuoteError::CalculationInFlight`] if one is already running.
    /// * [`QuoteError::IncompleteContact`] while any contact field is empty.
    pub fn begin_calculation(&mut self) -> Result<PricingRequest, QuoteError> {
        self.require(WizardStep::ContactCapture, "calculate")?;
        if self.pending.is_some() {
            return Err(QuoteError::CalculationInFlight);
        }
        if !self.selection.contact.is_complete() {
            return Err(QuoteError::IncompleteContact(
                self.selection.contact.missing_fields(),
            ));
        }
        self.revalidate_material();

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending = Some(ticket);
        self.last_error = None;

        debug!(ticket, "pricing request started");
        Ok(PricingRequest {
            ticket,
            service: self.selection.service,
            material: self.selection.material,
            quantity: self.selection.quantity,
        })
    }

    /// Applies the outcome of the request identified by `ticket`.
    ///
    /// On success the wizard moves to `Result`. On failure it stays at
    /// `ContactCapture`, calculation is re-enabled, and (except for
    /// cancellation) the error text is kept in [`QuoteWizard::last_error`].
    pub fn complete_calculation(
        &mut self,
        ticket: u64,
        outcome: Result<Pounds, ServiceError>,
    ) -> Result<&Estimate, QuoteError> {
        if self.pending != Some(ticket) {
            debug!(ticket, "ignoring stale pricing result");
            return Err(QuoteError::StaleCalculation(ticket));
        }
        self.pending = None;

        match outcome {
            Ok(price) => {
                self.last_error = None;
                self.step = WizardStep::Result;
                info!(ticket, price = price.get(), "estimate calculated");
                let estimate: &Estimate =
                    self.estimate.insert(Estimate::new(self.selection.clone(), price));
                Ok(estimate)
            }
            Err(ServiceError::Cancelled) => {
                self.last_error = None;
                Err(QuoteError::Service(ServiceError::Cancelled))
            }
            Err(error) => {
                warn!(ticket, %error, "pricing failed; back to contact details");
                self.last_error = Some(error.to_string());
                Err(QuoteError::Service(error))
            }
        }
    }

    /// Abandons the calculation in flight, if any. Returns whether one was.
    pub fn cancel_calculation(&mut self) -> bool {
        match self.pending.take() {
            Some(ticket) => {
                debug!(ticket, "pricing request abandoned");
                true
            }
            None => false,
        }
    }

    /// Runs a full calculation against `pricing`.
    pub async fn calculate<S>(
        &mut self,
        pricing: &S,
    ) -> Result<&Estimate, QuoteError>
    where
        S: PricingService + ?Sized,
    {
        let request = self.begin_calculation()?;
        let outcome = pricing.quote(&request).await;
        self.complete_calculation(request.ticket, outcome)
    }

    // ── internals ────────────────────────────────────────────────────────

    fn move_to(
        &mut self,
        step: WizardStep,
    ) {
        debug!(from = %self.step, to = %step, "wizard transition");
        self.step = step;
    }

    fn revalidate_material(&mut self) {
        let previous = self.selection.material;
        if self.selection.revalidate_material() {
            debug!(
                service = self.selection.service.as_str(),
                from = previous.as_str(),
                to = self.selection.material.as_str(),
                "material reset for service"
            );
        }
    }

    fn require(
        &self,
        step: WizardStep,
        action: &'static str,
    ) -> Result<(), QuoteError> {
        if self.step == step {
            Ok(())
        } else {
            Err(QuoteError::InvalidTransition {
                action,
                step: self.step,
            })
        }
    }

    fn require_editable_contact(&self) -> Result<(), QuoteError> {
        self.require(WizardStep::ContactCapture, "edit contact details")?;
        if self.pending.is_some() {
            return Err(QuoteError::CalculationInFlight);
        }
        Ok(())
    }
}
