//! Line-based host for the quote wizard.
//!
//! Reads one command per line and prints the wizard's state after each
//! transition. Pricing runs through the configured [`PricingService`]; the
//! finished estimate goes to an [`EstimateDispatcher`].

use std::io::Write;

use anyhow::Result;
use glazing_core::service::{
    EstimateDispatcher, PricingRequest, PricingService, ServiceError, cancellation,
    quote_cancellable,
};
use glazing_core::{Material, Pounds, QuoteError, QuoteWizard, ServiceType, WizardStep};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::app::{booking_message, format_estimate};
use crate::commands::unknown_material;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Service(ServiceType),
    Quantity(u32),
    Material(Material),
    Name(String),
    Email(String),
    Phone(String),
    Next,
    Back,
    Calculate,
    Restart,
    Proceed,
    Show,
    Help,
    Quit,
}

/// Parses one input line. Bare `windows`/`doors` select a service.
///
/// Contact values are taken verbatim after the single separator, so a
/// whitespace-only value is kept and counts as filled in.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim_end_matches(['\r', '\n']).trim_start();
    let (word, raw) = match line.split_once(char::is_whitespace) {
        Some((word, raw)) => (word, raw),
        None => (line, ""),
    };
    let rest = raw.trim();

    let command = match word.to_ascii_lowercase().as_str() {
        "service" => ServiceType::parse(rest)
            .map(Command::Service)
            .ok_or_else(|| format!("unknown service '{rest}' (windows or doors)"))?,
        "quantity" | "qty" => rest
            .parse::<u32>()
            .map(Command::Quantity)
            .map_err(|_| format!("quantity must be a whole number from 1 to 20, got '{rest}'"))?,
        "material" => Material::parse(rest)
            .map(Command::Material)
            .ok_or_else(|| unknown_material(rest))?,
        "name" => Command::Name(raw.to_string()),
        "email" => Command::Email(raw.to_string()),
        "phone" => Command::Phone(raw.to_string()),
        "next" => Command::Next,
        "back" => Command::Back,
        "calculate" | "calc" => Command::Calculate,
        "restart" => Command::Restart,
        "proceed" | "book" => Command::Proceed,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => match ServiceType::parse(other) {
            Some(service) if rest.is_empty() => Command::Service(service),
            _ => return Err(format!("unknown command '{word}' (type 'help')")),
        },
    };
    Ok(command)
}

enum Flow {
    Continue,
    Quit,
}

pub struct WizardHost<'a, P: ?Sized, D: ?Sized> {
    wizard: QuoteWizard,
    pricing: &'a P,
    dispatcher: &'a D,
    ctrl_c_cancels: bool,
    interrupts: Option<mpsc::UnboundedReceiver<()>>,
}

/// Forwards every Ctrl-C for as long as the receiver lives. The process
/// keeps its SIGINT handler once installed, so the host must act on each one.
fn listen_for_ctrl_c() -> (JoinHandle<()>, mpsc::UnboundedReceiver<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    (task, rx)
}

impl<'a, P, D> WizardHost<'a, P, D>
where
    P: PricingService + ?Sized,
    D: EstimateDispatcher + ?Sized,
{
    pub fn new(
        pricing: &'a P,
        dispatcher: &'a D,
    ) -> Self {
        Self {
            wizard: QuoteWizard::new(),
            pricing,
            dispatcher,
            ctrl_c_cancels: false,
            interrupts: None,
        }
    }

    /// Ctrl-C abandons a calculation in flight and otherwise ends the session.
    pub fn with_ctrl_c(mut self) -> Self {
        self.ctrl_c_cancels = true;
        self
    }

    #[cfg(test)]
    fn with_interrupts(
        mut self,
        interrupts: mpsc::UnboundedReceiver<()>,
    ) -> Self {
        self.interrupts = Some(interrupts);
        self
    }

    pub fn wizard(&self) -> &QuoteWizard {
        &self.wizard
    }

    /// Runs until `quit`, end of input or an interrupt at the prompt.
    pub async fn run<R, W>(
        &mut self,
        input: R,
        out: &mut W,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let listener = if self.ctrl_c_cancels && self.interrupts.is_none() {
            let (task, interrupts) = listen_for_ctrl_c();
            self.interrupts = Some(interrupts);
            Some(task)
        } else {
            None
        };

        let result = self.read_commands(input, out).await;
        if let Some(task) = listener {
            task.abort();
        }
        result
    }

    async fn read_commands<R, W>(
        &mut self,
        mut input: R,
        out: &mut W,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.print_step(out)?;

        let mut line = String::new();
        loop {
            write!(out, "[{}] > ", self.wizard.step().number())?;
            out.flush()?;

            line.clear();
            let read = input.read_line(&mut line);
            let read = match self.interrupts.as_mut() {
                Some(interrupts) => tokio::select! {
                    biased;
                    Some(()) = interrupts.recv() => None,
                    n = read => Some(n?),
                },
                None => Some(read.await?),
            };
            let Some(n) = read else {
                info!("interrupt at prompt; leaving wizard");
                writeln!(out)?;
                writeln!(out, "Interrupted.")?;
                break;
            };
            if n == 0 {
                writeln!(out)?;
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(command) => {
                    if let Flow::Quit = self.apply(command, out).await? {
                        break;
                    }
                }
                Err(message) => writeln!(out, "{message}")?,
            }
        }
        Ok(())
    }

    async fn apply<W: Write>(
        &mut self,
        command: Command,
        out: &mut W,
    ) -> Result<Flow> {
        let moves = command_moves(&command);
        let result = match command {
            Command::Service(service) => self.wizard.select_service(service),
            Command::Quantity(n) => self.wizard.set_quantity(n),
            Command::Material(material) => self.wizard.select_material(material),
            Command::Name(v) => self.wizard.set_name(v),
            Command::Email(v) => self.wizard.set_email(v),
            Command::Phone(v) => self.wizard.set_phone(v),
            Command::Next => self.wizard.next().map(|_| ()),
            Command::Back => self.wizard.back().map(|_| ()),
            Command::Restart => {
                self.wizard.restart();
                Ok(())
            }
            Command::Calculate => {
                self.calculate(out).await?;
                return Ok(Flow::Continue);
            }
            Command::Proceed => match self.wizard.proceed() {
                Ok(intent) => {
                    writeln!(out, "{}", booking_message(intent.anchor()))?;
                    return Ok(Flow::Continue);
                }
                Err(e) => Err(e),
            },
            Command::Show => {
                self.print_step(out)?;
                return Ok(Flow::Continue);
            }
            Command::Help => {
                self.print_help(out)?;
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
        };

        match result {
            Ok(()) if moves => self.print_step(out)?,
            Ok(()) => self.print_selection(out)?,
            Err(e) => writeln!(out, "{e}")?,
        }
        Ok(Flow::Continue)
    }

    async fn calculate<W: Write>(
        &mut self,
        out: &mut W,
    ) -> Result<()> {
        let request = match self.wizard.begin_calculation() {
            Ok(request) => request,
            Err(e) => {
                writeln!(out, "{e}")?;
                return Ok(());
            }
        };
        writeln!(out, "Calculating your estimate...")?;
        out.flush()?;

        let outcome = self.quote(&request).await;

        match self.wizard.complete_calculation(request.ticket, outcome) {
            Ok(estimate) => {
                let estimate = estimate.clone();
                writeln!(out)?;
                write!(out, "{}", format_estimate(&estimate))?;
                if let Err(error) = self.dispatcher.dispatch(&estimate).await {
                    warn!(%error, "estimate dispatch failed");
                    writeln!(
                        out,
                        "We could not record your request, please call us to confirm."
                    )?;
                }
                self.print_result_actions(out)?;
            }
            Err(QuoteError::Service(ServiceError::Cancelled)) => {
                writeln!(out, "Calculation cancelled.")?;
            }
            Err(e) => {
                writeln!(out, "Sorry, we couldn't calculate your estimate: {e}")?;
                writeln!(out, "Your details are kept; type 'calculate' to try again.")?;
            }
        }
        Ok(())
    }

    async fn quote(
        &mut self,
        request: &PricingRequest,
    ) -> Result<Pounds, ServiceError> {
        let pricing = self.pricing;
        let Some(interrupts) = self.interrupts.as_mut() else {
            return pricing.quote(request).await;
        };

        let (handle, signal) = cancellation();
        let priced = quote_cancellable(pricing, request, signal);
        tokio::pin!(priced);
        tokio::select! {
            outcome = &mut priced => outcome,
            Some(()) = interrupts.recv() => {
                info!(ticket = request.ticket, "interrupt received; cancelling");
                handle.cancel();
                priced.await
            }
        }
    }

    fn print_step<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<()> {
        let step = self.wizard.step();
        writeln!(out)?;
        writeln!(out, "Step {} of 4: {}", step.number(), step.title())?;

        match step {
            WizardStep::ServiceSelection => {
                for service in ServiceType::all() {
                    writeln!(out, "  {:<8} {}", service.as_str(), service.label())?;
                }
                writeln!(out, "Type a service, then 'next'.")?;
            }
            WizardStep::Configuration => {
                let materials: Vec<&str> = self
                    .wizard
                    .material_options()
                    .iter()
                    .map(|m| m.as_str())
                    .collect();
                writeln!(out, "  quantity <1-20>")?;
                writeln!(out, "  material <{}>", materials.join("|"))?;
                writeln!(out, "Then 'next', or 'back'.")?;
            }
            WizardStep::ContactCapture => {
                writeln!(out, "  name <full name>")?;
                writeln!(out, "  email <address>")?;
                writeln!(out, "  phone <number>")?;
                writeln!(out, "Then 'calculate', or 'back'.")?;
                if let Some(error) = self.wizard.last_error() {
                    writeln!(out, "Last attempt failed: {error}")?;
                }
            }
            WizardStep::Result => {
                if let Some(estimate) = self.wizard.estimate() {
                    write!(out, "{}", format_estimate(estimate))?;
                }
                self.print_result_actions(out)?;
                return Ok(());
            }
        }
        self.print_selection(out)
    }

    fn print_selection<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<()> {
        let selection = self.wizard.selection();
        match self.wizard.step() {
            WizardStep::ServiceSelection => {
                writeln!(out, "Selected: {}", selection.service.label())?;
            }
            WizardStep::Configuration => {
                writeln!(
                    out,
                    "Selected: {} x {}",
                    selection.quantity, selection.material
                )?;
            }
            WizardStep::ContactCapture => {
                let missing = selection.contact.missing_fields();
                if missing.is_empty() {
                    writeln!(out, "Details complete. Type 'calculate'.")?;
                } else {
                    writeln!(out, "Still needed: {}", missing.join(", "))?;
                }
            }
            WizardStep::Result => {}
        }
        Ok(())
    }

    fn print_result_actions<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<()> {
        writeln!(
            out,
            "Type 'proceed' to book a survey, or 'restart' for a new estimate."
        )?;
        Ok(())
    }

    fn print_help<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<()> {
        writeln!(
            out,
            "Commands: service <windows|doors>, quantity <n>, material <m>, \
             name/email/phone <value>, next, back, calculate, proceed, restart, \
             show, help, quit"
        )?;
        Ok(())
    }
}

/// Commands after which the whole step is reprinted.
fn command_moves(command: &Command) -> bool {
    matches!(command, Command::Next | Command::Back | Command::Restart)
}
