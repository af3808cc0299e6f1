//! One function per `glazing` subcommand.
//!
//! Each takes its input and output streams explicitly so the whole command
//! can be driven from tests.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;
use glazing_chat::{ChatBackend, ChatConfig, ChatError, ChatSession, GeminiClient};
use glazing_core::catalog::{COMPANY, Catalog};
use glazing_core::service::{EstimateDispatcher, PricingService, SimulatedPricingService};
use glazing_core::{ContactDetails, Material, QuoteRepository, QuoteWizard, ServiceType};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::app::{format_estimate, format_price_table, format_request};
use crate::wizard_host::WizardHost;

/// Flags for the non-interactive `quote` subcommand.
#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    /// `windows` or `doors`.
    #[arg(long, value_parser = parse_service)]
    pub service: ServiceType,

    /// Aluminium, uPVC or Composite. Defaults to the service's first material.
    #[arg(long, value_parser = parse_material)]
    pub material: Option<Material>,

    /// Number of units, 1 to 20.
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,
}

pub fn parse_service(s: &str) -> Result<ServiceType, String> {
    ServiceType::parse(s).ok_or_else(|| format!("unknown service '{s}' (windows or doors)"))
}

pub fn parse_material(s: &str) -> Result<Material, String> {
    Material::parse(s).ok_or_else(|| unknown_material(s))
}

/// Error text listing every material name accepted on input.
pub fn unknown_material(s: &str) -> String {
    let names: Vec<&str> = Material::all().iter().map(|m| m.as_str()).collect();
    format!("unknown material '{s}' (one of {})", names.join(", "))
}

pub fn banner() -> String {
    format!(
        "{} | {}\n{} ({} reviews) | {} | {}",
        COMPANY.name,
        COMPANY.tagline,
        COMPANY.rating,
        COMPANY.review_count,
        COMPANY.phone,
        COMPANY.hours
    )
}

// ============================================================================
// quote
// ============================================================================

/// Walks the wizard from the flags, prices the selection and dispatches the
/// estimate. A dispatch failure is reported but does not fail the command.
pub async fn run_quote<P, D, W>(
    args: &QuoteArgs,
    pricing: &P,
    dispatcher: &D,
    out: &mut W,
) -> Result<()>
where
    P: PricingService + ?Sized,
    D: EstimateDispatcher + ?Sized,
    W: Write,
{
    let mut wizard = QuoteWizard::new();
    wizard.select_service(args.service)?;
    wizard.next()?;
    wizard.set_quantity(args.quantity)?;
    if let Some(material) = args.material {
        wizard.select_material(material)?;
    }
    wizard.next()?;
    wizard.set_contact(ContactDetails::new(
        args.name.as_str(),
        args.email.as_str(),
        args.phone.as_str(),
    ))?;

    let estimate = wizard
        .calculate(pricing)
        .await
        .context("Failed to calculate estimate")?
        .clone();

    write!(out, "{}", format_estimate(&estimate))?;
    if let Err(error) = dispatcher.dispatch(&estimate).await {
        warn!(%error, "estimate dispatch failed");
        writeln!(
            out,
            "Your request was not recorded ({error}). Please call {}.",
            COMPANY.phone
        )?;
    }
    Ok(())
}

// ============================================================================
// wizard
// ============================================================================

pub async fn run_wizard<P, D, R, W>(
    pricing: &P,
    dispatcher: &D,
    input: R,
    out: &mut W,
) -> Result<()>
where
    P: PricingService + ?Sized,
    D: EstimateDispatcher + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{}", banner())?;
    writeln!(out, "Get a quote in 4 steps. Type 'help' for commands.")?;
    WizardHost::new(pricing, dispatcher)
        .with_ctrl_c()
        .run(input, out)
        .await
}

// ============================================================================
// requests / prices
// ============================================================================

pub async fn run_requests<W: Write>(
    repo: &dyn QuoteRepository,
    service: Option<ServiceType>,
    out: &mut W,
) -> Result<()> {
    let requests = repo
        .list_requests(service)
        .await
        .context("Failed to list quote requests")?;

    if requests.is_empty() {
        writeln!(out, "No quote requests recorded.")?;
        return Ok(());
    }
    for request in &requests {
        writeln!(out, "{}", format_request(request))?;
    }
    writeln!(out, "{} request(s)", requests.len())?;
    Ok(())
}

pub fn run_prices<W: Write>(
    pricing: &SimulatedPricingService,
    out: &mut W,
) -> Result<()> {
    write!(out, "{}", format_price_table(pricing.table()))?;
    writeln!(out, "All prices exclude VAT @ 20%.")?;
    Ok(())
}

// ============================================================================
// chat
// ============================================================================

/// Gemini client for `config`, or an error naming the environment variables
/// to set when no key was found.
pub fn chat_backend(config: Option<ChatConfig>) -> Result<GeminiClient> {
    let Some(config) = config else {
        bail!(
            "{}: set {}",
            ChatError::MissingApiKey,
            crate::config::API_KEY_VARS.join(" or ")
        );
    };
    GeminiClient::new(config).context("Failed to create chat client")
}

/// Line-based chat loop. `/reset` clears the conversation, `/quit` or end of
/// input leaves.
pub async fn run_chat<B, R, W>(
    session: &mut ChatSession<B>,
    mut input: R,
    out: &mut W,
) -> Result<()>
where
    B: ChatBackend,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Some(greeting) = session.history().first() {
        writeln!(out, "assistant: {}", greeting.text)?;
    }

    let mut line = String::new();
    loop {
        write!(out, "you: ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            writeln!(out)?;
            break;
        }

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                session.reset();
                info!("chat reset");
                if let Some(greeting) = session.history().first() {
                    writeln!(out, "assistant: {}", greeting.text)?;
                }
            }
            text => match session.send(text).await {
                Ok(reply) => writeln!(out, "assistant: {}", reply.text)?,
                Err(e) => writeln!(out, "{e}")?,
            },
        }
    }
    Ok(())
}

/// Standard catalog session over `backend`.
pub fn chat_session<B: ChatBackend>(backend: B) -> ChatSession<B> {
    ChatSession::new(backend, &Catalog::standard())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use glazing_chat::ChatMessage;
    use glazing_core::service::{NoopDispatcher, ServiceError};
    use glazing_core::{Estimate, Pounds, PriceTable};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::app::{LeadRecorder, open_repository};
    use crate::config::Settings;

    fn instant() -> SimulatedPricingService {
        SimulatedPricingService::new(Duration::ZERO, PriceTable::default())
    }

    fn memory_settings() -> Settings {
        let mut settings = Settings::default();
        settings.database.connection_string = ":memory:".to_string();
        settings
    }

    fn quote_args(service: ServiceType) -> QuoteArgs {
        QuoteArgs {
            service,
            material: None,
            quantity: 1,
            name: "Sam Jones".to_string(),
            email: "sam@example.com".to_string(),
            phone: "07700 900123".to_string(),
        }
    }

    struct FailingDispatcher;

    #[async_trait]
    impl EstimateDispatcher for FailingDispatcher {
        async fn dispatch(
            &self,
            _estimate: &Estimate,
        ) -> Result<(), ServiceError> {
            Err(ServiceError::Unavailable("smtp down".to_string()))
        }
    }

    struct EchoBackend {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn generate(
            &self,
            _system: &str,
            _history: &[ChatMessage],
            message: &str,
        ) -> Result<String, ChatError> {
            *self.calls.lock().unwrap() += 1;
            Ok(format!("echo: {message}"))
        }
    }

    // =========================================================================
    // quote
    // =========================================================================

    #[tokio::test]
    async fn quote_prints_estimate_and_records_lead() {
        let repo = open_repository(&memory_settings()).await.unwrap();
        let recorder = LeadRecorder::new(repo.clone());
        let mut args = quote_args(ServiceType::Windows);
        args.quantity = 4;
        args.material = Some(Material::Upvc);
        let mut out = Vec::new();

        run_quote(&args, &instant(), &recorder, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("£2,600 + VAT @ 20%"));
        let stored = repo.list_requests(None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].estimated_price, Pounds::new(2600));
    }

    #[tokio::test]
    async fn quote_defaults_material_for_service() {
        let mut out = Vec::new();

        run_quote(
            &quote_args(ServiceType::Doors),
            &instant(),
            &NoopDispatcher,
            &mut out,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Doors & Security: 1 x Aluminium"));
        assert!(text.contains("£3,800"));
    }

    #[tokio::test]
    async fn quote_rejects_material_not_offered() {
        let mut args = quote_args(ServiceType::Windows);
        args.material = Some(Material::Composite);

        let err = run_quote(
            &args,
            &instant(),
            &NoopDispatcher,
            &mut Vec::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Composite is not available for Windows & Glazing");
    }

    #[tokio::test]
    async fn quote_rejects_empty_contact_field() {
        let mut args = quote_args(ServiceType::Windows);
        args.email = String::new();

        let err = run_quote(&args, &instant(), &NoopDispatcher, &mut Vec::new())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("missing contact details: email"));
    }

    #[tokio::test]
    async fn quote_accepts_whitespace_contact_field() {
        let mut args = quote_args(ServiceType::Windows);
        args.email = " ".to_string();
        let mut out = Vec::new();

        run_quote(&args, &instant(), &NoopDispatcher, &mut out)
            .await
            .unwrap();

        assert!(String::from_utf8(out).unwrap().contains("£1,200"));
    }

    #[tokio::test]
    async fn dispatch_failure_still_shows_estimate() {
        let mut out = Vec::new();

        run_quote(
            &quote_args(ServiceType::Windows),
            &instant(),
            &FailingDispatcher,
            &mut out,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("£1,200"));
        assert!(text.contains("not recorded"));
    }

    // =========================================================================
    // requests / prices
    // =========================================================================

    #[tokio::test]
    async fn requests_lists_and_filters() {
        let repo = open_repository(&memory_settings()).await.unwrap();
        let recorder = LeadRecorder::new(repo.clone());
        run_quote(&quote_args(ServiceType::Windows), &instant(), &recorder, &mut Vec::new())
            .await
            .unwrap();
        run_quote(&quote_args(ServiceType::Doors), &instant(), &recorder, &mut Vec::new())
            .await
            .unwrap();

        let mut all = Vec::new();
        run_requests(repo.as_ref(), None, &mut all).await.unwrap();
        let mut doors = Vec::new();
        run_requests(repo.as_ref(), Some(ServiceType::Doors), &mut doors)
            .await
            .unwrap();

        assert!(String::from_utf8(all).unwrap().ends_with("2 request(s)\n"));
        let doors = String::from_utf8(doors).unwrap();
        assert!(doors.contains("doors"));
        assert!(!doors.contains("windows"));
    }

    #[tokio::test]
    async fn requests_reports_empty_store() {
        let repo = open_repository(&memory_settings()).await.unwrap();
        let mut out = Vec::new();

        run_requests(repo.as_ref(), None, &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "No quote requests recorded.\n");
    }

    #[test]
    fn prices_end_with_vat_note() {
        let mut out = Vec::new();

        run_prices(&instant(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert!(text.ends_with("All prices exclude VAT @ 20%.\n"));
    }

    // =========================================================================
    // chat
    // =========================================================================

    #[test]
    fn missing_key_names_the_variables() {
        let err = chat_backend(None).err().unwrap().to_string();

        assert!(err.contains("GLAZING_GEMINI_API_KEY"));
        assert!(err.contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn chat_loop_replies_resets_and_quits() {
        let mut session = chat_session(EchoBackend {
            calls: Mutex::new(0),
        });
        let mut out = Vec::new();

        run_chat(
            &mut session,
            "hello\n\n/reset\nsash prices?\n/quit\nnever sent\n".as_bytes(),
            &mut out,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("assistant: echo: hello"));
        assert!(text.contains("assistant: echo: sash prices?"));
        assert!(!text.contains("never sent"));
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn unknown_material_lists_choices() {
        assert_eq!(
            parse_material("oak"),
            Err("unknown material 'oak' (one of Aluminium, uPVC, Composite)".to_string())
        );
    }

    #[test]
    fn banner_shows_company_contact() {
        let text = banner();

        assert!(text.starts_with("A406 Windows | Architectural Glazing Systems"));
        assert!(text.contains("020 8889 9982"));
    }
}
