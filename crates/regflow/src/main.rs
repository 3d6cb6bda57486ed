// # regflow - Domain Onboarding CLI
//
// This binary is a THIN integration layer. All workflow logic lives in
// `regflow-core`; vendor wire formats live in the client crates.
//
// The regflow binary is responsible for:
// 1. Loading `.env` and reading configuration from environment variables
// 2. Validating the domain argument
// 3. Initializing logging and the runtime
// 4. Wiring the registrar, DNS provider and terminal prompt together
// 5. Printing the status report or setup summary and choosing the exit code
//
// ## Configuration
//
// ### Registrar (required)
// - `NAMECHEAP_API_USER`, `NAMECHEAP_API_KEY`, `NAMECHEAP_USERNAME`
// - `NAMECHEAP_CLIENT_IP`: Whitelisted IP of this machine
// - `NAMECHEAP_SANDBOX`: `true` to use the sandbox endpoint
//
// ### DNS Provider (required)
// - `CLOUDFLARE_API_TOKEN`: Token with Zone:Edit and DNS:Edit permissions
//
// ### Workflow
// - `REGFLOW_WORKER_SUBDOMAIN`: Worker placeholder label (default: app)
// - `REGFLOW_PLACEHOLDER_IP`: Placeholder address (default: 192.0.2.1)
// - `REGFLOW_RECORD_TTL`: TTL of created records (default: 300)
// - `REGFLOW_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// regflow example.com --status
// regflow example.com --setup --dry-run
// regflow example.com --setup --force-registration
// ```

mod domain;
mod prompt;

use anyhow::Result;
use clap::Parser;
use regflow_core::{DomainStatus, RegflowConfig, SetupOptions, SetupOrchestrator, SetupResult};
use regflow_provider_cloudflare::CloudflareProvider;
use regflow_registrar_namecheap::NamecheapRegistrar;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::prompt::TerminalPrompt;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegflowExitCode {
    /// Status printed, or setup finished
    Success = 0,
    /// Configuration, validation or workflow failure
    Failure = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<RegflowExitCode> for ExitCode {
    fn from(code: RegflowExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Register a domain at Namecheap and onboard it to Cloudflare
#[derive(Debug, Parser)]
#[command(name = "regflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Domain to inspect or set up (e.g. example.com)
    domain: String,

    /// Show current status of the domain
    #[arg(long, conflicts_with = "setup")]
    status: bool,

    /// Set up the domain (idempotent, the default action)
    #[arg(long)]
    setup: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    dry_run: bool,

    /// Allow domain registration (costs money!)
    #[arg(long)]
    force_registration: bool,

    /// Skip worker subdomain setup
    #[arg(long)]
    no_workers: bool,

    /// Print the status or setup result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Failed to load .env file: {}", e);
        return RegflowExitCode::Failure.into();
    }

    let config = match RegflowConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Please check your environment or .env file.");
            return RegflowExitCode::Failure.into();
        }
    };

    let domain = match domain::parse_domain(&cli.domain) {
        Ok(domain) => domain,
        Err(e) => {
            eprintln!("Invalid domain: {}", e);
            return RegflowExitCode::Failure.into();
        }
    };

    // Logs go to stderr so stdout carries only the report
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RegflowExitCode::Failure.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RegflowExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run(&cli, &config, &domain).await {
            Ok(code) => code,
            Err(e) => {
                let code = exit_code_for_error(&e);
                if code == RegflowExitCode::Failure {
                    eprintln!("Configuration error: {}", e);
                } else {
                    error!("regflow error: {}", e);
                }
                code
            }
        }
    });

    result.into()
}

/// Run the requested action
async fn run(cli: &Cli, config: &RegflowConfig, domain: &str) -> Result<RegflowExitCode> {
    let registrar = Arc::new(NamecheapRegistrar::new(&config.registrar)?);
    let dns = Arc::new(CloudflareProvider::new(&config.dns)?);

    if config.registrar.sandbox {
        warn!("Using the Namecheap sandbox endpoint");
    }

    let orchestrator = SetupOrchestrator::new(
        registrar,
        dns,
        Arc::new(TerminalPrompt),
        &config.setup,
    );

    if cli.status {
        let status = orchestrator.reconciler().get_status(domain).await;
        print_status(&status, cli.json)?;
        return Ok(RegflowExitCode::Success);
    }

    if cli.dry_run {
        println!("Running in DRY RUN mode - no actual changes will be made");
    }
    if cli.force_registration {
        println!("FORCE REGISTRATION enabled - will register domain if needed");
    }

    let options = SetupOptions::new()
        .with_dry_run(cli.dry_run)
        .with_force_registration(cli.force_registration)
        .with_workers(!cli.no_workers);

    info!("Starting setup of {}", domain);
    let result = orchestrator.setup(domain, &options).await;
    print_setup(&result, cli.json)?;

    Ok(exit_code_for(&result))
}

/// Exit code for an error that aborted the run before a result existed
fn exit_code_for_error(err: &anyhow::Error) -> RegflowExitCode {
    match err.downcast_ref::<regflow_core::Error>() {
        Some(e) if e.is_config() => RegflowExitCode::Failure,
        _ => RegflowExitCode::RuntimeError,
    }
}

fn exit_code_for(result: &SetupResult) -> RegflowExitCode {
    if result.is_success() || result.is_dry_run_stop() {
        RegflowExitCode::Success
    } else {
        RegflowExitCode::Failure
    }
}

fn print_status(status: &DomainStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(status)?);
    } else {
        println!("\n{}", status);
    }
    Ok(())
}

fn print_setup(result: &SetupResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("\nSteps completed: {}", result.step_names().join(", "));

    if result.is_success() {
        println!("\nSuccess! Domain {} is ready for use.", result.domain);
        if let Some(ref zone_id) = result.zone_id {
            println!("  Zone ID: {}", zone_id);
        }
        if let Some(ref nameservers) = result.nameservers {
            println!("  Nameservers: {}", nameservers.join(", "));
        }
        if let Some(ref record) = result.worker_record {
            println!("  Worker subdomain: {} -> {}", record.name, record.content);
        }
    } else if result.is_dry_run_stop() {
        println!(
            "\nDry run complete for {}: no DNS zone exists yet, later steps depend on it.",
            result.domain
        );
    } else {
        println!("\nErrors occurred:");
        for error in &result.errors {
            println!("  - {}", error);
        }
    }
    Ok(())
}
