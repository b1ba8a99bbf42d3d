use reachscan::cli::{Cli, Command, ConfigCommand, RunArgs};
use reachscan::config::{resolve_config_path, AppConfig};
use reachscan::core::debug_logger::get_debug_logger;
use reachscan::core::probe::client::default_probe_client;
use reachscan::core::probe::strategy::{probe_path, standard_strategies, ProbeStrategy};
use reachscan::core::probe::url::display_probe_url;
use reachscan::core::probe::{CancellationToken, CheckStatus, ProbeChain};
use reachscan::core::run::{CheckSession, RunEvent, SessionOptions};
use reachscan::report::{ExportDocument, SummaryRenderer};
use reachscan::sources::loader::{default_list_fetcher, DomainListLoader};
use reachscan::sources::snapshot::{snapshot_info, Snapshot};
use reachscan::sources::PRESETS;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

/// Exit code when the list is empty after filtering
const EXIT_NOTHING_TO_CHECK: u8 = 2;
/// Exit code after Ctrl-C
const EXIT_CANCELLED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();
    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Command::Config(command)) => {
            config_command(config_path, command)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Presets) => {
            for preset in PRESETS {
                let category = preset.category.map(|c| c.as_str()).unwrap_or("-");
                println!("{:<16} {:<40} {}", preset.id, preset.label, category);
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Probe { domain, timeout_ms }) => {
            probe_command(config_path, &domain, timeout_ms).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Run(args)) => run_command(config_path, &args).await,
        None => run_command(config_path, &cli.run).await,
    }
}

fn config_command(
    config_path: Option<&Path>,
    command: ConfigCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ConfigCommand::Init => {
            let path = resolve_config_path(config_path)?;
            if AppConfig::init(&path)? {
                println!("Created config at {}", path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
        }
        ConfigCommand::Print => {
            let config = AppConfig::load(config_path)?;
            config.print()?;
        }
        ConfigCommand::Check => {
            let config = AppConfig::load(config_path)?;
            config.validate()?;
            println!("✓ Configuration valid");
        }
    }
    Ok(())
}

/// Walk every probe in order for one domain, stopping at the first success
async fn probe_command(
    config_path: Option<&Path>,
    domain: &str,
    timeout_ms: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path)?;
    let timeout = Duration::from_millis(timeout_ms.unwrap_or(config.timeout_ms));
    let token = CancellationToken::new();
    let domain = reachscan::sources::extract_domain(domain);

    for strategy in standard_strategies(default_probe_client()?) {
        let kind = strategy.kind();
        let outcome = strategy.attempt(&domain, timeout, &token).await;
        let latency = outcome
            .latency_ms
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<18} {:<50} {:<8} {}",
            kind.as_str(),
            display_probe_url(&domain, probe_path(kind)),
            outcome.status.as_str(),
            latency
        );
        if outcome.status == CheckStatus::Ok {
            break;
        }
    }
    Ok(())
}

async fn run_command(
    config_path: Option<&Path>,
    args: &RunArgs,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let logger = get_debug_logger();

    let mut config = AppConfig::load(config_path)?;
    args.apply_to(&mut config);
    config.validate()?;

    let snapshot = match config.snapshot() {
        Some(path) => match Snapshot::load(&path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                eprintln!("Warning: {}", e);
                logger.error_sync("main", "snapshot_load_failed", &e.to_string());
                None
            }
        },
        None => None,
    };

    let loader = DomainListLoader::new(default_list_fetcher()?)
        .with_fallback_list(config.fallback_list())
        .with_allowed_list(config.allowed_list());
    let chain = ProbeChain::standard(default_probe_client()?);
    let mut session = CheckSession::new(
        loader,
        chain,
        SessionOptions {
            selection: config.list_selection(),
            limit: config.domain_limit,
            settings: config.run_settings(),
            control_domains: config.control.clone(),
            control_timeout: config.control_timeout(),
            thresholds: config.diagnostics_thresholds(),
        },
    );

    let token = session.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let renderer = SummaryRenderer::new(!args.no_color);
    let quiet = args.quiet;
    let print_event = |event: &RunEvent| {
        if quiet {
            return;
        }
        if let RunEvent::Result(result) = event {
            println!("{}", renderer.render_result(result));
        }
    };

    let mut outcome = session.start_run(print_event).await;
    if outcome.nothing_to_check() {
        eprintln!("Nothing to check: the domain list is empty after filtering");
        return Ok(ExitCode::from(EXIT_NOTHING_TO_CHECK));
    }

    if args.retry_failed && !session.is_cancelled() {
        if !quiet {
            println!("Retrying {} failed domains", session.store().failed_entries().len());
        }
        outcome = session.retry_failed(print_event).await;
    }

    let stats = session.stats();
    println!();
    println!("{}", renderer.render_health(&outcome.diagnostics));
    println!(
        "{}",
        renderer.render_controls(&session.controls(), session.control_domains())
    );
    println!("{}", renderer.render_stats(&stats));
    print!("{}", renderer.render_categories(&session.category_stats()));

    let failed = renderer.render_failed(session.store().results(), snapshot.as_ref());
    if !failed.is_empty() {
        println!("Failed:");
        print!("{}", failed);
    }

    if let Some(path) = &args.export {
        let document = ExportDocument::new(
            stats,
            outcome.diagnostics.clone(),
            session.store().results().to_vec(),
            snapshot_info(snapshot.as_ref()),
        );
        document.write_to(path)?;
        println!("Exported to {}", path.display());
    }

    if session.is_cancelled() {
        eprintln!("Cancelled: {} domains left pending", session.stats().pending);
        return Ok(ExitCode::from(EXIT_CANCELLED));
    }

    Ok(ExitCode::SUCCESS)
}
