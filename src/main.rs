// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Operator CLI: estimate or execute one USDC transfer with a local key.
//!
//! ```text
//! arc-bridge --estimate --from Ethereum_Sepolia --to Arc_Testnet --amount 2.5
//! arc-bridge --execute --speed SLOW
//! ```
//!
//! Results go to stdout as JSON; logs and the progress timeline go to stderr.

use std::process::ExitCode;
use std::sync::Arc;

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::ProviderBuilder;
use alloy_signer_local::PrivateKeySigner;
use arc_bridge::{
    drive, view, AppConfig, BridgeError, CctpEngine, Chain, IrisClient, Outcome,
    ProgressTracker, Result, TokioClock, TransferEngine, TransferRequest, TransferSpeed,
    TransferTimeline, TICK_PERIOD,
};
use clap::{CommandFactory, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

#[derive(Parser, Debug)]
#[command(name = "arc-bridge", version, about = "Bridge USDC between Ethereum Sepolia and Arc Testnet")]
struct Cli {
    /// Quote gas and protocol fees without sending anything
    #[arg(long, conflicts_with = "execute")]
    estimate: bool,

    /// Run approve, burn, attestation and mint
    #[arg(long)]
    execute: bool,

    #[arg(long, env = "FROM_CHAIN", default_value = "Arc_Testnet")]
    from: Chain,

    #[arg(long, env = "TO_CHAIN", default_value = "Ethereum_Sepolia")]
    to: Chain,

    /// Decimal USDC amount
    #[arg(long, env = "AMOUNT", default_value = "1.00")]
    amount: String,

    /// Destination address; defaults to the signing account
    #[arg(long, env = "RECIPIENT")]
    recipient: Option<String>,

    /// FAST or SLOW
    #[arg(long, env = "TRANSFER_SPEED", default_value = "FAST")]
    speed: TransferSpeed,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Estimate,
    Execute,
}

impl Cli {
    /// `None` when neither `--estimate` nor `--execute` was given.
    fn mode(&self) -> Option<Mode> {
        match (self.estimate, self.execute) {
            (true, _) => Some(Mode::Estimate),
            (_, true) => Some(Mode::Execute),
            _ => None,
        }
    }
}

/// The signing key, which must be present and non-blank.
fn private_key_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    lookup(PRIVATE_KEY_ENV)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| BridgeError::validation(format!("{PRIVATE_KEY_ENV} is missing. Set it in .env.")))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let private_key = match private_key_from(|key| std::env::var(key).ok()) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let Some(mode) = cli.mode() else {
        if let Err(e) = Cli::command().print_help() {
            error!(error = %e, event = "help_print_failed");
        }
        return ExitCode::SUCCESS;
    };

    match run(cli, mode, &private_key).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, event = "cli_failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "arc_bridge=debug"
    } else {
        "arc_bridge=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, mode: Mode, private_key: &str) -> Result<ExitCode> {
    let signer: PrivateKeySigner = private_key
        .trim()
        .parse()
        .map_err(|_| BridgeError::InvalidConfig(format!("{PRIVATE_KEY_ENV} is not a valid private key")))?;
    let account = signer.address();
    let wallet = EthereumWallet::from(signer);

    let config = AppConfig::from_env()?;
    let sepolia = ProviderBuilder::new()
        .wallet(wallet.clone())
        .connect_http(config.rpc_url(Chain::EthereumSepolia).clone());
    let arc = ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(config.rpc_url(Chain::ArcTestnet).clone());

    let engine = CctpEngine::builder()
        .sepolia_provider(sepolia)
        .arc_provider(arc)
        .account(account)
        .iris(IrisClient::new(config.iris_api.clone(), Arc::new(TokioClock::new())))
        .build();

    let recipient = cli
        .recipient
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            raw.parse::<Address>()
                .map_err(|_| BridgeError::validation(format!("Invalid recipient: {raw}")))
        })
        .transpose()?;

    let request = TransferRequest::builder()
        .from(cli.from)
        .to(cli.to)
        .amount(cli.amount)
        .maybe_recipient(recipient)
        .speed(cli.speed)
        .build();

    info!(
        from = %request.from,
        to = %request.to,
        amount = %request.amount,
        speed = %request.speed,
        account = %account,
        event = "cli_request"
    );

    match mode {
        Mode::Estimate => {
            let estimate = engine.estimate(&request).await?;
            println!("{}", serde_json::to_string_pretty(&estimate)?);
            Ok(ExitCode::SUCCESS)
        }
        Mode::Execute => execute(&engine, &request).await,
    }
}

async fn execute<E: TransferEngine>(engine: &E, request: &TransferRequest) -> Result<ExitCode> {
    let mut tracker = ProgressTracker::new(TokioClock::new());
    tracker.start();

    let mut shown: Option<TransferTimeline> = None;
    let result = drive(&mut tracker, TICK_PERIOD, engine.bridge(request), |timeline| {
        if shown.as_ref() != Some(timeline) {
            eprint!("{}", view::render_progress(timeline));
            shown = Some(timeline.clone());
        }
    })
    .await;

    let outcome = Outcome::classify(&result);
    tracker.force_terminal(outcome.terminal_signal());
    tracker.stop();
    if let Some(timeline) = tracker.timeline() {
        eprint!("{}", view::render_progress(timeline));
    }

    match &result {
        Ok(bridge) => println!("{}", serde_json::to_string_pretty(bridge)?),
        Err(e) => eprintln!("Error: {e}"),
    }
    eprint!("{}", view::render_notification(&outcome.notification(request.from)));

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use std::sync::Mutex;

    const CLI_ENV: [&str; 5] = ["FROM_CHAIN", "TO_CHAIN", "AMOUNT", "RECIPIENT", "TRANSFER_SPEED"];

    // clap reads the process environment, which all tests in this binary share
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("arc-bridge").chain(args.iter().copied()))
    }

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for key in CLI_ENV {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let out = f();
        for (key, _) in vars {
            std::env::remove_var(key);
        }
        out
    }

    #[test]
    fn test_defaults() {
        let cli = with_env(&[], || parse(&[])).unwrap();
        assert_eq!(cli.from, Chain::ArcTestnet);
        assert_eq!(cli.to, Chain::EthereumSepolia);
        assert_eq!(cli.amount, "1.00");
        assert_eq!(cli.recipient, None);
        assert_eq!(cli.speed, TransferSpeed::Fast);
        assert!(!cli.verbose);
        assert_eq!(cli.mode(), None);
    }

    #[test]
    fn test_env_fallbacks() {
        let recipient = "0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d";
        let cli = with_env(
            &[
                ("FROM_CHAIN", "Ethereum_Sepolia"),
                ("TO_CHAIN", "Arc_Testnet"),
                ("AMOUNT", "2.5"),
                ("RECIPIENT", recipient),
                ("TRANSFER_SPEED", "SLOW"),
            ],
            || parse(&["--estimate"]),
        )
        .unwrap();

        assert_eq!(cli.from, Chain::EthereumSepolia);
        assert_eq!(cli.to, Chain::ArcTestnet);
        assert_eq!(cli.amount, "2.5");
        assert_eq!(cli.recipient.as_deref(), Some(recipient));
        assert_eq!(cli.speed, TransferSpeed::Slow);
        assert_eq!(cli.mode(), Some(Mode::Estimate));
    }

    #[test]
    fn test_flags_override_env() {
        let cli = with_env(&[("AMOUNT", "2.5")], || {
            parse(&["--execute", "--amount", "7", "--speed", "slow", "-v"])
        })
        .unwrap();
        assert_eq!(cli.amount, "7");
        assert_eq!(cli.speed, TransferSpeed::Slow);
        assert!(cli.verbose);
        assert_eq!(cli.mode(), Some(Mode::Execute));
    }

    #[test]
    fn test_estimate_conflicts_with_execute() {
        let err = with_env(&[], || parse(&["--estimate", "--execute"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_unknown_chain_is_rejected() {
        let err = with_env(&[], || parse(&["--from", "Solana_Devnet"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_private_key_must_be_present() {
        let err = private_key_from(|_| None).unwrap_err();
        assert_eq!(err.to_string(), "PRIVATE_KEY is missing. Set it in .env.");
        assert!(private_key_from(|_| Some("   ".to_string())).is_err());

        let key = private_key_from(|name| (name == PRIVATE_KEY_ENV).then(|| "0xabc".to_string()));
        assert_eq!(key.unwrap(), "0xabc");
    }
}
