use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ghtoken::github::{GithubApi, GithubClient};
use ghtoken::resolve::{Capabilities, Resolver, ResolverConfig};
use ghtoken::util::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "ghtoken", version, about = "Find or create a usable GitHub token")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Token to use instead of searching (defaults to GITHUB_TOKEN or GH_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// GitHub API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Only accept credentials belonging to this login
    #[arg(short, long)]
    login: Option<String>,

    /// Search local files, git config and the keychain for tokens
    #[arg(long)]
    auto_token: bool,

    /// Trade stored usernames and passwords for a temporary token
    #[arg(long)]
    auto_password: bool,

    /// Never prompt for a username and password
    #[arg(long)]
    no_manual_login: bool,

    /// Accept tokens without asking GitHub who they belong to
    #[arg(long)]
    no_check_token: bool,

    /// Report raw errors instead of summaries
    #[arg(long)]
    explode: bool,

    /// Print resolution steps to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging to file
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show which account the resolved token belongs to
    Whoami,
    /// Run a command with GITHUB_TOKEN set to the resolved token
    Exec {
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let app_config = AppConfig::load(cli.config.as_deref())?;

    // Setup logging
    let _guard = setup_logging(&app_config, cli.debug)?;

    info!("ghtoken starting");

    let config = resolver_config(&cli, &app_config);
    let client = GithubClient::new(&config.api_url)?;
    let mut resolver = Resolver::new(config, client.clone(), capabilities(cli.verbose));

    match cli.command.unwrap_or(Command::Whoami) {
        Command::Whoami => {
            let outcome = resolver
                .with_token(async |candidate| {
                    let identity = client.current_user(candidate.token.as_str()).await;
                    (identity, candidate.source)
                })
                .await?;
            let Some((identity, source)) = outcome else {
                bail!("Could not resolve a GitHub token");
            };

            let identity = identity.context("Failed to look up token owner")?;
            println!("{} (via {})", identity.login, source);
            Ok(())
        }
        Command::Exec { command } => {
            let status = resolver
                .with_token(async |candidate| {
                    tokio::process::Command::new(&command[0])
                        .args(&command[1..])
                        .env("GITHUB_TOKEN", candidate.token.as_str())
                        .status()
                        .await
                })
                .await?;
            let Some(status) = status else {
                bail!("Could not resolve a GitHub token");
            };
            let status = status.with_context(|| format!("Failed to run {}", command[0]))?;
            std::process::exit(status.code().unwrap_or(1));
        }
    }
}

fn resolver_config(cli: &Cli, app_config: &AppConfig) -> ResolverConfig {
    let mut config = app_config.resolver_config();

    config.github_token = cli
        .token
        .clone()
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .or_else(|| std::env::var("GH_TOKEN").ok())
        .filter(|token| !token.is_empty());
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(login) = &cli.login {
        config.github_login = Some(login.clone());
    }
    config.auto_token |= cli.auto_token;
    config.auto_password |= cli.auto_password;
    config.manual_login &= !cli.no_manual_login;
    config.check_token &= !cli.no_check_token;
    config.explode |= cli.explode;
    config
}

fn capabilities(verbose: bool) -> Capabilities {
    let caps = Capabilities::system()
        .login_header(|| {
            eprintln!("We need your GitHub login to create a temporary token.");
            eprintln!("Your password will not be stored; the token is revoked on exit.");
        })
        .ask_login(|| Ok(Input::<String>::new().with_prompt("Username").interact_text()?))
        .ask_password(|user| {
            Ok(Password::new()
                .with_prompt(format!("Password for {user}"))
                .interact()?)
        })
        .ask_otp(|user| {
            Ok(Input::<String>::new()
                .with_prompt(format!("Two-factor authentication code for {user}"))
                .interact_text()?)
        });

    if verbose {
        caps.debug_sink(|line| eprintln!("{line}"))
    } else {
        caps
    }
}

fn setup_logging(
    config: &AppConfig,
    debug: bool,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    if !debug {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ghtoken=warn")),
            )
            .init();
        return Ok(None);
    }

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "ghtoken.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter("ghtoken=debug")
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}
