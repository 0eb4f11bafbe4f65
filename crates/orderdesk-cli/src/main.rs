// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use orderdesk_app::DeskState;
use orderdesk_client::Client;
use runtime::HttpRuntime;
use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `orderdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    init_logging(&config, options.check_only)?;

    let base_url = options
        .base_url
        .clone()
        .unwrap_or_else(|| config.base_url());
    let client = Client::new(&base_url, config.timeout()?).with_context(|| {
        format!(
            "invalid [service] config in {}; fix base_url/timeout or pass --base-url",
            options.config_path.display()
        )
    })?;
    tracing::info!(
        base_url = client.base_url(),
        timeout_ms = whole_millis(client.timeout()),
        "order service client ready"
    );

    if options.check_only {
        return check_service(&client);
    }

    let mut state = DeskState::default();
    let mut runtime = HttpRuntime::new(client);
    orderdesk_tui::run_app(&mut state, &mut runtime)
}

fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn check_service(client: &Client) -> Result<()> {
    let health = client.health()?;
    if !health.healthy {
        let error = health.error.unwrap_or_else(|| "no detail given".to_owned());
        tracing::warn!(%error, "order service unhealthy");
        return Err(anyhow!(
            "order service at {} is unhealthy: {error}",
            client.base_url()
        ));
    }

    match health.order_amount {
        Some(amount) => println!("{}: healthy ({amount} orders)", client.base_url()),
        None => println!("{}: healthy", client.base_url()),
    }
    Ok(())
}

// The terminal owns stdout. Without a log file only `--check` logs.
fn init_logging(config: &Config, to_stderr: bool) -> Result<()> {
    let level = config.log_level().to_owned();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = config.log_file() {
        let file = open_log_file(&path)?;
        return fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_thread_names(true)
            .with_target(true)
            .with_writer(Mutex::new(file))
            .try_init()
            .map_err(|error| anyhow!("install log subscriber: {error}"));
    }

    if to_stderr {
        return fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| anyhow!("install log subscriber: {error}"));
    }

    Ok(())
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- fix [log].file or remove it",
                path.display()
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    base_url: Option<String>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        base_url: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--base-url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--base-url requires a URL"))?;
                options.base_url = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("orderdesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --base-url <url>         Order service URL (overrides config and env)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and check the service health");
    println!("  --help                   Show this help");
    println!();
    println!("keys: tab/shift+tab move, F2 create, F3 retrieve, F4 update, F5 delete,");
    println!("      F6 search, F7 ship, F8 clear, ctrl+q quit");
}
