//! NYHER screening package validator CLI.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use clap::{ColorChoice, Parser};
use nyher_cli::logging::{LogConfig, LogFormat, init_logging};
use nyher_cli::run::{Invocation, execute, write_report};
use nyher_cli::summary::print_summary;
use nyher_rules::RuleConfig;
use nyher_validate::Validator;
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, LogFormatArg, LogLevelArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let config = match RuleConfig::load_or_embedded(cli.rules.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };
    let validator = Validator::new(Arc::new(config)).include_original_data(!cli.no_original_data);

    let invocation = Invocation {
        spec_path: cli.spec_path,
        args: cli.args,
        profile: cli.profile,
        data_dir: cli.data_dir,
    };
    let outcome = execute(&invocation, &validator);
    if cli.summary {
        print_summary(&outcome.report);
    }
    if let Err(error) = write_report(&outcome.report, outcome.output.as_deref()) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
    std::process::exit(outcome.exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
