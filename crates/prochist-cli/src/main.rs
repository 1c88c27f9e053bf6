// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use prochist_rest::{Client, FileSaver};
use runtime::{DemoRuntime, RestRuntime};
use std::env;
use std::path::PathBuf;

const DEMO_SEED: u64 = 2026;
const DEMO_INSTANCE_COUNT: usize = 40;

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
            "load config {}; run `prochist --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    if options.demo {
        let mut runtime = DemoRuntime::seeded(DEMO_SEED, DEMO_INSTANCE_COUNT);
        if options.check_only {
            return Ok(());
        }
        return prochist_tui::run_app(&mut runtime);
    }

    let timeout = config.timeout()?;
    let client = Client::new(config.base_url(), timeout).with_context(|| {
        format!(
            "invalid [engine] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    let saver = FileSaver::new(config.download_dir()?, timeout)?;
    if options.check_only {
        return Ok(());
    }

    let mut runtime = RestRuntime::new(client, saver);
    prochist_tui::run_app(&mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
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
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("prochist");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with seeded demo instances (no network)");
    println!("  --check                  Validate config + client construction");
    println!("  --help                   Show this help");
}
