//! # e-buildconsole
//!
//! Runs a build command, echoes its output and collects the errors and
//! warnings it prints, following `make`'s directory announcements.
//!
//! ## Quick Start
//! ```sh
//! e-buildconsole --summary -- make -C src
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use e_buildconsole::e_config::{add_pattern_lines, load_pattern_file};
use e_buildconsole::e_process::{spawn_command, Received};
use e_buildconsole::e_sink::TerminalSink;
use e_buildconsole::{Cli, ConsoleConfig, DiagnosticTree, RunController};
use std::env;
use std::process::exit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if cli.no_parse {
        config.parse_output = false;
    }
    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let mut catalog = config.build_catalog();
    add_pattern_lines(&mut catalog, cli.patterns.iter().map(String::as_str));
    for file in &cli.pattern_files {
        let added = load_pattern_file(&mut catalog, file)?;
        log::debug!("{} pattern(s) from {}", added, file.display());
    }
    if cli.list_patterns {
        for pattern in catalog.iter().chain(catalog.project_fallbacks().iter()) {
            println!("{}", pattern.to_line());
        }
        return Ok(());
    }

    let Some((program, args)) = cli.command.split_first() else {
        bail!("no build command given, pass it after `--`");
    };
    let cwd = match &cli.cwd {
        Some(dir) => dir.clone(),
        None => env::current_dir()?,
    };
    let working_directory = cwd.to_string_lossy().into_owned();
    let uses_color = cfg!(feature = "color") && !cli.no_color;

    let aborted = Arc::new(AtomicBool::new(false));
    {
        let aborted = Arc::clone(&aborted);
        if let Err(e) = ctrlc::set_handler(move || aborted.store(true, Ordering::SeqCst)) {
            log::warn!("failed to register Ctrl+C handler: {}", e);
        }
    }

    let mut controller = RunController::new(catalog, config.run_options(), TerminalSink);
    controller.start_run();
    let mut running = spawn_command(program, args, &cwd)?;

    loop {
        if aborted.swap(false, Ordering::SeqCst) {
            eprintln!("Aborting pid {}", running.pid());
            if let Err(e) = running.kill() {
                log::warn!("failed to kill build command: {}", e);
            }
        }
        match running.recv_timeout(Duration::from_millis(100)) {
            Received::Line(line) => {
                controller.on_line(&working_directory, &line.text, config.parse_output);
                if !cli.quiet {
                    if let Some(row) = controller.message_log().last() {
                        println!("{}", row.render(uses_color));
                    }
                }
            }
            Received::Idle => {}
            Received::Closed => break,
        }
    }

    let code = running.wait()?;
    controller.on_exit(code);
    if !cli.quiet {
        if let Some(row) = controller.message_log().last() {
            println!("{}", row.render(uses_color));
        }
    }

    if cli.json {
        let report = serde_json::json!({
            "exit_code": code,
            "errors": controller.errors().nested(),
            "warnings": controller.warnings().nested(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if cli.summary {
        print_tree(controller.errors());
        print_tree(controller.warnings());
    }

    exit(code);
}

fn print_tree(tree: &DiagnosticTree) {
    println!("{} ({})", tree.kind(), tree.count());
    for (node, record) in tree.iter_depth_first() {
        let indent = if tree.parent(node).is_some() { "    " } else { "  " };
        println!("{}{}", indent, record.summary());
    }
}
