// Prevents additional console window on Windows in release
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

use clap::Parser;
use std::path::PathBuf;

/// Sesame - desktop shell for the Sesame voice demo
#[derive(Parser, Debug)]
#[command(name = "sesame-shell")]
#[command(about = "Desktop shell for the Sesame voice demo", long_about = None)]
struct Args {
    /// Config file to use instead of the per-user default
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Page to open instead of the configured primary URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,
}

fn main() {
    let args = Args::parse();

    sesame_shell_lib::run(sesame_shell_lib::RunOptions {
        config_path: args.config,
        primary_url: args.url,
    });
}
