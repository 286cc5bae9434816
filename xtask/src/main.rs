//! etcd-join xtask - Build automation tasks
//!
//! ## Usage
//!
//! ```bash
//! # Build the etcd-join binary
//! cargo run -p xtask -- build
//!
//! # Run all tests
//! cargo run -p xtask -- test
//!
//! # Run lints
//! cargo run -p xtask -- lint
//!
//! # Run CI checks
//! cargo run -p xtask -- ci
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use xshell::{cmd, Shell};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for etcd-join")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the etcd-join binary
    Build {
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Run all tests
    Test {
        /// Run tests in release mode
        #[arg(long)]
        release: bool,
    },
    /// Run lints (clippy and rustfmt check)
    Lint,
    /// Format code
    Fmt {
        /// Check formatting without making changes
        #[arg(long)]
        check: bool,
    },
    /// Clean build artifacts
    Clean,
    /// Install the binary locally
    Install,
    /// Generate documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
    /// Run CI checks (lint, test, build)
    Ci,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    let project_root = project_root()?;
    sh.change_dir(&project_root);

    match cli.command {
        Commands::Build { release } => build(&sh, release)?,
        Commands::Test { release } => test(&sh, release)?,
        Commands::Lint => lint(&sh)?,
        Commands::Fmt { check } => fmt(&sh, check)?,
        Commands::Clean => clean(&sh)?,
        Commands::Install => install(&sh)?,
        Commands::Doc { open } => doc(&sh, open)?,
        Commands::Ci => ci(&sh)?,
    }

    Ok(())
}

fn project_root() -> Result<PathBuf> {
    let output = std::process::Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("Failed to run cargo locate-project")?;

    let path = String::from_utf8(output.stdout)?;
    let manifest = PathBuf::from(path.trim());

    manifest
        .parent()
        .map(|p| p.to_path_buf())
        .context("Failed to find project root")
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    println!("Building etcd-join...");

    if release {
        cmd!(sh, "cargo build --release --bin etcd-join").run()?;
    } else {
        cmd!(sh, "cargo build --bin etcd-join").run()?;
    }

    println!("Build complete");
    Ok(())
}

fn test(sh: &Shell, release: bool) -> Result<()> {
    println!("Running tests...");

    if release {
        cmd!(sh, "cargo test --release -p etcd-join").run()?;
    } else {
        cmd!(sh, "cargo test -p etcd-join").run()?;
    }

    println!("Tests passed");
    Ok(())
}

fn lint(sh: &Shell) -> Result<()> {
    println!("Running lints...");

    println!("  Checking formatting...");
    cmd!(sh, "cargo fmt --all -- --check").run()?;

    println!("  Running clippy...");
    cmd!(sh, "cargo clippy --all-targets --all-features -- -D warnings").run()?;

    println!("Lints passed");
    Ok(())
}

fn fmt(sh: &Shell, check: bool) -> Result<()> {
    if check {
        cmd!(sh, "cargo fmt --all -- --check").run()?;
    } else {
        cmd!(sh, "cargo fmt --all").run()?;
    }
    Ok(())
}

fn clean(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo clean").run()?;
    Ok(())
}

fn install(sh: &Shell) -> Result<()> {
    println!("Installing etcd-join locally...");

    cmd!(sh, "cargo install --path .").run()?;

    println!("Installed: etcd-join");
    Ok(())
}

fn doc(sh: &Shell, open: bool) -> Result<()> {
    if open {
        cmd!(sh, "cargo doc --no-deps --open").run()?;
    } else {
        cmd!(sh, "cargo doc --no-deps").run()?;
    }
    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    println!("Running CI checks...");

    println!("\nStep 1/3: Lint");
    lint(sh)?;

    println!("\nStep 2/3: Tests");
    test(sh, false)?;

    println!("\nStep 3/3: Release build");
    build(sh, true)?;

    println!("\nAll CI checks passed");
    Ok(())
}
