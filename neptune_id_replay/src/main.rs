mod replay;
mod script;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use neptune_id_pool::IdPool;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Replays a script of id pool operations and prints what the pool did.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of ids in the pool
    #[arg(short, long)]
    size: u32,

    /// Verify the free range list after every command
    #[arg(long)]
    check_each: bool,

    /// Script to replay, `-` reads from stdin
    script: PathBuf,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    if args.size == 0 {
        bail!("Pool size must be at least 1");
    }

    let source = if args.script.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read script from stdin")?;
        source
    } else {
        std::fs::read_to_string(&args.script)
            .with_context(|| format!("Failed to read script {}", args.script.display()))?
    };

    let commands = script::parse_script(&source)?;
    info!(
        "Replaying {} commands against a pool of {} ids",
        commands.len(),
        args.size
    );

    let mut pool = IdPool::new(args.size);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    replay::run(&mut pool, &commands, args.check_each, &mut out)?;
    writeln!(out, "used {} / {}", pool.used_count(), pool.capacity())?;

    Ok(())
}
