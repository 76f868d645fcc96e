use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
use tracing_subscriber::prelude::*;

use abstape::hexdump::octal_dump;
use abstape::translator::Translator;

/// Translates an octal transcription of a PDP-11 program into an absolute
/// loader image.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input transcription file
    input: PathBuf,

    /// File name to write the image to
    #[arg(long, short, default_value = "a.abs")]
    output: PathBuf,

    /// Predefine a symbol for #ifdef evaluation (repeatable)
    #[arg(long = "def", value_name = "SYMBOL")]
    defines: Vec<String>,

    /// Echo each input line with its pc and report every emitted block
    #[arg(long)]
    list: bool,

    /// Print an octal word dump of the produced image
    #[arg(long)]
    dump: bool,

    /// Enable chrome tracing
    #[arg(long)]
    trace: bool,
}

pub fn trace() -> FlushGuard {
    let (chrome_layer, guard) = ChromeLayerBuilder::new().build();
    tracing_subscriber::registry().with(chrome_layer).init();

    guard
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _trace_guard = if args.trace { Some(trace()) } else { None };

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let mut translator = Translator::new();
    for symbol in &args.defines {
        translator.define(symbol);
    }
    if args.list {
        translator = translator.with_listing();
    }

    let translation = translator.translate(&source)?;

    if args.list {
        for entry in &translation.listing {
            println!("{entry}");
        }
    }
    for diagnostic in &translation.diagnostics {
        println!("{diagnostic}");
    }
    if args.list {
        for block in &translation.blocks {
            println!("{block}");
        }
    }
    if args.list || translation.errors > 0 {
        println!(
            "{} error{}",
            translation.errors,
            if translation.errors == 1 { "" } else { "s" }
        );
    }

    if translation.errors > 0 {
        // A failed regeneration must not leave a stale image behind.
        if args.output.exists() {
            fs::remove_file(&args.output)
                .with_context(|| format!("removing {}", args.output.display()))?;
        }
        bail!("no image written");
    }

    fs::write(&args.output, &translation.image)
        .with_context(|| format!("writing {}", args.output.display()))?;

    if args.dump {
        println!("{}", octal_dump(&translation.image, 8));
    }

    Ok(())
}
