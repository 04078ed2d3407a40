use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use sini_core::{Code, Diagnostic, FileSystemProvider, Trace, GLOBAL_SCOPE};

/// Super INI compiler: compiles super-ini sources to plain INI.
#[derive(Parser)]
#[command(name = "sini", version, about = "Compiles super ini sources to plain INI")]
struct Cli {
    /// Path to the super-ini source file
    input: PathBuf,

    /// Path for the compiled INI; overrides the environment's `output`
    output: Option<PathBuf>,

    /// Write the compiled INI to standard output instead of a file
    #[arg(long, short = 'd')]
    dump: bool,

    /// Suppress non-essential output
    #[arg(long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let out = match sini_core::compile(&cli.input, &FileSystemProvider) {
        Ok(out) => out,
        Err(failure) => {
            for diag in &failure.diagnostics {
                eprintln!("{}", diag);
            }
            process::exit(1);
        }
    };

    for warning in &out.warnings {
        eprintln!("{}", warning);
    }

    if cli.dump {
        print!("{}", out.ini);
        return;
    }

    if !cli.quiet {
        println!(
            "parsed {} scopes ({} internal), {} items",
            out.stats.scopes, out.stats.internal_scopes, out.stats.items
        );
        println!(
            "compiled {} scopes, {} items",
            out.stats.emitted_scopes(),
            out.stats.emitted_items()
        );
    }

    let output_path = cli
        .output
        .clone()
        .or_else(|| out.environment.output.as_ref().map(PathBuf::from));
    let output_path = match output_path {
        Some(p) => p,
        None => {
            report_output_error(&cli.input, "");
            process::exit(1);
        }
    };

    if let Err(e) = std::fs::write(&output_path, &out.ini) {
        report_output_error(&cli.input, &format!("{}: {}", output_path.display(), e));
        process::exit(1);
    }

    if !cli.quiet {
        println!("written to {}", output_path.display());
    }
}

fn report_output_error(input: &Path, extra: &str) {
    let trace = Trace::new(input.display().to_string(), 0, GLOBAL_SCOPE);
    eprintln!("{}", Diagnostic::new(Code::E09, &trace, extra));
}
