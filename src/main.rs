//! paramgrid CLI - explore declarative parameter spaces

use clap::{Parser, Subcommand};
use colored::Colorize;

use paramgrid::{explore_path, ExploreError, FixSuggestion};

#[derive(Parser)]
#[command(name = "paramgrid")]
#[command(about = "paramgrid - declarative parameter-space explorer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a parameter file and print one JSON object per combination
    Run {
        /// Path to a .json or .yaml parameter file
        file: String,

        /// Stop after this many combinations
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Build the explorer without producing combinations (parse only)
    Validate {
        /// Path to a .json or .yaml parameter file
        file: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { file, limit } => run(&file, limit),
        Commands::Validate { file } => validate(&file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn run(file: &str, limit: Option<usize>) -> Result<(), ExploreError> {
    let explorer = explore_path(file)?;

    let mut produced = 0usize;
    let mut skipped = 0usize;
    for combination in explorer {
        if let Some(limit) = limit {
            if produced >= limit {
                break;
            }
        }
        match combination {
            Ok(value) => {
                println!("{value}");
                produced += 1;
            }
            // A failed combination aborts only itself; report and move on
            Err(e) => {
                eprintln!("{} {}", "skipped:".yellow(), e);
                skipped += 1;
            }
        }
    }

    eprintln!(
        "{} {} combination(s){}",
        "→".cyan(),
        produced.to_string().cyan().bold(),
        if skipped > 0 {
            format!(", {skipped} skipped")
        } else {
            String::new()
        }
    );
    Ok(())
}

fn validate(file: &str) -> Result<(), ExploreError> {
    explore_path(file)?;
    println!("{} {}", "✓".green().bold(), "parameter file is valid".green());
    Ok(())
}
