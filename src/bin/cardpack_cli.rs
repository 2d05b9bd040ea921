//! CardPack CLI - Card Game Bundle Compiler
//!
//! Commands: render, pack, build
//! Outputs JSON to stdout
//! Returns non-zero on failure (2 for validation failures)

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use cardpack_core::{BuildError, BuildPipeline, BuildReport};

#[derive(Parser)]
#[command(name = "cardpack-cli")]
#[command(about = "CardPack CLI - Card Game Bundle Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Build root containing template.json, images/, rules.md and fonts/
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render rules.md into per-page SVG assets
    Render,

    /// Package template.json and images/ into output.pcio
    Pack,

    /// Render rules pages, then package the bundle
    Build {
        /// Skip the rules rendering step
        #[arg(long)]
        no_rules: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let pipeline = BuildPipeline::new(&cli.root);

    match cli.command {
        Commands::Render => match pipeline.render_rules() {
            Ok(pages) => {
                let output = serde_json::json!({
                    "success": true,
                    "pages": pages,
                });
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
                ExitCode::SUCCESS
            }
            Err(e) => fail(e),
        },

        Commands::Pack => report(pipeline.pack()),

        Commands::Build { no_rules } => report(pipeline.build(!no_rules)),
    }
}

fn report(result: Result<BuildReport, BuildError>) -> ExitCode {
    match result {
        Ok(report) => {
            let output = serde_json::json!({
                "success": true,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn fail(error: BuildError) -> ExitCode {
    let output = serde_json::json!({
        "success": false,
        "error": error.to_string(),
    });
    println!("{}", serde_json::to_string(&output).unwrap());
    match error {
        BuildError::ValidationFailed(_) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
