// AwardBench CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: Local commands log to stderr so stdout stays clean for `render`.

mod client;
mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "awardbench")]
#[command(about = "AwardBench CLI - Generate and download the AwardBench paper")]
#[command(version)]
pub struct Cli {
    /// Paper API base URL
    #[arg(
        long,
        env = "AWARDBENCH_API_URL",
        default_value = "http://localhost:5000"
    )]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render, write, typeset and bundle the paper locally
    Generate {
        /// Benchmark record JSON (default: built-in sample)
        #[arg(long, short)]
        data: Option<PathBuf>,

        /// Directory for the generated files
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip pdflatex/bibtex
        #[arg(long)]
        no_compile: bool,

        /// Skip the zip bundle
        #[arg(long)]
        no_bundle: bool,
    },

    /// Print the LaTeX source to stdout
    Render {
        /// Benchmark record JSON (default: built-in sample)
        #[arg(long, short)]
        data: Option<PathBuf>,
    },

    /// Check that a benchmark record can be rendered
    Validate {
        /// Benchmark record JSON (default: built-in sample)
        #[arg(long, short)]
        data: Option<PathBuf>,
    },

    /// Show which artifacts the Paper API has published
    Status,

    /// Download an artifact from the Paper API
    Download {
        /// Artifact to fetch
        #[arg(value_enum)]
        format: commands::download::DownloadFormat,

        /// Destination file (default: the artifact's own name)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn init_tracing(quiet: bool) {
    let default_filter = if quiet {
        "warn"
    } else {
        "awardbench=info,awardbench_core=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let client = client::Client::new(&cli.api_url);
    let output_format = output::OutputFormat::from_str(&cli.output);

    match cli.command {
        Commands::Generate {
            data,
            output_dir,
            no_compile,
            no_bundle,
        } => {
            let args = commands::generate::GenerateArgs {
                data,
                output_dir,
                no_compile,
                no_bundle,
            };
            commands::generate::run(args, output_format, cli.quiet).await
        }
        Commands::Render { data } => commands::render::run(data.as_deref()),
        Commands::Validate { data } => {
            commands::validate::run(data.as_deref(), output_format, cli.quiet)
        }
        Commands::Status => commands::status::run(&client, output_format).await,
        Commands::Download { format, out } => {
            commands::download::run(&client, format, out, cli.quiet).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::try_parse_from([
            "awardbench",
            "generate",
            "--data",
            "results.json",
            "--output-dir",
            "out",
            "--no-compile",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                data,
                output_dir,
                no_compile,
                no_bundle,
            } => {
                assert_eq!(data, Some(PathBuf::from("results.json")));
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert!(no_compile);
                assert!(!no_bundle);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_download_format() {
        let cli = Cli::try_parse_from(["awardbench", "-o", "json", "download", "bundle"]).unwrap();

        assert_eq!(cli.output, "json");
        assert!(matches!(
            cli.command,
            Commands::Download {
                format: commands::download::DownloadFormat::Bundle,
                out: None
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["awardbench", "download", "docx"]).is_err());
    }
}
