use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::{build_preprocessor, input, parse_probabilities, report};
use labdoc_core::blender;
use labdoc_core::classifier::{self, ClassificationInput};
use labdoc_core::config::{self, AppConfig};
use labdoc_core::PreprocessOptions;
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Categories { json } => {
            if json {
                print_json(&labdoc_core::models::Category::ALL)
            } else {
                println!("{}", report::categories());
                Ok(())
            }
        }
        Commands::Extract { input, json } => {
            let (pre, text) = load(&cfg, &input)?;
            let extracted = pre.extract(&text);
            output(json, &extracted, || report::extraction(&extracted))
        }
        Commands::Validate { input, json } => {
            let (pre, text) = load(&cfg, &input)?;
            let outcome = pre.validate(&pre.extract(&text));
            output(json, &outcome, || report::validation(&outcome))?;
            if outcome.has_errors() {
                std::process::exit(2);
            }
            Ok(())
        }
        Commands::Features { input, json } => {
            let (pre, text) = load(&cfg, &input)?;
            let vector = pre.features(&pre.extract(&text));
            output(json, &vector, || report::features(&vector))
        }
        Commands::Normalize { input } => {
            let (pre, text) = load(&cfg, &input)?;
            println!("{}", pre.substitute(&text, &pre.extract(&text)));
            Ok(())
        }
        Commands::Score { input, json } => {
            let (pre, text) = load(&cfg, &input)?;
            let scores = pre.score(&pre.extract(&text));
            output(json, &scores, || report::scores(&scores))
        }
        Commands::Preprocess { input } => {
            let (pre, text) = load(&cfg, &input)?;
            let result = pre.preprocess(&text, PreprocessOptions::from(&cfg.preprocess));
            print_json(&result)
        }
        Commands::Blend { input, probs, json } => {
            let (pre, text) = load(&cfg, &input)?;
            let model = parse_probabilities(&probs)?;
            let prediction = blender::blend(&model, &pre.score(&pre.extract(&text)));
            output(json, &prediction, || report::prediction(&prediction))
        }
        Commands::Classify {
            input,
            provider,
            json,
        } => {
            let (pre, text) = load(&cfg, &input)?;
            let registry = classifier::build_registry(&cfg);
            let result = classifier::classify(
                ClassificationInput { text, provider },
                &pre,
                &registry,
                &cfg,
            )
            .await?;
            output(json, &result, || report::classification(&result))
        }
    }
}

#[derive(Parser)]
#[command(name = "labdoc")]
#[command(about = "Numeric fact extraction and category scoring for laboratory documents", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract typed numeric facts
    Extract {
        /// Document path, or - for stdin
        input: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Check measured values against their plausible ranges (exit code 2 on errors)
    Validate {
        /// Document path, or - for stdin
        input: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the numeric feature vector
    Features {
        /// Document path, or - for stdin
        input: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the text with facts replaced by category tokens
    Normalize {
        /// Document path, or - for stdin
        input: String,
    },
    /// Score rule-based categories
    Score {
        /// Document path, or - for stdin
        input: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Run every stage and print the combined JSON result
    Preprocess {
        /// Document path, or - for stdin
        input: String,
    },
    /// Blend given model probabilities with the document's rule scores
    Blend {
        /// Document path, or - for stdin
        input: String,
        /// Model probabilities as a JSON object, e.g. '{"informe_ensayo":0.6,"registro":0.4}'
        #[arg(long)]
        probs: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify a document with the configured model, falling back to rules
    Classify {
        /// Document path, or - for stdin
        input: String,
        /// Model provider name (overrides config)
        #[arg(long)]
        provider: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// List document categories
    Categories {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn load(cfg: &AppConfig, source: &str) -> Result<(labdoc_core::Preprocessor, String)> {
    let pre = build_preprocessor(cfg)?;
    let text = input::read_document(source, cfg.preprocess.max_text_bytes)?;
    Ok((pre, text))
}

fn output<T: Serialize>(json: bool, value: &T, human: impl FnOnce() -> String) -> Result<()> {
    if json {
        print_json(value)
    } else {
        println!("{}", human());
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
