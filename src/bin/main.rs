use anyhow::{bail, Context, Result};
use clap::Parser;
use markov_core::{EngineConfig, MarkovEngine, MentionFormat};
use serde_json::json;
use std::io::{stdin, stdout, BufRead, Write};
use std::path::PathBuf;

/// Prompt that asks for ten unseeded replies at once.
const BATCH_COMMAND: &str = "GETGET10";
const BATCH_SIZE: usize = 10;

#[derive(Parser, Debug)]
#[command(
    name = "markov_engine",
    version,
    about = "Second-order Markov chatter: reads prompts on stdin, replies on stdout."
)]
struct Cli {
    /// YAML config file; command line options override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Corpus replayed at startup (.yml/.yaml token list or plain text)
    #[arg(short, long, env = "CB_BRAIN", required_unless_present = "config")]
    brain: Option<PathBuf>,

    /// Log of learned phrases [default: <data dir>/markov-chatter/learned_corpus.txt]
    #[arg(short, long, env = "CB_OUTPUT")]
    output: Option<PathBuf>,

    /// YAML mapping of user name -> platform mention
    #[arg(short, long, env = "CB_USER_MAP")]
    user_map: Option<PathBuf>,

    /// Words never learned (comma separated in the environment)
    #[arg(short, long, env = "CB_IGNORE", value_delimiter = ',')]
    ignore: Vec<String>,

    #[arg(long)]
    max_steps: Option<usize>,

    /// Write learned phrases from a background thread
    #[arg(long)]
    background_writes: bool,

    /// Reply without learning from prompts
    #[arg(long)]
    no_learn: bool,

    /// Turn platform mentions back into user names instead of the reverse
    #[arg(long)]
    canonical: bool,

    /// Print one JSON object per reply
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_yaml_file(path)
                .with_context(|| format!("cannot load config from '{}'", path.display()))?,
            None => {
                let Some(brain) = self.brain.clone() else {
                    bail!("either --config or --brain is required");
                };
                EngineConfig::new(brain, default_output_path()?)
            }
        };
        if let Some(brain) = self.brain {
            config.corpus_source = brain;
        }
        if let Some(output) = self.output {
            config.corpus_output = output;
        }
        if self.user_map.is_some() {
            config.user_map = self.user_map;
        }
        if !self.ignore.is_empty() {
            config.ignore_words = self.ignore;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        config.background_writes |= self.background_writes;
        Ok(config)
    }
}

fn default_output_path() -> Result<PathBuf> {
    let mut path = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .context("could not find a data or home directory for the corpus log")?;
    path.push("markov-chatter");
    path.push("learned_corpus.txt");
    Ok(path)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("markov_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let learn = !cli.no_learn;
    let json = cli.json;
    let format = if cli.canonical {
        MentionFormat::Canonical
    } else {
        MentionFormat::Platform
    };

    let config = cli.into_config()?;
    let mut engine = MarkovEngine::open(&config).context("cannot start the engine")?;
    let stats = engine.stats();
    tracing::info!(words = stats.words, keys = stats.keys, "ready for prompts");

    let mut out = stdout();
    for line in stdin().lock().lines() {
        let prompt = line?;
        let prompt = prompt.trim();
        if prompt == "exit" {
            break;
        }

        let result = if prompt.eq_ignore_ascii_case(BATCH_COMMAND) {
            engine.create_responses(BATCH_SIZE, format)
        } else {
            engine.create_response(prompt, learn, format)
        };

        match result {
            Ok(reply) if json => writeln!(out, "{}", json!({ "prompt": prompt, "reply": reply }))?,
            Ok(reply) => writeln!(out, "{}", reply)?,
            Err(e) => {
                tracing::warn!(error = %e, "no reply for prompt");
                if json {
                    writeln!(out, "{}", json!({ "prompt": prompt, "error": e.to_string() }))?;
                }
            }
        }
        out.flush()?;
    }

    let stats = engine.stats();
    tracing::info!(words = stats.words, keys = stats.keys, "shutting down");
    Ok(())
}
