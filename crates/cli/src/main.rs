// canonry CLI - resolve free-text names against a canonical vocabulary

mod console;
mod exit_codes;
mod records;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use log::{debug, warn};
use tracing_subscriber::EnvFilter;

use canonry_resolve::rank::rank;
use canonry_resolve::score::ratio;
use canonry_resolve::{
    grow_vocabulary, run, CanonError, MatchConfig, Resolver, Unattended, Vocabulary,
    VocabularyStore,
};

use console::ConsoleResolver;
use exit_codes::{
    canon_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "canonry")]
#[command(about = "Match noisy names against a canonical vocabulary")]
#[command(version)]
struct Cli {
    /// Config file (TOML). Defaults to <config dir>/canonry/config.toml if present.
    #[arg(long, global = true, env = "CANONRY_CONFIG")]
    config: Option<PathBuf>,

    /// Vocabulary file. Overrides the config's `vocabulary`.
    #[arg(long, global = true, env = "CANONRY_VOCAB")]
    vocab: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). CANONRY_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every record of a file against the vocabulary
    #[command(after_help = "\
Examples:
  canonry match names.txt -o cleaned.txt
  canonry match names.txt -o cleaned.txt --json
  cat names.txt | canonry match - > cleaned.txt
  canonry match names.txt --unattended --vocab products.txt")]
    Match {
        /// Records, one per line (empty line = absent). `-` reads stdin.
        input: PathBuf,

        /// Write resolved records here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the run report as JSON on stdout (requires --output)
        #[arg(long, requires = "output")]
        json: bool,

        /// Never prompt: apply auto matches only, keep everything else
        #[arg(long)]
        unattended: bool,

        /// Skip offering unmatched names for the vocabulary
        #[arg(long)]
        no_grow: bool,
    },

    /// Show the best vocabulary candidates for one name
    Rank {
        text: String,

        /// Number of candidates (defaults to the config's limit)
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Print the similarity ratio of two strings
    Score { a: String, b: String },

    /// Inspect or extend the vocabulary file
    #[command(subcommand)]
    Vocab(VocabCommands),
}

#[derive(Subcommand)]
enum VocabCommands {
    /// Print every entry, one per line
    List,
    /// Append entries not already present
    Add {
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Print the resolved vocabulary path
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Match { ref input, ref output, json, unattended, no_grow } => cmd_match(
            &cli,
            input,
            output.as_deref(),
            json,
            unattended,
            no_grow,
        ),
        Commands::Rank { ref text, limit, json } => cmd_rank(&cli, text, limit, json),
        Commands::Score { ref a, ref b } => {
            println!("{:.4}", ratio(a, b));
            Ok(())
        }
        Commands::Vocab(ref cmd) => cmd_vocab(&cli, cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("CANONRY_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn canon(err: CanonError) -> Self {
        let hint = match &err {
            CanonError::VocabularyLocked { path } => Some(format!(
                "another canonry process is writing; remove {}.lock if it is stale",
                path.display()
            )),
            CanonError::VocabularyNotFound { .. } => {
                Some("create it with `canonry vocab add <entry>...`".to_string())
            }
            CanonError::AtRecord { .. } => {
                Some("nothing was written; rerun once the problem is fixed".to_string())
            }
            _ => None,
        };
        Self { code: canon_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Config + vocabulary resolution
// ---------------------------------------------------------------------------

struct Settings {
    config: MatchConfig,
    vocab_path: PathBuf,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("canonry").join("config.toml"))
}

fn default_vocab_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("canonry")
        .join("vocabulary.txt")
}

fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let config = match &config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
            MatchConfig::from_toml(&text).map_err(|e| {
                CliError::config(format!("{}: {e}", path.display()))
            })?
        }
        None => MatchConfig::default(),
    };

    // Relative `vocabulary` entries are resolved against the config's directory
    let vocab_path = match (&cli.vocab, &config.vocabulary) {
        (Some(flag), _) => flag.clone(),
        (None, Some(from_config)) => {
            let base = config_path
                .as_deref()
                .and_then(Path::parent)
                .unwrap_or_else(|| Path::new("."));
            base.join(from_config)
        }
        (None, None) => default_vocab_path(),
    };

    debug!("vocabulary: {}", vocab_path.display());
    Ok(Settings { config, vocab_path })
}

// ---------------------------------------------------------------------------
// match
// ---------------------------------------------------------------------------

fn cmd_match(
    cli: &Cli,
    input: &Path,
    output: Option<&Path>,
    json: bool,
    unattended: bool,
    no_grow: bool,
) -> Result<(), CliError> {
    let settings = load_settings(cli)?;
    let store = VocabularyStore::new(&settings.vocab_path);
    let vocab = store.load_or_empty().map_err(CliError::canon)?;

    let from_stdin = input == Path::new("-");
    if from_stdin && !unattended {
        warn!("records come from stdin; running unattended");
    }
    let unattended = unattended || from_stdin;

    let records = records::read_records(input)?;

    let mut console;
    let mut fallback = Unattended;
    let resolver: &mut dyn Resolver = if unattended {
        &mut fallback
    } else {
        console = ConsoleResolver::new(io::stdin().lock(), io::stderr());
        &mut console
    };

    // Nothing is written until the whole batch has resolved.
    let outcome = run(&records, &vocab, &mut *resolver, &settings.config).map_err(CliError::canon)?;
    records::write_records(output, outcome.records())?;

    let s = &outcome.stats;
    eprintln!(
        "\nProcessing complete: {} processed, {} changed, {} unmatched ({} distinct)",
        s.total_processed,
        s.changed,
        s.unmatched,
        outcome.unmatched.len()
    );
    if let Some(path) = output {
        eprintln!("Results saved to: {}", path.display());
    }

    if json {
        let report = outcome.report(&vocab);
        let text = serde_json::to_string_pretty(&report).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{text}");
    }

    if outcome.unmatched.is_empty() {
        return Ok(());
    }

    eprintln!("\nUnmatched items:");
    for item in &outcome.unmatched {
        eprintln!("- {item}");
    }

    if unattended || no_grow {
        return Ok(());
    }

    let admitted = grow_vocabulary(&outcome.unmatched, &mut *resolver).map_err(CliError::canon)?;
    if admitted.is_empty() {
        return Ok(());
    }
    let merged = store.merge_and_save(&admitted).map_err(CliError::canon)?;
    eprintln!(
        "\nAdded {} entr{} to {} ({} total)",
        merged.added,
        if merged.added == 1 { "y" } else { "ies" },
        store.path().display(),
        merged.total
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// rank / vocab
// ---------------------------------------------------------------------------

fn cmd_rank(cli: &Cli, text: &str, limit: Option<usize>, json: bool) -> Result<(), CliError> {
    let settings = load_settings(cli)?;
    let vocab = VocabularyStore::new(&settings.vocab_path)
        .load_or_empty()
        .map_err(CliError::canon)?;

    let limit = limit.unwrap_or(settings.config.limit);
    if limit == 0 {
        return Err(CliError::args("--limit must be at least 1"));
    }
    let candidates = rank(text.trim(), &vocab, limit);

    if json {
        let text = serde_json::to_string_pretty(&candidates)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{text}");
        return Ok(());
    }

    if candidates.is_empty() {
        eprintln!("no candidates (vocabulary has {} entries)", vocab.len());
    }
    for c in &candidates {
        println!("{:.3}\t{}", c.score, c.entry);
    }
    Ok(())
}

fn cmd_vocab(cli: &Cli, cmd: &VocabCommands) -> Result<(), CliError> {
    let settings = load_settings(cli)?;
    let store = VocabularyStore::new(&settings.vocab_path);

    match cmd {
        VocabCommands::List => {
            let vocab: Vocabulary = store.load().map_err(CliError::canon)?;
            for entry in vocab.iter() {
                println!("{entry}");
            }
        }
        VocabCommands::Add { entries } => {
            let report = store.merge_and_save(entries).map_err(|e| {
                let err = CliError::canon(e);
                if err.hint.is_some() {
                    return err;
                }
                err.with_hint(format!("vocabulary: {}", store.path().display()))
            })?;
            eprintln!(
                "added {} of {}, {} total in {}",
                report.added,
                entries.len(),
                report.total,
                store.path().display()
            );
        }
        VocabCommands::Path => println!("{}", store.path().display()),
    }
    Ok(())
}
