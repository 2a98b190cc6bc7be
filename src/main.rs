use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cursorwork::tree::ChildErrors;
use cursorwork::{
    Cursor, FilterCursor, LimitCursor, RecursiveSequenceCursor, RegexFlags, RegexMode,
    SequenceCursor, TraversalMode, TraversalOptions, TreeCursor, TreeDrawing, Value,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cursorwork", about = "Walk JSON documents with composable cursors")]
struct Cli {
    /// Log structural events (descent, suppressed failures) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Flatten a nested document, one `depth<TAB>key<TAB>value` line per element.
    Flatten {
        /// JSON document (array or object at the top level).
        input: PathBuf,
        /// Which elements to report.
        #[arg(long, value_enum, default_value_t = ModeArg::Leaves)]
        mode: ModeArg,
        /// Deepest level to descend into.
        #[arg(long)]
        max_depth: Option<usize>,
        /// Fail instead of skipping elements whose children cannot be read.
        #[arg(long)]
        strict: bool,
    },
    /// Draw a nested document as an ASCII tree.
    Tree {
        /// JSON document (array or object at the top level).
        input: PathBuf,
        /// Deepest level to descend into.
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Print leaves whose value (or key) matches a regular expression.
    Grep {
        /// JSON document (array or object at the top level).
        input: PathBuf,
        /// Regular expression.
        pattern: String,
        /// Match keys instead of values.
        #[arg(long)]
        keys: bool,
        /// Print the leaves that do not match.
        #[arg(long)]
        invert: bool,
        /// What to print for accepted leaves.
        #[arg(long, value_enum, default_value_t = GrepMode::Match)]
        mode: GrepMode,
        /// Replacement text for `--mode replace`.
        #[arg(long, default_value = "")]
        replacement: String,
    },
    /// Print a window of the top-level elements.
    Slice {
        /// JSON document (array or object at the top level).
        input: PathBuf,
        /// Number of elements to skip.
        #[arg(long, default_value_t = 0)]
        offset: i64,
        /// Number of elements to print, -1 for all.
        #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
        limit: i64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Leaves,
    SelfFirst,
    ChildFirst,
}

impl From<ModeArg> for TraversalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Leaves => TraversalMode::LeavesOnly,
            ModeArg::SelfFirst => TraversalMode::SelfFirst,
            ModeArg::ChildFirst => TraversalMode::ChildFirst,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GrepMode {
    Match,
    GetMatch,
    AllMatches,
    Split,
    Replace,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Flatten {
            input,
            mode,
            max_depth,
            strict,
        } => run_flatten(&input, mode.into(), max_depth, strict)?,
        Commands::Tree { input, max_depth } => run_tree(&input, max_depth)?,
        Commands::Grep {
            input,
            pattern,
            keys,
            invert,
            mode,
            replacement,
        } => run_grep(&input, &pattern, keys, invert, mode, replacement)?,
        Commands::Slice {
            input,
            offset,
            limit,
        } => run_slice(&input, offset, limit)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(Value::from(json))
}

fn run_flatten(
    input: &Path,
    mode: TraversalMode,
    max_depth: Option<usize>,
    strict: bool,
) -> Result<()> {
    let child_errors = if strict {
        ChildErrors::Propagate
    } else {
        ChildErrors::Suppress
    };
    let options = TraversalOptions::new(mode)
        .with_max_depth(max_depth)
        .with_child_errors(child_errors);
    let mut cursor = TreeCursor::from_value(read_document(input)?, options)
        .context("top level must be an array or object")?;

    cursor.rewind()?;
    while cursor.valid() {
        println!(
            "{}\t{}\t{}",
            cursor.get_depth(),
            cursor.key()?,
            render(&cursor.current()?)
        );
        cursor.next()?;
    }
    Ok(())
}

fn run_tree(input: &Path, max_depth: Option<usize>) -> Result<()> {
    let root = RecursiveSequenceCursor::from_value(read_document(input)?)
        .context("top level must be an array or object")?;
    let mut drawing = TreeDrawing::new(root);
    if let Some(depth) = max_depth {
        drawing.tree_mut().set_max_depth(i64::try_from(depth)?)?;
    }

    drawing.rewind()?;
    while drawing.valid() {
        println!("{}{}: {}", drawing.get_prefix()?, drawing.key()?, drawing.get_entry()?);
        drawing.next()?;
    }
    Ok(())
}

fn run_grep(
    input: &Path,
    pattern: &str,
    keys: bool,
    invert: bool,
    mode: GrepMode,
    replacement: String,
) -> Result<()> {
    let leaves = TreeCursor::from_value(
        read_document(input)?,
        TraversalOptions::new(TraversalMode::LeavesOnly),
    )
    .context("top level must be an array or object")?;
    let mode = match mode {
        GrepMode::Match => RegexMode::Match,
        GrepMode::GetMatch => RegexMode::GetMatch,
        GrepMode::AllMatches => RegexMode::AllMatches,
        GrepMode::Split => RegexMode::Split,
        GrepMode::Replace => RegexMode::Replace(replacement),
    };
    let flags = RegexFlags::default()
        .with_use_key(keys)
        .with_invert_match(invert);
    let mut cursor = FilterCursor::regex(leaves, pattern, mode, flags)
        .with_context(|| format!("invalid pattern {pattern:?}"))?;

    cursor.rewind()?;
    while cursor.valid() {
        println!(
            "{}\t{}\t{}",
            cursor.inner().get_depth(),
            cursor.key()?,
            render(&cursor.current()?)
        );
        cursor.next()?;
    }
    Ok(())
}

fn run_slice(input: &Path, offset: i64, limit: i64) -> Result<()> {
    let top = SequenceCursor::from_value(read_document(input)?)
        .context("top level must be an array or object")?;
    let mut cursor = LimitCursor::new(top, offset, limit)?;

    cursor.rewind()?;
    while cursor.valid() {
        println!("{}\t{}", cursor.key()?, render(&cursor.current()?));
        cursor.next()?;
    }
    Ok(())
}

/// Containers print as their entries in brackets instead of "Array".
fn render(value: &Value) -> String {
    match value.as_container() {
        Some(entries) => {
            let parts: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{key}: {}", render(value)))
                .collect();
            format!("[{}]", parts.join(", "))
        }
        None => value.to_string(),
    }
}
