mod report;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use harness::{HarnessConfig, HarnessError, ProcessCompiler};
use report::Style;

const SUBCOMMANDS: &[&str] = &["aggregate", "split", "compile", "help"];

#[derive(Parser)]
#[command(
    name = "lpg-doc",
    version,
    about = "Extract lpg examples from documentation and check them"
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (defaults to lpg-doc.toml in the root, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the examples that would be processed and exit
    #[arg(long, global = true)]
    list: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Concatenate all examples into a single file (default)
    Aggregate(AggregateArgs),

    /// Write each example to its own numbered file
    Split(SplitArgs),

    /// Compile each example, stopping at the first failure
    Compile(CompileArgs),
}

#[derive(clap::Args)]
struct AggregateArgs {
    /// Documentation root to scan
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Omit the `// <file> : <index>` line before each example
    #[arg(long)]
    no_annotate: bool,
}

impl Default for AggregateArgs {
    fn default() -> Self {
        AggregateArgs {
            root: PathBuf::from("."),
            output: None,
            no_annotate: false,
        }
    }
}

#[derive(clap::Args)]
struct SplitArgs {
    /// Documentation root to scan
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Directory receiving the numbered files
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
struct CompileArgs {
    /// Documentation root to scan
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Compiler executable
    #[arg(long)]
    compiler: Option<PathBuf>,
}

fn main() {
    init_tracing();

    // `lpg-doc docs/` works like `lpg-doc aggregate docs/`.
    let args = with_default_subcommand(std::env::args().collect());
    let cli = Cli::parse_from(&args);
    let style = Style::new(cli.no_color);

    let command = cli
        .command
        .unwrap_or_else(|| Command::Aggregate(AggregateArgs::default()));

    if let Err(err) = run(command, cli.config.as_deref(), cli.list, &style) {
        report::print_error(&err, &style);
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Insert "aggregate" right after the binary name unless a subcommand is named.
///
/// Top-level `--help` and `--version` are left alone.
fn with_default_subcommand(mut args: Vec<String>) -> Vec<String> {
    let rest = args.get(1..).unwrap_or_default();
    let named = rest.iter().any(|a| SUBCOMMANDS.contains(&a.as_str()));
    let asks_top_level = rest
        .iter()
        .any(|a| matches!(a.as_str(), "-h" | "--help" | "-V" | "--version"));
    if !named && !asks_top_level {
        let at = args.len().min(1);
        args.insert(at, "aggregate".to_string());
    }
    args
}

fn run(
    command: Command,
    config_path: Option<&Path>,
    list: bool,
    style: &Style,
) -> harness::Result<()> {
    match command {
        Command::Aggregate(args) => {
            let mut config = HarnessConfig::discover(config_path, &args.root)?;
            if let Some(output) = args.output {
                config.output = output;
            }
            if args.no_annotate {
                config.annotate = false;
            }
            if list {
                return list_examples(&args.root, &config);
            }

            let written = harness::aggregate(&args.root, &config)?;
            eprintln!(
                "wrote {} example(s) to {}",
                written.blocks,
                written.path.display()
            );
        }

        Command::Split(args) => {
            let mut config = HarnessConfig::discover(config_path, &args.root)?;
            if let Some(dir) = args.out_dir {
                config.split_dir = dir;
            }
            if list {
                return list_examples(&args.root, &config);
            }

            let written = harness::split(&args.root, &config)?;
            eprintln!(
                "wrote {} example(s) to {}",
                written.len(),
                config.split_dir.display()
            );
        }

        Command::Compile(args) => {
            let mut config = HarnessConfig::discover(config_path, &args.root)?;
            if let Some(compiler) = args.compiler {
                config.compiler = compiler;
            }
            if list {
                return list_examples(&args.root, &config);
            }

            tracing::debug!(
                compiler = %config.compiler.display(),
                command = %config.compile_command,
                "compiling examples"
            );
            let mut compiler =
                ProcessCompiler::new(config.compiler.clone(), config.compile_command.clone());
            let mut passed = 0usize;
            let outcome = harness::compile(&args.root, &config, &mut compiler, |result| {
                if result.success() {
                    passed += 1;
                }
                report::print_result(result, style);
            });

            match outcome {
                Ok(_) => report::print_summary(passed, 0, style),
                Err(err @ HarnessError::CompilationFailed { .. }) => {
                    report::print_summary(passed, 1, style);
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }
    }
    Ok(())
}

fn list_examples(root: &Path, config: &HarnessConfig) -> harness::Result<()> {
    let blocks = harness::collect_blocks(root, config)?;
    report::print_listing(&blocks);
    Ok(())
}
