use anyhow::Context;
use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;
use yansi::Paint;

use pebble::config::{Config, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_NESTING_DEPTH};
use pebble::error::CompileError;
use pebble::interpreter::Interpreter;
use pebble::lexer;
use pebble::parser::Parser;
use pebble::source::Source;

use std::fs;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

/// Runs a Pebble program: lex, check, then execute.
#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The program to run.
    file: PathBuf,

    /// Print the token stream instead of running the program.
    #[arg(long)]
    tokens: bool,

    /// Print the checked syntax tree instead of running the program.
    #[arg(long)]
    ast: bool,

    /// Print diagnostics as plain text instead of an annotated report.
    #[arg(long)]
    plain: bool,

    /// Disable colored output on stderr.
    #[arg(long)]
    no_color: bool,

    /// Deepest chain of function calls before the program is stopped.
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Deepest statement and expression nesting the parser accepts.
    #[arg(long, default_value_t = DEFAULT_MAX_NESTING_DEPTH)]
    max_nesting: usize,

    /// Log filter such as `debug` or `pebble=trace`. Overrides PEBBLE_LOG.
    #[arg(long)]
    log: Option<String>,
}

fn init_logging(directive: Option<&str>, ansi: bool) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_env("PEBBLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .compact()
        .init();
}

fn report(
    error: &CompileError,
    source: &Source,
    config: &Config,
    plain: bool,
) -> anyhow::Result<ExitCode> {
    if plain {
        eprintln!("{error}");
    } else {
        error
            .eprint(source, config.color)
            .context("failed to write the diagnostic")?;
    }
    Ok(ExitCode::FAILURE)
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    if args.no_color {
        yansi::disable();
    }
    init_logging(args.log.as_deref(), !args.no_color);

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read '{}'", args.file.display()))?;
    let source = Source::new(args.file.display().to_string(), text);
    let config = Config::default()
        .with_max_call_depth(args.max_call_depth)
        .with_max_nesting_depth(args.max_nesting)
        .with_color(!args.no_color);

    pebble::with_stack(&config, || execute(&args, &source, &config))
        .context("failed to start the interpreter thread")?
}

fn execute(args: &Args, source: &Source, config: &Config) -> anyhow::Result<ExitCode> {
    let tokens = match lexer::lex(source) {
        Ok(tokens) => tokens,
        Err(error) => return report(&error, source, config, args.plain),
    };
    if args.tokens {
        for token in &tokens {
            println!(
                "{:>4}  {:<24} {}",
                token.line + 1,
                token.kind.to_string(),
                token.lexeme
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let program = match Parser::new(&tokens, source, config).parse_program() {
        Ok(program) => program,
        Err(error) => return report(&error, source, config, args.plain),
    };
    if args.ast {
        println!("{program:#?}");
        return Ok(ExitCode::SUCCESS);
    }

    let mut interpreter = Interpreter::new(BufWriter::new(io::stdout().lock()), config);
    let result = interpreter.execute_program(&program);
    // flush program output before any error text
    drop(interpreter);

    if let Err(error) = result {
        eprintln!("{} {error}", "error:".red().bold());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
