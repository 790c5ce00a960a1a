use std::fs;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value as JsonValue};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::executor::Val;
use crate::monad::{List, Maybe, State};
use crate::parser::semantic_validator::Severity;
use crate::program::Program;

#[derive(Parser)]
#[command(name = "donotation")]
#[command(about = "Run do-notation bodies against the bundled monads", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the composed value and run it
    Run {
        /// Source file holding one `do function`
        file: String,

        /// Positional argument as JSON (repeatable)
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Initial context for State computations (JSON; default: empty set)
        #[arg(long)]
        context: Option<String>,
    },

    /// Parse and validate without running
    Check {
        /// Source file holding one `do function`
        file: String,
    },

    /// Print the parsed AST as JSON
    Ast {
        /// Source file holding one `do function`
        file: String,
    },
}

/// Run the CLI by parsing process arguments
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run the CLI with provided arguments
pub fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli)
}

fn run_cli_with_args(cli: Cli) -> Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration before anything else so config errors surface first
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config.log.level);

    match cli.command {
        Commands::Run {
            file,
            args,
            context,
        } => {
            let source = read_source(&file)?;
            let function = Program::parse(&source)?.compile_with(&config.validation)?;

            let args = args
                .iter()
                .map(|raw| parse_json(raw, "--arg"))
                .collect::<Result<Vec<_>>>()?;
            let context = context
                .as_deref()
                .map(|raw| parse_json(raw, "--context"))
                .transpose()?;

            debug!(function = function.name(), args = args.len(), "running");
            let composed = function.call(&args)?;
            let output = execute(&composed, context)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Check { file } => {
            let source = read_source(&file)?;
            let program = Program::parse(&source)?;
            let diagnostics = program.validate();

            for diagnostic in &diagnostics {
                println!("{}: {}", file, diagnostic);
            }

            let failing = diagnostics
                .iter()
                .filter(|d| {
                    d.severity == Severity::Error
                        || (config.validation.warnings_as_errors && d.severity == Severity::Warning)
                })
                .count();
            if failing > 0 {
                bail!("{} problem(s) found in {}", failing, file);
            }
            println!("{}: ok", file);
        }

        Commands::Ast { file } => {
            let source = read_source(&file)?;
            let program = Program::parse(&source)?;
            println!("{}", serde_json::to_string_pretty(program.def())?);
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_source(file: &str) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))
}

fn parse_json(raw: &str, flag: &str) -> Result<Val> {
    let json: JsonValue =
        serde_json::from_str(raw).with_context(|| format!("{} is not valid JSON: {}", flag, raw))?;
    Ok(Val::from_json(&json))
}

/// Run a composed value with its family's run operation and describe the
/// outcome as JSON.
fn execute(composed: &Val, context: Option<Val>) -> Result<JsonValue> {
    let Some(monad) = composed.as_monad() else {
        return Ok(json!({ "value": composed.to_json()? }));
    };

    if context.is_some() && monad.family() != State::FAMILY {
        debug!(family = monad.family(), "--context ignored");
    }

    let output = match monad.family() {
        State::FAMILY => {
            let context = context.unwrap_or_else(|| Val::Set(Vec::new()));
            let (context, value) = State::from_val(composed)?.run(context)?;
            json!({ "value": value.to_json()?, "context": context.to_json()? })
        }
        Maybe::FAMILY => match Maybe::from_val(composed)?.run()? {
            Some(value) => json!({ "just": value.to_json()? }),
            None => json!({ "nothing": true }),
        },
        List::FAMILY => {
            let values = List::from_val(composed)?
                .run()?
                .iter()
                .map(Val::to_json)
                .collect::<Result<Vec<_>, _>>()?;
            json!({ "values": values })
        }
        other => bail!("Don't know how to run a {} monad", other),
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DoError;

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "donotation",
            "run",
            "demo.do",
            "--arg",
            "3",
            "--arg",
            "\"x\"",
            "--context",
            "[]",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                file,
                args,
                context,
            } => {
                assert_eq!(file, "demo.do");
                assert_eq!(args, vec!["3", "\"x\""]);
                assert_eq!(context.as_deref(), Some("[]"));
            }
            _ => panic!("Expected run"),
        }
    }

    #[test]
    fn test_execute_state_defaults_to_empty_set() {
        let composed = State::get().into_val();
        let output = execute(&composed, None).unwrap();
        assert_eq!(output, json!({ "value": [], "context": [] }));
    }

    #[test]
    fn test_execute_maybe_and_list() {
        let output = execute(&Maybe::nothing().into_val(), None).unwrap();
        assert_eq!(output, json!({ "nothing": true }));

        let list = List::of(vec![Val::Num(1.0), Val::Num(2.5)]).into_val();
        assert_eq!(execute(&list, None).unwrap(), json!({ "values": [1, 2.5] }));
    }

    #[test]
    fn test_execute_plain_value() {
        let output = execute(&Val::Str("done".into()), None).unwrap();
        assert_eq!(output, json!({ "value": "done" }));
    }

    #[test]
    fn test_invalid_json_argument() {
        let err = parse_json("{oops", "--arg").unwrap_err();
        assert!(err.to_string().contains("--arg is not valid JSON"));
    }

    fn write_source(name: &str, source: &str) -> String {
        let path = std::env::temp_dir().join(format!("donotation-{}-{}.do", name, std::process::id()));
        fs::write(&path, source).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn cli(args: &[&str]) -> Result<()> {
        let mut argv = vec!["donotation".to_string()];
        argv.extend(args.iter().map(|a| a.to_string()));
        run_cli_from_args(argv)
    }

    #[test]
    fn test_run_and_check_from_args() {
        let file = write_source(
            "ok",
            "do function f(n) { let s = yield State.get()\n return State.pure(s + n) }",
        );

        cli(&["run", &file, "--arg", "2", "--context", "40"]).unwrap();
        cli(&["check", &file]).unwrap();
        cli(&["ast", &file]).unwrap();

        fs::remove_file(&file).unwrap();
    }

    #[test]
    fn test_check_reports_problems() {
        let file = write_source("bad", "do function f() { return missing }");

        let err = cli(&["check", &file]).unwrap_err();
        assert!(err.to_string().contains("1 problem(s) found"));

        fs::remove_file(&file).unwrap();
    }

    #[test]
    fn test_run_surfaces_capability_violation() {
        let file = write_source("plain", "do function f() { let x = yield 5\n return x }");

        let err = cli(&["run", &file]).unwrap_err();
        let violation = err.downcast_ref::<DoError>().unwrap();
        assert!(violation.is_capability_violation());

        fs::remove_file(&file).unwrap();
    }
}
