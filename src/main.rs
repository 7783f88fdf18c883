use std::io::{self, BufRead, Write};

use arith_eval::{Environment, EvalError, Lexer, evaluate};
use clap::{ArgAction, Parser, Subcommand};
use miette::{IntoDiagnostic, NamedSource, WrapErr, miette};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(version, about = "Evaluate arithmetic expressions over named variables")]
struct Args {
    /// Log more: `-v` for debug output, `-vv` for every token and operation.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate one expression and print the result.
    Eval {
        expression: String,
        /// Bind a variable before evaluating. Later bindings win.
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
        vars: Vec<(String, f64)>,
    },
    /// Ask for variables and an expression on the console.
    Prompt,
    /// Print the tokens of an expression.
    Tokenize { expression: String },
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Eval { expression, vars } => {
            let environment: Environment = vars.into_iter().collect();
            print_result(&expression, &environment);
        }
        Commands::Prompt => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            let (environment, expression) = run_prompt(&mut stdin.lock(), &mut stdout)?;
            print_result(&expression, &environment);
        }
        Commands::Tokenize { expression } => match token_dump(&expression) {
            Ok(lines) => lines.iter().for_each(|line| println!("{line}")),
            Err(e) => fail(&expression, e),
        },
    }
    Ok(())
}

/// Exit status for an expression that could not be scanned or evaluated.
const DATA_ERROR: i32 = 65;

/// Runs the console session: variable count, then a name and a value per
/// variable, then the expression.
fn run_prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> miette::Result<(Environment, String)> {
    let count = prompt(input, output, "Enter the number of variables: ")?;
    let count: usize = count
        .parse()
        .into_diagnostic()
        .wrap_err_with(|| format!("`{count}` is not a variable count"))?;

    let mut environment = Environment::new();
    for _ in 0..count {
        let name = prompt(input, output, "Enter the variable name: ")?;
        validate_name(&name).map_err(|e| miette!("{e}"))?;
        let value = prompt(input, output, "Enter the variable value: ")?;
        let value: f64 = value
            .parse()
            .into_diagnostic()
            .wrap_err_with(|| format!("`{value}` is not a number"))?;
        environment.set(name, value);
    }
    info!(variables = environment.len(), "environment ready");

    let expression = prompt(input, output, "Enter the expression to evaluate: ")?;
    Ok((environment, expression))
}

/// One line per token followed by the `EOF  null` trailer.
fn token_dump(expression: &str) -> Result<Vec<String>, EvalError> {
    let mut lines = Lexer::new(expression)
        .map(|token| token.map(|token| token.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    lines.push("EOF  null".to_string());
    Ok(lines)
}

fn print_result(expression: &str, environment: &Environment) {
    match evaluate(expression, environment) {
        Ok(value) => println!("Result: {}", display_number(value)),
        Err(e) => fail(expression, e),
    }
}

fn report(expression: &str, error: EvalError) -> miette::Report {
    miette::Report::new(error)
        .with_source_code(NamedSource::new("<input>", expression.to_string()))
}

/// Renders `error` against the expression it came from and exits.
fn fail(expression: &str, error: EvalError) -> ! {
    debug!(?error, "reporting evaluation error");
    eprintln!("{:?}", report(expression, error));
    std::process::exit(DATA_ERROR);
}

fn prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
    message: &str,
) -> miette::Result<String> {
    write!(output, "{message}").into_diagnostic()?;
    output.flush().into_diagnostic()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .into_diagnostic()
        .wrap_err("reading from stdin failed")?;
    if read == 0 {
        return Err(miette!(
            help = "the session needs an answer for every prompt",
            "stdin closed unexpectedly"
        ));
    }
    Ok(line.trim().to_string())
}

fn display_number(value: f64) -> String {
    if value.is_finite() && value == value.trunc() {
        format!("{value}.0")
    } else {
        value.to_string()
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() || !name.chars().all(char::is_alphabetic) {
        return Err(format!(
            "invalid variable name `{name}`: names are made of letters only"
        ));
    }
    Ok(())
}

fn parse_binding(binding: &str) -> Result<(String, f64), String> {
    let (name, value) = binding
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{binding}`"))?;
    let name = name.trim();
    validate_name(name)?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for `{name}`: {e}"))?;
    Ok((name.to_string(), value))
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{
        filter::{LevelFilter, Targets},
        fmt::Layer,
        prelude::*,
    };

    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            Layer::new().with_writer(io::stderr).with_filter(
                Targets::new()
                    .with_default(LevelFilter::WARN)
                    .with_target("arith_eval", level),
            ),
        )
        .init();
}
