mod debug_report;

use chartrealize::{CategorialGrammar, Directive, PolicyRegistry, RealizerConfig, Request, realize};
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_GRAMMAR: &str = "grammar.lex";
const LOG_ENV: &str = "CHARTREALIZE_LOG";

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    std::process::exit(match run(&config) {
        Ok(()) => 0,
        Err((code, err)) => {
            eprintln!("{err}");
            code
        }
    });
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

struct CliConfig {
    grammar: String,
    input: String,
    output: Option<String>,
    /// Applied after the request's own directives, so flags win.
    overrides: Vec<Directive>,
    color: bool,
}

fn run(config: &CliConfig) -> Result<(), (i32, String)> {
    let usage = |err: String| (2, err);

    let lexicon = std::fs::read_to_string(&config.grammar)
        .map_err(|err| usage(format!("error: cannot read grammar '{}': {err}", config.grammar)))?;
    let grammar: CategorialGrammar =
        lexicon.parse().map_err(|err| usage(format!("error: grammar '{}': {err}", config.grammar)))?;

    let text = std::fs::read_to_string(&config.input)
        .map_err(|err| usage(format!("error: cannot read input '{}': {err}", config.input)))?;
    let request: Request = text.parse().map_err(|err| usage(format!("error: input '{}': {err}", config.input)))?;

    let realizer_config =
        RealizerConfig::default().with_directives(&request.directives).with_directives(&config.overrides);
    tracing::debug!(config = ?realizer_config, entries = grammar.entry_count(), "loaded request");

    let result = realize(&grammar, &request.lf, &realizer_config).map_err(|err| (1, format!("error: {err}")))?;

    let write_err = |err: io::Error| (1, format!("error: failed to write report: {err}"));
    match &config.output {
        Some(path) => {
            let file = File::create(path).map_err(|err| usage(format!("error: cannot create '{path}': {err}")))?;
            let mut out = BufWriter::new(file);
            debug_report::write_run(&mut out, &request.lf, &realizer_config, &result, false).map_err(write_err)?;
            out.flush().map_err(write_err)
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            debug_report::write_run(&mut out, &request.lf, &realizer_config, &result, config.color).map_err(write_err)
        }
    }
}

fn parse_args() -> Result<CliConfig, String> {
    let mut grammar = DEFAULT_GRAMMAR.to_string();
    let mut positional: Vec<String> = Vec::new();
    let mut overrides: Vec<Directive> = Vec::new();
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, String> {
            match inline.clone() {
                Some(v) => Ok(v),
                None => args.next().ok_or_else(|| format!("error: {name} expects a value")),
            }
        };

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("chartrealize {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "-g" | "--grammar" => grammar = value("--grammar")?,
            "--pruning" => overrides.push(Directive::PruningStrategy(policy_id(value("--pruning")?))),
            "--hypertagger" => overrides.push(Directive::Hypertagger(policy_id(value("--hypertagger")?))),
            "--edge-budget" => {
                let n = limit("--edge-budget", &value("--edge-budget")?)?;
                overrides.push(Directive::EdgeBudget(n.map(|n| n as usize)));
            }
            "--time-budget-ms" => {
                let ms = limit("--time-budget-ms", &value("--time-budget-ms")?)?;
                overrides.push(Directive::TimeBudget(ms.map(Duration::from_millis)));
            }
            "--list-policies" => {
                print_policies();
                std::process::exit(0);
            }
            _ if arg.starts_with('-') && arg != "-" => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let input = positional.next().ok_or_else(|| format!("error: no input file\n\n{}", help_text()))?;
    let output = positional.next();
    if let Some(extra) = positional.next() {
        return Err(format!("error: unexpected argument '{extra}'"));
    }

    Ok(CliConfig { grammar, input, output, overrides, color })
}

fn policy_id(value: String) -> Option<String> {
    if value == "none" { None } else { Some(value) }
}

fn limit(flag: &str, value: &str) -> Result<Option<u64>, String> {
    if value == "unlimited" {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| format!("error: invalid {flag} '{value}' (expected a number or 'unlimited')"))
}

fn print_policies() {
    let registry = PolicyRegistry::global();
    println!("pruning strategies: {}", registry.pruning_names().join(", "));
    println!("hypertaggers:       {}", registry.hypertagger_names().join(", "));
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "chartrealize {version}

Chart-based surface realizer CLI.

Usage:
  chartrealize [OPTIONS] <inputfile> [<outputfile>]

The input file holds a logical form in text notation, optionally preceded by
'@' directive lines (@pruning-strategy, @hypertagger, @edge-budget,
@time-budget-ms). The report goes to <outputfile>, or stdout.

Options:
  -g, --grammar <file>       Lexicon file ('pred[+pred] : category : words').
                             Default: {default_grammar}
  --pruning <id|none>        Pruning strategy, e.g. n-best:5.
  --hypertagger <id|none>    Hypertagger, e.g. beta-best:2.
  --edge-budget <n|unlimited>
                             Maximum edges built by combination.
  --time-budget-ms <n|unlimited>
                             Wall-clock budget per request.
  --list-policies            List registered policy names.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Flags override directives found in the input file.
Set {log_env}=debug (or trace) for search logging on stderr.

Exit codes:
  0  Success (including \"no realization found\").
  1  Realization fault (unknown policy, grammar error).
  2  Invalid arguments or unreadable input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_grammar = DEFAULT_GRAMMAR,
        log_env = LOG_ENV,
    )
}
