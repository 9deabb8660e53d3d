#![forbid(unsafe_code)]

use ffx_emit::Layout;
use ffx_generate::{GeneratorConfig, SuiteSelection, run};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
struct CliArgs {
    config_path: Option<PathBuf>,
    suites: Option<SuiteSelection>,
    layout: Option<Layout>,
    manifest_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
enum CliParseError {
    Help,
    Message(String),
}

fn parse_cli_args(args: &[String]) -> Result<CliArgs, CliParseError> {
    let mut cli = CliArgs::default();

    let mut index = 0;
    while index < args.len() {
        let flag = args[index].as_str();
        if matches!(flag, "-h" | "--help") {
            return Err(CliParseError::Help);
        }
        let Some(value) = args.get(index + 1) else {
            return Err(CliParseError::Message(match flag {
                "--config" | "--suite" | "--layout" | "--manifest" => {
                    format!("missing value for {flag}")
                }
                unknown => format!("unrecognized argument `{unknown}`"),
            }));
        };
        match flag {
            "--config" => cli.config_path = Some(PathBuf::from(value)),
            "--manifest" => cli.manifest_path = Some(PathBuf::from(value)),
            "--suite" => {
                cli.suites = Some(value.parse().map_err(CliParseError::Message)?);
            }
            "--layout" => {
                cli.layout = Some(value.parse().map_err(CliParseError::Message)?);
            }
            unknown => {
                return Err(CliParseError::Message(format!(
                    "unrecognized argument `{unknown}`"
                )));
            }
        }
        index += 2;
    }

    Ok(cli)
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {program} [--config <path>] [--suite determinant|solver|all] [--layout nested|flat] [--manifest <path>]"
    );
    eprintln!("  --config <path>    JSON generator config (defaults reproduce the stock fixtures)");
    eprintln!("  --suite <name>     which suite to emit (default: all)");
    eprintln!("  --layout <name>    force one data layout on every suite");
    eprintln!("  --manifest <path>  write a JSON manifest of emitted cases");
    eprintln!();
    eprintln!("Fixture text goes to stdout; logs go to stderr (RUST_LOG controls verbosity).");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    let program = argv
        .first()
        .cloned()
        .unwrap_or_else(|| String::from("generate_fixtures"));

    let args = match parse_cli_args(argv.get(1..).unwrap_or_default()) {
        Ok(args) => args,
        Err(CliParseError::Help) => {
            print_usage(&program);
            return ExitCode::SUCCESS;
        }
        Err(CliParseError::Message(message)) => {
            eprintln!("{message}");
            print_usage(&program);
            return ExitCode::from(2);
        }
    };

    init_tracing();

    let mut config = match &args.config_path {
        Some(path) => match GeneratorConfig::from_json_file(path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("generate_fixtures error: {error}");
                return ExitCode::from(2);
            }
        },
        None => GeneratorConfig::default(),
    };
    if let Some(suites) = args.suites {
        config.suites = suites;
    }
    if let Some(layout) = args.layout {
        config.set_layout(layout);
    }
    if args.manifest_path.is_some() {
        config.manifest_path = args.manifest_path;
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match run(&config, &mut out) {
        Ok(manifest) => {
            tracing::debug!(
                target: "ffx.generate",
                cases = manifest.case_count,
                "fixtures written to stdout"
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(target: "ffx.generate", %error, "generation failed");
            eprintln!("generate_fixtures error: {error}");
            ExitCode::from(1)
        }
    }
}
