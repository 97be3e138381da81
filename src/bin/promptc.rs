//! Command-line interface for promptc
//! This binary compiles prompt sources into their final text, or dumps intermediate stages for inspection.
//!
//! Usage:
//!   promptc compile `<path>` [-I `<dir>`]... [--format `<format>`] [--config `<file>`] [--framing fenced|raw]
//!   promptc formats                                  - List all available output formats
//!
//! Diagnostics go to stderr. Exit status is 0 on success, 1 when the prompt
//! has errors and 2 for usage or configuration problems.

use clap::{Arg, ArgAction, ArgMatches, Command};
use promptc::promptc::config::{Loader, PromptcConfig};
use promptc::promptc::formats::{format_analysis, format_prompt, OutputFormat};
use promptc::{CompileOptions, Compiler, Diagnostic, EmitOptions, Severity};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Picked up from the working directory when present
const LOCAL_CONFIG: &str = "promptc.toml";

fn main() {
    init_tracing();

    let matches = Command::new("promptc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile structured LLM prompts")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("compile")
                .about("Compile a prompt source and write the result to stdout")
                .arg(
                    Arg::new("path")
                        .help("Path to the root prompt source")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("include")
                        .long("include-path")
                        .short('I')
                        .help("Extra directory searched for Include:/Embed: targets (repeatable)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (text, json, yaml, tree, tokens)")
                        .default_value("text"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Configuration file layered over the defaults")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("framing")
                        .long("framing")
                        .help("How embedded files are framed")
                        .value_parser(["fenced", "raw"]),
                ),
        )
        .subcommand(Command::new("formats").about("List available output formats"))
        .get_matches();

    match matches.subcommand() {
        Some(("compile", compile_matches)) => handle_compile_command(compile_matches),
        Some(("formats", _)) => handle_formats_command(),
        _ => unreachable!(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PROMPTC_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Handle the compile command
fn handle_compile_command(matches: &ArgMatches) {
    let path = matches
        .get_one::<PathBuf>("path")
        .expect("path is a required argument");
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text")
        .parse::<OutputFormat>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        });
    let config = load_config(
        matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
        matches.get_one::<String>("framing").map(String::as_str),
    );
    let search_paths: Vec<PathBuf> = matches
        .get_many::<PathBuf>("include")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default();

    let compiler = Compiler::new(CompileOptions::from(&config));
    let emit_options = EmitOptions::from(&config);

    let source = compiler.read_root(path).unwrap_or_else(|failure| {
        report(failure.diagnostics.iter());
        std::process::exit(1);
    });

    if format.is_inspection() {
        let analysis = compiler.analyze(&source, path, &search_paths);
        let output = format_analysis(&analysis, format).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        });
        print!("{}", output);
        report(analysis.diagnostics.iter());
        if analysis.diagnostics.has_errors() {
            std::process::exit(1);
        }
        return;
    }

    match compiler.compile_with(&source, path, &search_paths) {
        Ok(prompt) => {
            report(prompt.diagnostics.iter());
            let output = format_prompt(&prompt, format, &emit_options).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(2);
            });
            print!("{}", output);
        }
        Err(failure) => {
            report(failure.diagnostics.iter());
            std::process::exit(1);
        }
    }
}

/// Handle the formats command
fn handle_formats_command() {
    println!("Available output formats:\n");
    for format in OutputFormat::ALL {
        let description = match format {
            OutputFormat::Text => "The rendered prompt",
            OutputFormat::Json => "Sections and diagnostics as JSON",
            OutputFormat::Yaml => "Sections and diagnostics as YAML",
            OutputFormat::Tree => "The document tree as JSON, even for invalid input",
            OutputFormat::Tokens => "The expanded token stream, even for invalid input",
        };
        println!("  {}", format);
        println!("    {}", description);
    }
}

fn load_config(file: Option<&Path>, framing: Option<&str>) -> PromptcConfig {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    if let Some(file) = file {
        loader = loader.with_file(file);
    }
    if let Some(framing) = framing {
        loader = loader
            .set_override("emit.embed_framing", framing)
            .unwrap_or_else(|e| {
                eprintln!("Configuration error: {}", e);
                std::process::exit(2);
            });
    }
    loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(2);
    })
}

fn report<'a>(diagnostics: impl Iterator<Item = &'a Diagnostic>) {
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        eprintln!("{}: {}", severity, diagnostic);
    }
}
