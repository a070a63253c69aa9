// Command-line interface for convo
//
// This binary exports a captured conversation (a saved share page, or a JSON
// data file written by an earlier export) to JSON or PDF. All of the work is
// done by the convo-babel crate; this is the shell around it: argument
// parsing, configuration, logging, and writing the artifact to disk.
//
// Converting:
//
// The source format is auto-detected from the file extension, while being overwrittable by an
// explicit --from flag. The artifact is named {title}_{millis}.{ext} and written into the -o
// directory (the current directory by default). Its path is printed on success.
// Usage:
//  convo <input> --to <format> [--from <format>] [-o <dir>] [--url <url>]  - Export (default)
//  convo convert <input> --to <format> ...                                - Same as above (explicit)
//  convo tokens <file.md>                                                 - Tokenizer output as JSON
//  convo --list-formats                                                   - List available formats
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format.
// A few keys configure the export itself and are consumed here instead:
//  --extra-fallback-title <name>   title used when the real one sanitizes to nothing
//  --extra-max-title-len <n>       sanitized title length cap
// Example:
//  convo share.html --to pdf --extra-page-size a4 --extra-compress false

use clap::{Arg, ArgAction, Command, ValueHint};
use convo_babel::extract::ExtractSelectors;
use convo_babel::format::ParseOptions;
use convo_babel::render::{PageGeometry, RenderStyle};
use convo_babel::{tokenize, ExportError, Exporter, FormatRegistry, TitleRules};
use convo_config::{ConvoConfig, Loader, LOCAL_CONFIG_FILE};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = i + 1 < args.len() && !args[i + 1].starts_with('-');

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("convo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Export conversation transcripts to JSON or PDF")
        .long_about(
            "convo turns a saved conversation share page into a JSON data file or a\n\
            paginated PDF.\n\n\
            Commands:\n  \
            - convert: Export a conversation (default command)\n  \
            - tokens:  Show how a markdown file is split into blocks\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            convo share.html --to json                  # Data export into the current directory\n  \
            convo share.html --to pdf -o exports        # Rendered document into exports/\n  \
            convo chat_1700000000000.json --to pdf      # Re-render an earlier data export\n  \
            convo share.html --to pdf --extra-page-size a4"
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a convo.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log progress to stderr (RUST_LOG takes precedence)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Export a conversation (default command)")
                .long_about(
                    "Export a conversation to a data file or a rendered document.\n\n\
                    Source formats:\n  \
                    - html: saved share page (.html, .htm)\n  \
                    - json: data file from an earlier export (.json)\n\n\
                    Target formats:\n  \
                    - json: { title, url, messages } data file\n  \
                    - pdf:  paginated document\n\n\
                    The source format is auto-detected from the file extension.\n\
                    The artifact is written into the output directory as {title}_{millis}.{ext}."
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Directory to write the artifact into (defaults to .)")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("url")
                        .long("url")
                        .help("Source address to record instead of the one found in the page")
                        .value_hint(ValueHint::Url),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the block tokens of a markdown file as JSON")
                .arg(
                    Arg::new("path")
                        .help("Path to the markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    // Try to parse args. If no subcommand is provided, inject "convert"
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && cleaned_args[1] != "convert"
                && cleaned_args[1] != "tokens"
                && cleaned_args[1] != "help"
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_tracing(matches.get_flag("verbose"));

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").expect("to is required");

            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => match FormatRegistry::default().detect_format_from_filename(input) {
                    Some(detected) => detected,
                    None => {
                        eprintln!("Error: Could not detect format from filename '{input}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }
                },
            };

            let output = sub_matches
                .get_one::<String>("output")
                .map(|s| s.as_str())
                .unwrap_or(".");
            let url = sub_matches.get_one::<String>("url").cloned();
            handle_convert_command(input, &from, to, output, url, &extra_params, &config);
        }
        Some(("tokens", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            handle_tokens_command(path);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: &str,
    url: Option<String>,
    extra_params: &HashMap<String, String>,
    config: &ConvoConfig,
) {
    let exporter = Exporter::new()
        .with_style(RenderStyle::from(&config.pdf.style))
        .with_page(PageGeometry::from(&config.pdf.page))
        .with_title_rules(TitleRules::from(&config.export));

    // Fail on an unavailable target before touching the input
    if let Err(e) = exporter.registry().get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    let parse_options = ParseOptions {
        selectors: ExtractSelectors::from(&config.extract),
        url,
    };
    debug!("Converting '{}' from {} to {}", input, from, to);

    let artifact = exporter
        .convert(&source, from, &parse_options, to, extra_params)
        .unwrap_or_else(|e| report_export_error(e));

    if let Err(e) = fs::create_dir_all(output) {
        eprintln!("Error creating output directory '{output}': {e}");
        std::process::exit(1);
    }
    let path = artifact
        .write_to(Path::new(output))
        .unwrap_or_else(|e| report_export_error(e));

    println!("{}", path.display());
}

fn report_export_error(error: ExportError) -> ! {
    match error {
        ExportError::ExtractionEmpty => eprintln!("No conversation data found."),
        other => eprintln!("Error: {other}"),
    }
    std::process::exit(1);
}

/// Handle the tokens command
fn handle_tokens_command(path: &str) {
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });

    let tokens = tokenize(&source);
    match serde_json::to_string_pretty(&tokens) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error encoding tokens: {e}");
            std::process::exit(1);
        }
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available formats:\n");
    for name in registry.list_formats() {
        let Ok(format) = registry.get(&name) else {
            continue;
        };
        let mut directions = Vec::new();
        if format.supports_parsing() {
            directions.push("from");
        }
        if format.supports_serialization() {
            directions.push("to");
        }
        println!(
            "  {:<6} {:<10} {}",
            name,
            directions.join("/"),
            format.description()
        );
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> ConvoConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };
    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(config: &mut ConvoConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("fallback-title") {
        config.export.fallback_title = raw;
    }

    if let Some(raw) = extra_params.remove("max-title-len") {
        config.export.max_title_len = raw.parse().unwrap_or_else(|_| {
            eprintln!("Invalid value '{raw}' for --extra-max-title-len");
            std::process::exit(1);
        });
    }
}
