use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the formats registered by convo-babel's FormatRegistry::with_defaults.
// Build scripts can't reach the library, so the names are repeated here.
const SOURCE_FORMATS: &[&str] = &["html", "json"];
const TARGET_FORMATS: &[&str] = &["json", "pdf"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("convo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Export conversation transcripts to JSON or PDF")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("convert")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_parser(clap::builder::PossibleValuesParser::new(SOURCE_FORMATS)),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(TARGET_FORMATS)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::DirPath),
                )
                .arg(Arg::new("url").long("url").value_hint(ValueHint::Url)),
        )
        .subcommand(
            Command::new("tokens").arg(
                Arg::new("path")
                    .required(true)
                    .index(1)
                    .value_hint(ValueHint::FilePath),
            ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "convo", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "convo", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "convo", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
