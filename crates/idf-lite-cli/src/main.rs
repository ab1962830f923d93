// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IDF-Lite command line
//!
//! ```bash
//! # Read, translate to the domain model and back, write the result
//! idf-lite roundtrip plant.idf -o plant.out.idf
//!
//! # Report validation findings at Final strictness
//! idf-lite validate plant.idf --strictness final
//!
//! # Write the airflow zones as a CONTAM project
//! idf-lite prj building.idf -o building.prj
//!
//! # Dump the bundled dictionary as JSON
//! idf-lite schema --json
//! ```
//!
//! Exit status is 0 on success (warnings allowed) and 1 on failure or bad
//! arguments. Warnings and errors go to stderr, one per line.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use idf_lite_model::{RecordReader, Result, SchemaRegistry, Strictness};
use idf_lite_parser::{
    bundled_schema, load_schema_file, schema_to_json, IdfParser, IdfWriter, PrjWriter,
};
use idf_lite_translator::{ForwardTranslator, LogMessage, ReverseTranslator, TranslationResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ============================================================================
// CLI DEFINITIONS
// ============================================================================

#[derive(Parser)]
#[command(name = "idf-lite", version)]
#[command(about = "Round-trip, validate and inspect EnergyPlus IDF files")]
struct Cli {
    /// IDD dictionary to use instead of the bundled one
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// Validation strictness: none, minimal, draft or final
    #[arg(long, global = true, default_value = "draft")]
    strictness: Strictness,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate an IDF file to the domain model and back
    Roundtrip {
        /// Input IDF file
        input: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate an IDF file against the schema
    Validate {
        /// Input IDF file
        input: PathBuf,
    },
    /// Write the airflow zones of an IDF file as a CONTAM project
    Prj {
        /// Input IDF file
        input: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the record types of the schema
    Schema {
        /// Full schema as JSON
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// COMMANDS
// ============================================================================

fn load_schema(path: Option<&Path>) -> Result<Arc<SchemaRegistry>> {
    match path {
        Some(path) => {
            log::info!("Loading schema from {}", path.display());
            load_schema_file(path)
        }
        None => bundled_schema(),
    }
}

fn report(warnings: &[LogMessage]) {
    for warning in warnings {
        eprintln!("{}", warning);
    }
}

/// Print diagnostics and the error of a failed run; returns the output
fn finish<T>(result: TranslationResult<T>) -> std::result::Result<T, i32> {
    report(&result.warnings);
    let code = result.exit_code();
    match (result.output, result.error) {
        (Some(output), None) => Ok(output),
        (_, Some(error)) => {
            eprintln!("error: {}", error);
            Err(code)
        }
        (None, None) => Err(code),
    }
}

fn emit(text: String, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{}", text),
    }
    Ok(())
}

fn roundtrip(
    schema: Arc<SchemaRegistry>,
    strictness: Strictness,
    input: &Path,
    output: Option<&Path>,
) -> Result<i32> {
    let content = std::fs::read_to_string(input)?;
    let collection = IdfParser::new(Arc::clone(&schema)).read(&content)?;

    let model = match finish(
        ReverseTranslator::new()
            .with_strictness(strictness)
            .translate_workspace(&collection),
    ) {
        Ok(model) => model,
        Err(code) => return Ok(code),
    };
    log::info!("Read {} records into {} objects", collection.len(), model.len());

    let records = match finish(
        ForwardTranslator::new(schema)
            .with_strictness(strictness)
            .translate_model(&model),
    ) {
        Ok(records) => records,
        Err(code) => return Ok(code),
    };

    emit(IdfWriter::new().write_collection(&records), output)?;
    Ok(0)
}

fn prj(schema: Arc<SchemaRegistry>, input: &Path, output: Option<&Path>) -> Result<i32> {
    let content = std::fs::read_to_string(input)?;
    let collection = IdfParser::new(schema).read(&content)?;
    emit(PrjWriter::new().write_collection(&collection), output)?;
    Ok(0)
}

fn validate(schema: Arc<SchemaRegistry>, strictness: Strictness, input: &Path) -> Result<i32> {
    let content = std::fs::read_to_string(input)?;
    let collection = IdfParser::new(schema).read(&content)?;
    let report = collection.validate(strictness);

    for violation in report.iter() {
        let level = if violation.is_error() { "error" } else { "warning" };
        eprintln!("{}: {}", level, violation);
    }
    log::info!(
        "{} records, {} findings at {}",
        collection.len(),
        report.len(),
        strictness
    );
    Ok(if report.is_valid() { 0 } else { 1 })
}

fn print_schema(schema: &SchemaRegistry, json: bool) -> Result<i32> {
    if json {
        println!("{}", schema_to_json(schema)?);
        return Ok(0);
    }
    if let Some(version) = schema.version() {
        println!("IDD version {}", version);
    }
    for spec in schema.types() {
        let extensible = match &spec.extensible {
            Some(group) => format!(", extensible group of {}", group.size()),
            None => String::new(),
        };
        println!("{} ({} fields{})", spec.name, spec.fields.len(), extensible);
    }
    Ok(0)
}

fn run(cli: Cli) -> Result<i32> {
    let schema = load_schema(cli.schema.as_deref())?;
    match cli.command {
        Commands::Roundtrip { input, output } => {
            roundtrip(schema, cli.strictness, &input, output.as_deref())
        }
        Commands::Validate { input } => validate(schema, cli.strictness, &input),
        Commands::Prj { input, output } => prj(schema, &input, output.as_deref()),
        Commands::Schema { json } => print_schema(&schema, json),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip_args() {
        let cli = Cli::try_parse_from([
            "idf-lite",
            "roundtrip",
            "in.idf",
            "-o",
            "out.idf",
            "--strictness",
            "final",
        ])
        .unwrap();
        assert_eq!(cli.strictness, Strictness::Final);
        match cli.command {
            Commands::Roundtrip { input, output } => {
                assert_eq!(input, PathBuf::from("in.idf"));
                assert_eq!(output, Some(PathBuf::from("out.idf")));
            }
            _ => panic!("expected roundtrip"),
        }
    }

    #[test]
    fn test_bad_arguments_rejected() {
        assert!(Cli::try_parse_from(["idf-lite", "validate"]).is_err());
        assert!(Cli::try_parse_from(["idf-lite", "schema", "--strictness", "strict"]).is_err());
        assert!(Cli::try_parse_from(["idf-lite", "frobnicate"]).is_err());
    }

    #[test]
    fn test_schema_listing() {
        let schema = bundled_schema().unwrap();
        assert_eq!(print_schema(&schema, false).unwrap(), 0);
        assert_eq!(print_schema(&schema, true).unwrap(), 0);
    }

    #[test]
    fn test_prj_from_idf_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("zones.idf");
        let output = dir.path().join("zones.prj");
        std::fs::write(&input, "Zone,\n  Core,\n  0,0,0,0,1,1,2.5,200.0,80.0;\n").unwrap();

        let code = prj(bundled_schema().unwrap(), &input, Some(&output)).unwrap();
        assert_eq!(code, 0);
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("1 ! zones:\n"));
        assert!(text.contains("1 3 0 0 0 1 0.0 200.0 293.15 0.0 Core -1 0 0 0 0 0 0\n"));

        let cli = Cli::try_parse_from(["idf-lite", "prj", "zones.idf", "-o", "zones.prj"]).unwrap();
        assert!(matches!(cli.command, Commands::Prj { .. }));
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let schema = bundled_schema().unwrap();
        let result = validate(schema, Strictness::Draft, Path::new("/nonexistent/input.idf"));
        assert!(result.is_err());
    }
}
