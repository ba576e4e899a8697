mod registry;
mod workspace;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use casegen_generate::{
    CommandRunner, GenerationError, Generator, OutputOptions, PREVIEW_COUNT, solve_all,
    write_cases,
};
use casegen_template::{
    Template, TemplateError, TemplateStore, ValidationIssue, ValidationReport, read_template_file,
    template_json_schema, template_json_schema_value, validate_template,
    validate_template_semantics,
};
use clap::{Args, Parser, Subcommand};
use registry::{RunManifest, SolutionInfo, init_logging, new_run_id, write_manifest};
use serde_json::Value;
use thiserror::Error;
use workspace::{DEFAULT_CONFIG_FILE, load_or_create_settings};

const LOG_FILE: &str = "logs.ndjson";

#[derive(Debug, Error)]
enum CliError {
    #[error("workspace error: {0}")]
    Workspace(#[from] workspace::WorkspaceError),
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("template '{name}' failed validation")]
    Validation {
        name: String,
        report: ValidationReport,
    },
    #[error("template '{0}' failed validation")]
    ValidationFailed(String),
}

#[derive(Parser, Debug)]
#[command(name = "casegen", version, about = "Test-case data generator")]
struct Cli {
    /// Settings file, created with defaults when missing.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate data groups and write them as numbered case files.
    Generate(GenerateArgs),
    /// Print a few data groups without writing anything.
    Preview(PreviewArgs),
    /// Validate a template and trial-generate one group.
    Validate(ValidateArgs),
    /// Print the template JSON Schema.
    Schema,
    /// Manage stored templates.
    #[command(subcommand)]
    Templates(TemplatesCommand),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Template name or path to a template JSON file.
    #[arg(long, short = 't')]
    template: String,
    /// Number of data groups (defaults to the template, then settings).
    #[arg(long, short = 'n')]
    count: Option<usize>,
    /// Discard repeated groups.
    #[arg(long, default_value_t = false)]
    no_duplicate: bool,
    /// Seed for reproducible output; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Output directory.
    #[arg(long)]
    out: Option<PathBuf>,
    /// File name prefix for case files.
    #[arg(long)]
    prefix: Option<String>,
    /// Bundle the case files into a .tar.gz archive.
    #[arg(long, default_value_t = false)]
    archive: bool,
    /// Remove loose case files after archiving.
    #[arg(long, conflicts_with = "keep_temp")]
    delete_temp: bool,
    /// Keep loose case files after archiving.
    #[arg(long)]
    keep_temp: bool,
    /// Solution command; each group is fed on stdin and stdout becomes the .out file.
    #[arg(long, value_name = "CMD", num_args = 1.., allow_hyphen_values = true)]
    solution: Vec<String>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Template name or path to a template JSON file.
    #[arg(long, short = 't')]
    template: String,
    #[arg(long, short = 'n', default_value_t = PREVIEW_COUNT)]
    count: usize,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = false)]
    no_duplicate: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Template name or path to a template JSON file.
    #[arg(long, short = 't')]
    template: String,
    /// Treat warnings as errors.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum TemplatesCommand {
    /// List built-in and user templates.
    List,
    /// Print a template as JSON with a summary of its variables.
    Show { name: String },
    /// Store the template in FILE under NAME.
    Save {
        name: String,
        #[arg(long, value_name = "FILE")]
        from: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a user template.
    Delete { name: String },
    /// Validate a template file and add it to the store.
    Import {
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Write a stored template to PATH.
    Export { name: String, path: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let report = match &err {
                CliError::Validation { report, .. } => Some(report),
                CliError::Template(TemplateError::Invalid { report, .. }) => Some(report),
                _ => None,
            };
            if let Some(report) = report {
                print_report(report);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Generate(args) => run_generate(&cli.config, args),
        Command::Preview(args) => run_preview(&cli.config, args),
        Command::Validate(args) => run_validate(&cli.config, args),
        Command::Schema => {
            let json = serde_json::to_string_pretty(&template_json_schema())?;
            println!("{json}");
            Ok(())
        }
        Command::Templates(command) => run_templates(&cli.config, command),
    }
}

fn run_generate(config: &Path, args: GenerateArgs) -> Result<(), CliError> {
    let settings = load_or_create_settings(config)?;
    let output_dir = args.out.unwrap_or_else(|| settings.output_dir.clone());
    let log_file = settings.json_logs.then(|| output_dir.join(LOG_FILE));
    init_logging(log_file.as_deref())?;

    let store = TemplateStore::open(&settings.templates_dir)?;
    let template = resolve_template(&store, &args.template)?;
    check_template(&template)?;

    let count = args
        .count
        .or_else(|| template.count.and_then(|count| usize::try_from(count).ok()))
        .unwrap_or(settings.default_count);
    let no_duplicate =
        args.no_duplicate || template.no_duplicate.unwrap_or(settings.no_duplicate);
    let seed = args.seed.unwrap_or_else(random_seed);
    let run_id = new_run_id();
    let created_at = chrono::Utc::now().to_rfc3339();

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        template = %template.name,
        seed,
        count,
        no_duplicate
    );
    let timer = Instant::now();

    let mut generator = Generator::with_seed(seed);
    let outcome = generator.generate(&template.variables, count, no_duplicate)?;
    let summary = outcome.summary();
    if let Some(shortfall) = summary.shortfall {
        eprintln!(
            "warning: only {} unique group(s) could be generated out of {} requested",
            shortfall.produced, shortfall.requested
        );
    }

    let mut solution_info = None;
    let solutions = match args.solution.split_first() {
        Some((program, rest)) => {
            let runner = CommandRunner::new(program.as_str())
                .with_args(rest.iter().cloned())
                .with_timeout(settings.solution_timeout());
            let outputs = solve_all(&runner, &outcome.groups)?;
            tracing::info!(event = "solutions_computed", program = %program, cases = outputs.len());
            solution_info = Some(SolutionInfo {
                command: args.solution.clone(),
                timeout_ms: settings.solution_timeout_ms,
            });
            Some(outputs)
        }
        None => None,
    };

    let prefix = args.prefix.unwrap_or_else(|| settings.file_prefix.clone());
    let mut options = OutputOptions::new(output_dir.clone(), prefix);
    if args.archive || settings.archive {
        let delete_loose = if args.keep_temp {
            false
        } else {
            args.delete_temp || settings.delete_temp_files
        };
        options = options.with_archive(delete_loose);
    }
    let report = write_cases(&outcome.groups, solutions.as_deref(), &options)?;
    let case_count = report.case_count();
    let archive_path = report.archive.as_ref().map(|archive| archive.path.clone());

    let manifest = RunManifest::new(
        run_id.clone(),
        template.name.clone(),
        seed,
        no_duplicate,
        summary,
        output_dir.clone(),
        report,
        solution_info,
        created_at,
    );
    let manifest_path = write_manifest(&output_dir, &manifest)?;

    tracing::info!(
        event = "run_finished",
        run_id = %run_id,
        status = ?manifest.status,
        duration_ms = timer.elapsed().as_millis() as u64
    );

    println!(
        "wrote {case_count} case(s) to {} (seed {seed})",
        output_dir.display()
    );
    if let Some(path) = archive_path {
        println!("archive: {}", path.display());
    }
    println!("manifest: {}", manifest_path.display());
    Ok(())
}

fn run_preview(config: &Path, args: PreviewArgs) -> Result<(), CliError> {
    let settings = load_or_create_settings(config)?;
    init_logging(None)?;
    let store = TemplateStore::open(&settings.templates_dir)?;
    let template = resolve_template(&store, &args.template)?;
    check_template(&template)?;

    let mut generator = match args.seed {
        Some(seed) => Generator::with_seed(seed),
        None => Generator::new(),
    };
    let outcome = generator.generate(&template.variables, args.count, args.no_duplicate)?;

    println!("{}", template.describe());
    for (idx, group) in outcome.groups.iter().enumerate() {
        println!("\n# case {}", idx + 1);
        println!("{group}");
    }
    Ok(())
}

fn run_validate(config: &Path, args: ValidateArgs) -> Result<(), CliError> {
    let settings = load_or_create_settings(config)?;
    init_logging(None)?;
    let store = TemplateStore::open(&settings.templates_dir)?;
    let json = template_json(&store, &args.template)?;
    let schema = template_json_schema_value()?;

    let report = match validate_template(&json, &schema, args.strict) {
        Ok(validated) => {
            let mut report = ValidationReport {
                errors: Vec::new(),
                warnings: validated.warnings,
            };
            trial_generate(&validated.template, &mut report);
            report
        }
        Err(report) => report,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.is_ok() {
        if !args.json {
            println!("template is valid");
        }
        Ok(())
    } else {
        let name = json
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(args.template.as_str())
            .to_string();
        Err(CliError::ValidationFailed(name))
    }
}

fn run_templates(config: &Path, command: TemplatesCommand) -> Result<(), CliError> {
    let settings = load_or_create_settings(config)?;
    init_logging(None)?;
    let store = TemplateStore::open(&settings.templates_dir)?;

    match command {
        TemplatesCommand::List => {
            for entry in store.list()? {
                println!(
                    "{}\t{}\t{} variable(s)\t{}",
                    entry.template.name,
                    entry.origin.as_str(),
                    entry.template.variables.len(),
                    entry.template.description
                );
            }
        }
        TemplatesCommand::Show { name } => {
            let template = store.load(&name)?;
            println!("{}", serde_json::to_string_pretty(&template)?);
            println!("\n{}", template.describe());
        }
        TemplatesCommand::Save {
            name,
            from,
            description,
        } => {
            let mut template = read_template_file(&from)?;
            template.name = name;
            if let Some(description) = description {
                template.description = description;
            }
            let path = store.save(&template)?;
            println!("saved '{}' to {}", template.name, path.display());
        }
        TemplatesCommand::Delete { name } => {
            if store.delete(&name)? {
                println!("deleted '{name}'");
            } else {
                return Err(TemplateError::NotFound(name).into());
            }
        }
        TemplatesCommand::Import { path, strict } => {
            let (saved, validated) = store.import(&path, strict)?;
            print_issues(&validated.warnings);
            println!(
                "imported '{}' to {}",
                validated.template.name,
                saved.display()
            );
        }
        TemplatesCommand::Export { name, path } => {
            store.export(&name, &path)?;
            println!("exported '{name}' to {}", path.display());
        }
    }
    Ok(())
}

/// A path to an existing file wins over a stored template of the same name.
fn resolve_template(store: &TemplateStore, reference: &str) -> Result<Template, CliError> {
    let path = Path::new(reference);
    if path.is_file() {
        return Ok(read_template_file(path)?);
    }
    Ok(store.load(reference)?)
}

fn template_json(store: &TemplateStore, reference: &str) -> Result<Value, CliError> {
    let path = Path::new(reference);
    if path.is_file() {
        let content = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&content)?);
    }
    Ok(serde_json::to_value(store.load(reference)?)?)
}

/// Abort on template errors; log warnings and carry on.
fn check_template(template: &Template) -> Result<(), CliError> {
    let report = validate_template_semantics(template);
    for warning in &report.warnings {
        tracing::warn!(code = %warning.code, path = %warning.path, "{}", warning.message);
    }
    if report.is_ok() {
        Ok(())
    } else {
        Err(CliError::Validation {
            name: template.name.clone(),
            report,
        })
    }
}

/// Build one group to surface errors only generation can find, such as
/// custom-code syntax errors.
fn trial_generate(template: &Template, report: &mut ValidationReport) {
    let mut generator = Generator::with_seed(0);
    if let Err(err) = generator.build_group(&template.variables) {
        let path = match &err {
            GenerationError::Configuration { variable, .. } => template
                .variables
                .iter()
                .position(|spec| spec.name == *variable || spec.name.trim() == variable)
                .map(|idx| format!("/variables/{idx}"))
                .unwrap_or_else(|| "/variables".to_string()),
            _ => "/variables".to_string(),
        };
        report.push_error(ValidationIssue::error(
            "generation_failed",
            path,
            err.to_string(),
        ));
    }
}

fn print_report(report: &ValidationReport) {
    print_issues(&report.errors);
    print_issues(&report.warnings);
}

fn print_issues(issues: &[ValidationIssue]) {
    for issue in issues {
        eprintln!("- {issue}");
    }
}

fn random_seed() -> u64 {
    rand::random()
}
