//! Terminal entry point: walk a directory, audit it, write the report.

use std::env;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use lichen::{
    registry_from_config, run_audit, transform_to, walk_documents, AuditConfig, AuditSummary,
};

const USAGE: &str = "\
Usage: lichen [OPTIONS] <DIR>

Audit the files under <DIR> for license headers and write a report.

Options:
  -c, --config <FILE>       Audit configuration, YAML or JSON
  -t, --transform <NAME>    Report shape: xml, plain, missing-headers, unapproved
  -o, --output <FILE>       Write the report to FILE instead of stdout
      --catalog <FILE>      Extra license catalog, repeatable
      --threshold <N>       Tolerate up to N unapproved documents
      --window <N>          Header lines scanned per document
      --approve <FAMILY>    Approve a family category, repeatable
      --unapprove <FAMILY>  Unapprove a family category, repeatable
      --no-default-catalog  Use only the configured catalogs
  -h, --help                Print this help

The exit code is 0 when the run passes its threshold, 1 when it does not,
and 2 on any error.
";

struct Args {
    root: PathBuf,
    config: Option<PathBuf>,
    transform: Option<String>,
    output: Option<PathBuf>,
    catalogs: Vec<PathBuf>,
    threshold: Option<u64>,
    window: Option<usize>,
    approve: Vec<String>,
    unapprove: Vec<String>,
    no_default_catalog: bool,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Option<Args>, String> {
    let mut root = None;
    let mut config = None;
    let mut transform = None;
    let mut output = None;
    let mut catalogs = Vec::new();
    let mut threshold = None;
    let mut window = None;
    let mut approve = Vec::new();
    let mut unapprove = Vec::new();
    let mut no_default_catalog = false;

    let value = |flag: &str, next: Option<String>| next.ok_or_else(|| format!("{flag} needs a value"));
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-c" | "--config" => config = Some(PathBuf::from(value(&arg, raw.next())?)),
            "-t" | "--transform" => transform = Some(value(&arg, raw.next())?),
            "-o" | "--output" => output = Some(PathBuf::from(value(&arg, raw.next())?)),
            "--catalog" => catalogs.push(PathBuf::from(value(&arg, raw.next())?)),
            "--threshold" => {
                let n = value(&arg, raw.next())?;
                threshold = Some(n.parse().map_err(|_| format!("bad threshold `{n}`"))?);
            }
            "--window" => {
                let n = value(&arg, raw.next())?;
                window = Some(n.parse().map_err(|_| format!("bad window `{n}`"))?);
            }
            "--approve" => approve.push(value(&arg, raw.next())?),
            "--unapprove" => unapprove.push(value(&arg, raw.next())?),
            "--no-default-catalog" => no_default_catalog = true,
            flag if flag.starts_with('-') => return Err(format!("unknown option `{flag}`")),
            _ if root.is_none() => root = Some(PathBuf::from(arg)),
            _ => return Err("more than one directory given".to_string()),
        }
    }

    let root = root.ok_or_else(|| "no directory given".to_string())?;
    Ok(Some(Args {
        root,
        config,
        transform,
        output,
        catalogs,
        threshold,
        window,
        approve,
        unapprove,
        no_default_catalog,
    }))
}

/// Fold command-line overrides into the loaded (or default) configuration.
fn configure(args: &Args) -> Result<AuditConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => AuditConfig::from_file(path)?,
        None => AuditConfig::default(),
    };
    if let Some(transform) = &args.transform {
        config.transform = transform.clone();
        config.transform_kind()?;
    }
    if let Some(output) = &args.output {
        config.output = Some(output.clone());
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(window) = args.window {
        config.window = window;
    }
    config.approve.extend(args.approve.iter().cloned());
    config.unapprove.extend(args.unapprove.iter().cloned());
    config.catalogs.extend(args.catalogs.iter().cloned());
    if args.no_default_catalog {
        config.use_default_catalog = false;
    }
    Ok(config)
}

fn run(args: Args) -> Result<AuditSummary, Box<dyn Error>> {
    let config = configure(&args)?;
    let registry = registry_from_config(&config)?;
    let documents = walk_documents(&args.root)?;
    let kind = config.transform_kind()?;
    let summary = match &config.output {
        Some(path) => {
            let file = File::create(path)?;
            run_audit(&registry, &config.options(), documents, transform_to(kind, file))?
        }
        None => run_audit(
            &registry,
            &config.options(),
            documents,
            transform_to(kind, io::stdout()),
        )?,
    };
    Ok(summary)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(reason) => {
            eprintln!("lichen: {reason}");
            eprint!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(summary) => {
            eprintln!("lichen: {}", summary.verdict);
            if summary.verdict.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("lichen: {err}");
            ExitCode::from(2)
        }
    }
}
