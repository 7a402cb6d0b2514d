use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use colored::{ColoredString, Colorize};
use confdiff_sdk::{
    detect_file_format, parse, read_document, validate_format, Change, ChangeType,
    CompareOptions, ComparisonReport, ComparisonResult, ConfDiff, FormattedDiff, Marker,
};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Compare(args) => cmd_compare(args, &cli.output),
        Command::Detect(args) => cmd_detect(args, &cli.output),
        Command::Validate(args) => cmd_validate(args, &cli.output),
    }
}

fn cmd_compare(args: CompareArgs, output: &OutputFormat) -> anyhow::Result<ExitCode> {
    let options = build_options(&args)?;
    let engine = ConfDiff::new(options);
    let comparison = engine.compare_files(&args.source, &args.target, args.format)?;
    let result = &comparison.result;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Text => {
            println!("{} {}", "---".red(), args.source.bold());
            println!("{} {}", "+++".green(), args.target.bold());
            println!("Format: {}\n", comparison.format.to_string().cyan());
            print_changes(result);
            if args.side_by_side {
                println!();
                for line in side_by_side(result.formatted_diff()) {
                    println!("{line}");
                }
            }
            println!("\n{}", summary_line(result));
        }
    }

    if let Some(path) = &args.export {
        let report = ComparisonReport::new(
            args.source.as_str(),
            args.target.as_str(),
            comparison.format,
            engine.options(),
            comparison.result.clone(),
        );
        report.write_to(path)?;
        if matches!(output, OutputFormat::Text) {
            println!("{} Report written to {}", "✓".green(), path.bold());
        }
    }

    Ok(if result.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn cmd_detect(args: DetectArgs, output: &OutputFormat) -> anyhow::Result<ExitCode> {
    let path = Path::new(&args.file);
    let content = read_document(path)?;
    let format = detect_file_format(&content, path);
    match output {
        OutputFormat::Json => println!("{}", serde_json::json!({"file": args.file, "format": format})),
        OutputFormat::Text => println!("{}: {}", args.file.bold(), format.to_string().cyan()),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(args: ValidateArgs, output: &OutputFormat) -> anyhow::Result<ExitCode> {
    let path = Path::new(&args.file);
    let content = read_document(path)?;
    let format = args.format.unwrap_or_else(|| detect_file_format(&content, path));
    let valid = validate_format(&content, format);
    let error = if valid {
        None
    } else {
        parse(&content, format).err().map(|e| e.to_string())
    };

    match output {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({"file": args.file, "format": format, "valid": valid, "error": error})
        ),
        OutputFormat::Text if valid => {
            println!("{} {} looks like valid {}", "✓".green().bold(), args.file.bold(), format)
        }
        OutputFormat::Text => {
            println!("{} {} is not valid {}", "✗".red().bold(), args.file.bold(), format);
            if let Some(error) = &error {
                println!("  {}", error.dimmed());
            }
        }
    }
    Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Options from `--config` (if any) with command-line flags layered on top.
fn build_options(args: &CompareArgs) -> anyhow::Result<CompareOptions> {
    let base = match &args.config {
        Some(path) => load_options(Path::new(path))?,
        None => CompareOptions::default(),
    };
    let mut options = base.with_ignore_keys(args.ignore_keys.iter().cloned());
    if args.lenient {
        options.strict = false;
    }
    debug!(?options, "comparison options");
    Ok(options)
}

fn load_options(path: &Path) -> anyhow::Result<CompareOptions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn print_changes(result: &ComparisonResult) {
    if result.is_empty() {
        println!("No changes.");
        return;
    }
    for change in result.diff() {
        println!("{}", paint_change(change));
    }
}

fn paint_change(change: &Change) -> ColoredString {
    let text = change.to_string();
    match change.change_type {
        ChangeType::Addition => text.green(),
        ChangeType::Deletion => text.red(),
        ChangeType::Modification => text.yellow(),
    }
}

fn summary_line(result: &ComparisonResult) -> String {
    let summary = result.summary();
    if summary.is_empty() {
        format!("{} {}", "✓".green().bold(), summary.describe())
    } else {
        format!("{} {}", "!".yellow().bold(), summary.describe())
    }
}

/// Lay the two annotated renderings out in columns, padding the shorter side.
fn side_by_side(diff: &FormattedDiff) -> Vec<String> {
    let width = diff.source.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let rows = diff.source.len().max(diff.target.len());
    (0..rows)
        .map(|i| {
            let left = diff.source.get(i).map(String::as_str).unwrap_or("");
            let right = diff.target.get(i).map(String::as_str).unwrap_or("");
            let padded = format!("{left:<width$}");
            format!("{} │ {}", paint_line(&padded), paint_line(right))
        })
        .collect()
}

fn paint_line(line: &str) -> ColoredString {
    match Marker::split(line).map(|(marker, _)| marker) {
        Some(Marker::Added) => line.green(),
        Some(Marker::Deleted) => line.red(),
        Some(Marker::Modified) => line.yellow(),
        _ => line.normal(),
    }
}
