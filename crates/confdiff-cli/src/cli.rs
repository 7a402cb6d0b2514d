use clap::{Args, Parser, Subcommand};
use confdiff_sdk::Format;

#[derive(Parser)]
#[command(
    name = "confdiff",
    about = "Structural diff for JSON, XML, and YAML configuration files",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two configuration files
    Compare(CompareArgs),
    /// Print the detected format of a file
    Detect(DetectArgs),
    /// Check whether a file looks like valid JSON, XML, or YAML
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    pub source: String,
    pub target: String,
    /// Document format (json, xml, yaml); detected per file when omitted
    #[arg(long)]
    pub format: Option<Format>,
    /// Key name or dotted path to skip; repeatable
    #[arg(short = 'i', long = "ignore-key")]
    pub ignore_keys: Vec<String>,
    /// Compare strings case- and whitespace-insensitively
    #[arg(long)]
    pub lenient: bool,
    /// TOML file with comparison options
    #[arg(long)]
    pub config: Option<String>,
    /// Show both renderings in two columns
    #[arg(long)]
    pub side_by_side: bool,
    /// Write a JSON report to this path
    #[arg(long)]
    pub export: Option<String>,
}

#[derive(Args)]
pub struct DetectArgs {
    pub file: String,
}

#[derive(Args)]
pub struct ValidateArgs {
    pub file: String,
    #[arg(long)]
    pub format: Option<Format>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_compare() {
        let cli = Cli::try_parse_from(["confdiff", "compare", "a.json", "b.json"]).unwrap();
        if let Command::Compare(args) = cli.command {
            assert_eq!(args.source, "a.json");
            assert_eq!(args.target, "b.json");
            assert!(args.format.is_none());
            assert!(!args.lenient);
            assert!(!args.side_by_side);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_compare_options() {
        let cli = Cli::try_parse_from([
            "confdiff", "compare", "a", "b",
            "--format", "yml",
            "--ignore-key", "timestamp",
            "-i", "meta.id",
            "--lenient",
            "--config", "confdiff.toml",
            "--side-by-side",
            "--export", "report.json",
        ])
        .unwrap();
        if let Command::Compare(args) = cli.command {
            assert_eq!(args.format, Some(Format::Yaml));
            assert_eq!(args.ignore_keys, vec!["timestamp", "meta.id"]);
            assert!(args.lenient);
            assert_eq!(args.config.as_deref(), Some("confdiff.toml"));
            assert!(args.side_by_side);
            assert_eq!(args.export.as_deref(), Some("report.json"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_unknown_format_fails() {
        assert!(Cli::try_parse_from(["confdiff", "compare", "a", "b", "--format", "ini"]).is_err());
    }

    #[test]
    fn parse_compare_requires_two_files() {
        assert!(Cli::try_parse_from(["confdiff", "compare", "a"]).is_err());
    }

    #[test]
    fn parse_detect() {
        let cli = Cli::try_parse_from(["confdiff", "detect", "app.yaml"]).unwrap();
        assert!(matches!(cli.command, Command::Detect(ref args) if args.file == "app.yaml"));
    }

    #[test]
    fn parse_validate() {
        let cli = Cli::try_parse_from(["confdiff", "validate", "x", "--format", "xml"]).unwrap();
        if let Command::Validate(args) = cli.command {
            assert_eq!(args.format, Some(Format::Xml));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["confdiff", "--verbose", "detect", "f"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_output() {
        let cli = Cli::try_parse_from(["confdiff", "compare", "a", "b", "--output", "json"]).unwrap();
        assert!(matches!(cli.output, OutputFormat::Json));
    }
}
