use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "e is for Errors. Runs a build command and collects its errors and warnings.", long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, short = 'c', help = "Read options and user patterns from a TOML file.")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Working directory of the build command (default: current directory).")]
    pub cwd: Option<PathBuf>,

    #[arg(long = "no-parse", help = "Log the output without classifying it.")]
    pub no_parse: bool,

    #[arg(
        long = "pattern",
        short = 'p',
        value_name = "LINE",
        help = "Extra user pattern as `language:group:type:regex` (repeatable)."
    )]
    pub patterns: Vec<String>,

    #[arg(
        long = "patterns-file",
        value_name = "FILE",
        help = "File with one `language:group:type:regex` pattern per line (repeatable)."
    )]
    pub pattern_files: Vec<PathBuf>,

    #[arg(long, short = 'q', help = "Do not echo the build output.")]
    pub quiet: bool,

    #[arg(long, short = 's', help = "Print the errors and warnings trees after the run.")]
    pub summary: bool,

    #[arg(long, help = "Print the errors and warnings trees as JSON after the run.")]
    pub json: bool,

    #[arg(long = "no-color", help = "Disable colored output.")]
    pub no_color: bool,

    #[arg(long = "list-patterns", help = "Print the effective pattern catalog and exit.")]
    pub list_patterns: bool,

    #[arg(long = "print-config", help = "Print the effective configuration as TOML and exit.")]
    pub print_config: bool,

    /// The build command and its arguments.
    #[arg(last = true)]
    pub command: Vec<String>,
}
