use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the jaz binary.
#[derive(Parser, Debug)]
#[command(
    name = "jaz",
    version,
    about = "Static-semantic resolution for a Java-like language"
)]
pub struct CliArgs {
    /// Source files or directories to resolve. Directories are searched
    /// recursively for source files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Source roots consulted when a referenced type must be loaded on
    /// demand; may be given more than once, earlier roots win.
    #[arg(short = 's', long = "sourcepath")]
    pub sourcepath: Vec<PathBuf>,

    /// How far to resolve: 0 packages, 1 classes and inheritance, 2 names.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub pass: u8,

    /// Print each unit's regenerated source to stdout after resolution.
    #[arg(long)]
    pub emit: bool,

    /// Print each unit's declaration numbering as JSON (requires --pass 2).
    #[arg(long = "dump-decls")]
    pub dump_decls: bool,

    /// Report imports nothing in the unit uses (requires --pass 2).
    #[arg(long = "check-imports")]
    pub check_imports: bool,

    /// Disable colored diagnostic output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}
