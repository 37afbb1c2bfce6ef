use std::path::PathBuf;

use palc::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "plox", after_long_help = "Set RUST_LOG=debug to trace the interpreter's stages.")]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Run a .plox or .lox script
	File { path: PathBuf },
	/// Start an interactive prompt
	Repl,
}
