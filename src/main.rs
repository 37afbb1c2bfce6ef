use palc::Parser;
use plox::{LoxError, Plox, cli::*};

/// Native stack for the interpreter thread, enough for the deepest call
/// nesting plox allows.
const STACK_SIZE: usize = 256 << 20;

fn run(mode: Mode) -> Result<(), LoxError> {
	match mode {
		Mode::File { path } => Plox::new().run_file(&path),
		Mode::Repl => Plox::new().repl(true).run_prompt(),
	}
}

fn main() {
	env_logger::init();
	let mode = Cli::parse().mode;

	let result = std::thread::Builder::new()
		.name("plox".into())
		.stack_size(STACK_SIZE)
		.spawn(move || run(mode))
		.map_err(|e| LoxError::InternalError(anyhow::Error::new(e).context("Failed spawn interpreter thread")))
		.and_then(|handle| {
			handle.join().unwrap_or_else(|_| Err(LoxError::InternalError(anyhow::anyhow!("Interpreter thread panicked"))))
		});

	if let Err(e) = result {
		eprintln!("{e}");
		std::process::exit(e.exit_code());
	}
}
