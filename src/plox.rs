use std::{
	ffi::OsStr,
	fmt::Display,
	fs::read_to_string,
	io::{BufRead, Write},
	path::Path,
};

use anyhow::Context;

use crate::{
	LoxError,
	interpreter::Interpreter,
	parser::Parser,
	resolver::Resolver,
	scanner::Scanner,
};

/// Extensions `run_file` accepts.
const EXTENSIONS: [&str; 2] = ["plox", "lox"];

/// A plox session: one interpreter whose globals live across every
/// [`Plox::run`], plus the sink diagnostics are reported to.
pub struct Plox {
	interpreter: Interpreter,
	/// Scanner, parser and resolver diagnostics, one per line.
	reporter:    Box<dyn Write>,
	repl:        bool,
}

impl Default for Plox {
	fn default() -> Self { Self::new() }
}

impl Plox {
	/// A session printing to stdout and reporting to stderr.
	pub fn new() -> Self { Self { interpreter: Interpreter::new(), reporter: Box::new(std::io::stderr()), repl: false } }

	/// Send `print` output somewhere else. Call before running anything:
	/// the session starts over with fresh globals.
	pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
		self.interpreter = Interpreter::with_output(output);
		self.interpreter.set_repl(self.repl);
		self
	}

	pub fn with_reporter(mut self, reporter: Box<dyn Write>) -> Self {
		self.reporter = reporter;
		self
	}

	/// Echo the value of bare expression statements.
	pub fn repl(mut self, repl: bool) -> Self {
		self.repl = repl;
		self.interpreter.set_repl(repl);
		self
	}

	/// The interpreter behind this session, e.g. to register natives.
	pub fn interpreter(&mut self) -> &mut Interpreter { &mut self.interpreter }

	/// Run a `.plox` or `.lox` script.
	pub fn run_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoxError> {
		let path = path.as_ref();
		match path.extension().and_then(OsStr::to_str) {
			Some(extension) if EXTENSIONS.contains(&extension) => {}
			other => return Err(LoxError::UnsupportedExtension(other.unwrap_or_default().to_string())),
		}
		log::debug!("running {}", path.display());
		let source = read_to_string(path)?;
		self.run(&source)
	}

	/// Read-eval-print loop over stdin.
	pub fn run_prompt(&mut self) -> Result<(), LoxError> {
		let stdin = std::io::stdin();
		self.run_lines(stdin.lock())
	}

	/// Run every line of `input` as its own program until end of input.
	/// Errors are reported and the loop carries on with the next line.
	pub fn run_lines(&mut self, mut input: impl BufRead) -> Result<(), LoxError> {
		let mut line = String::new();
		loop {
			line.clear();
			self.interpreter.write_prompt("> ").context("Failed write prompt")?;
			if input.read_line(&mut line).context("Failed read line")? == 0 {
				writeln!(self.reporter, "\nExited plox repl")?;
				return Ok(());
			}
			match self.run(line.trim()) {
				Ok(()) => {}
				Err(LoxError::Runtime(e)) => writeln!(self.reporter, "Runtime error: {e}")?,
				// Stage diagnostics have already been reported.
				Err(LoxError::ScannerErrors(_) | LoxError::ParserErrors(_) | LoxError::ResolverErrors(_)) => {}
				Err(e) => return Err(e),
			}
		}
	}

	/// Scan, parse, resolve and run `source`. Nothing is executed unless
	/// the earlier stages found no problem.
	pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
		let mut scanner = Scanner::new(source);
		let tokens = scanner.scan_tokens();
		if !scanner.errors().is_empty() {
			self.report("Lexical", scanner.errors())?;
			return Err(LoxError::ScannerErrors(scanner.errors().len()));
		}

		let mut parser = Parser::new(tokens);
		let statements = parser.parse();
		log::debug!("parsed {} statements", statements.len());
		if !parser.errors().is_empty() {
			self.report("Syntax", parser.errors())?;
			return Err(LoxError::ParserErrors(parser.errors().len()));
		}

		let mut resolver = Resolver::new(self.interpreter.global_names());
		match resolver.resolve(&statements) {
			Ok(locals) => self.interpreter.add_locals(locals),
			Err(errors) => {
				self.report("Semantic", &errors)?;
				return Err(LoxError::ResolverErrors(errors.len()));
			}
		}

		self.interpreter.interpret(&statements)?;
		Ok(())
	}

	fn report(&mut self, kind: &str, errors: &[impl Display]) -> Result<(), LoxError> {
		for error in errors {
			writeln!(self.reporter, "{kind} error: {error}")?;
		}
		Ok(())
	}
}
