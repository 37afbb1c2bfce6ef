pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;

/// LoxError is the top-level error type for a plox session.
#[derive(thiserror::Error, Debug)]
pub enum LoxError {
	/// Internal interpreter error, should never happen
	#[error("InterpreterInternalError: {0}")]
	InternalError(#[from] anyhow::Error),
	/// Scanner errors encountered during scanning
	#[error("Generated {0} scanner errors")]
	ScannerErrors(usize),
	/// Parser errors encountered during parsing
	#[error("Generated {0} parser errors")]
	ParserErrors(usize),
	/// Resolver errors encountered during static analysis
	#[error("Generated {0} resolver errors")]
	ResolverErrors(usize),
	/// Runtime errors encountered during interpretation
	#[error("Runtime error: {0}")]
	Runtime(#[from] interpreter::RuntimeError),
	/// Script files must end in `.plox` or `.lox`
	#[error("Unsupported script extension '{0}', expected .plox or .lox")]
	UnsupportedExtension(String),
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl LoxError {
	/// Process exit code for the command line front end.
	pub fn exit_code(&self) -> i32 {
		match self {
			LoxError::ScannerErrors(_) | LoxError::ParserErrors(_) | LoxError::ResolverErrors(_) => 65,
			LoxError::Runtime(_) => 70,
			LoxError::Io(_) | LoxError::UnsupportedExtension(_) => 74,
			LoxError::InternalError(_) => 1,
		}
	}
}
