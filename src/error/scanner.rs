/// A specific scanning error with line number and type.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("line {line}: {type}")]
pub struct ScanError {
	/// The line number where the error occurred.
	pub line:   usize,
	/// The type of scanning error.
	pub r#type: ScanErrorType,
}

impl ScanError {
	pub fn new(line: usize, r#type: ScanErrorType) -> Self { Self { line, r#type } }
}

/// Types of scanning errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanErrorType {
	/// Error for unterminated block comments.
	UnterminatedBlockComment,
	/// Error for unexpected characters.
	UnexpectedCharacter(char),
	/// Error for unterminated strings.
	UnterminatedString,
	/// A number with a trailing `.` and no fractional digits.
	MalformedNumber(String),
}

impl std::fmt::Display for ScanErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ScanErrorType::*;
		match self {
			UnterminatedBlockComment => {
				write!(f, "Unterminated block comment")
			}
			UnexpectedCharacter(c) => {
				write!(f, "Unexpected character '{c}'")
			}
			UnterminatedString => {
				write!(f, "Unterminated string")
			}
			MalformedNumber(n) => {
				write!(f, "Number value format is incorrect: '{n}'")
			}
		}
	}
}
