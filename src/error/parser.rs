use crate::scanner::{Token, TokenType};

/// A syntax error, located at the token the parser choked on.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("line {line} at {location}: {type}")]
pub struct ParseError {
	pub line:     usize,
	/// `'lexeme'`, or `end` when the parser ran out of tokens.
	pub location: String,
	pub r#type:   ParseErrorType,
}

impl ParseError {
	pub fn new(token: &Token, r#type: ParseErrorType) -> Self {
		let location =
			if token.r#type == TokenType::Eof { "end".to_string() } else { format!("'{}'", token.lexeme) };
		Self { line: token.line, location, r#type }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorType {
	ExpectedExpression,
	/// The parser needed a specific token; the payload says which and where.
	Expected(&'static str),
	MissingLeftOperand,
	InvalidAssignmentTarget,
	TooManyArguments,
	TooManyParameters,
	OutsideLoop(&'static str),
}

impl std::fmt::Display for ParseErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ParseErrorType::*;
		match self {
			ExpectedExpression => write!(f, "Expected expression"),
			Expected(what) => write!(f, "Expected {what}"),
			MissingLeftOperand => write!(f, "Missing left-hand operand"),
			InvalidAssignmentTarget => write!(f, "Invalid assignment target"),
			TooManyArguments => write!(f, "Can't have more than 255 arguments"),
			TooManyParameters => write!(f, "Can't have more than 255 parameters"),
			OutsideLoop(keyword) => write!(f, "Can't use '{keyword}' outside of a loop"),
		}
	}
}
