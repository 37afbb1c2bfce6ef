use std::{fmt::Display, rc::Rc};

/// A token produced by the scanner
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub r#type:  TokenType,
	/// Exact slice of the source this token was scanned from.
	pub lexeme:  String,
	pub literal: Option<Literal>,
	pub line:    usize,
}

impl Token {
	pub fn new(r#type: TokenType, lexeme: impl Into<String>, literal: Option<Literal>, line: usize) -> Self {
		Self { r#type, lexeme: lexeme.into(), literal, line }
	}

	/// A token that never appeared in the source, e.g. the implicit `this` of a bound method.
	pub fn synthetic(r#type: TokenType, lexeme: &str, line: usize) -> Self { Self::new(r#type, lexeme, None, line) }
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.literal {
			Some(literal) => write!(f, "{:?} {} {literal}", self.r#type, self.lexeme),
			None => write!(f, "{:?} {}", self.r#type, self.lexeme),
		}
	}
}

/// The runtime value a literal token carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	Number(f64),
	Str(Rc<str>),
}

impl Display for Literal {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Literal::Number(n) => write!(f, "{n}"),
			Literal::Str(s) => write!(f, "{s}"),
		}
	}
}

/// The different types of tokens in plox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
	/// Left parenthesis `(`.
	LeftParen,
	/// Right parenthesis `)`.
	RightParen,
	/// Left brace `{`.
	LeftBrace,
	/// Right brace `}`.
	RightBrace,
	/// Left bracket `[`.
	LeftBracket,
	/// Right bracket `]`.
	RightBracket,
	/// Comma `,`.
	Comma,
	/// Question mark `?`.
	Question,
	/// Colon `:`.
	Colon,
	/// Dot `.`.
	Dot,
	/// Minus `-`.
	Minus,
	/// Plus `+`.
	Plus,
	/// Semicolon `;`.
	Semicolon,
	/// Slash `/`.
	Slash,
	/// Asterisk `*`.
	Star,
	/// Bang `!`.
	Bang,
	/// Bang equal `!=`.
	BangEqual,
	/// Equal `=`.
	Equal,
	/// Equal equal `==`.
	EqualEqual,
	/// Greater than `>`.
	Greater,
	/// Greater than or equal `>=`.
	GreaterEqual,
	/// Less than `<`.
	Less,
	/// Less than or equal `<=`.
	LessEqual,
	/// Identifier, e.g. variable or function name.
	Identifier,
	/// String literal, e.g. `"hello"`.
	String,
	/// Number literal, e.g. `123.45`.
	Number,
	And,
	Class,
	Else,
	False,
	Fun,
	For,
	If,
	Nil,
	Or,
	Print,
	Return,
	/// `parent` or its synonym `super`.
	Parent,
	This,
	True,
	Var,
	While,
	Break,
	Continue,
	/// End of file/input.
	Eof,
}

impl TokenType {
	pub fn keyword_or_identifier(value: &str) -> Self {
		match value {
			"and" => TokenType::And,
			"class" => TokenType::Class,
			"else" => TokenType::Else,
			"false" => TokenType::False,
			"for" => TokenType::For,
			"fun" => TokenType::Fun,
			"if" => TokenType::If,
			"nil" => TokenType::Nil,
			"or" => TokenType::Or,
			"print" => TokenType::Print,
			"return" => TokenType::Return,
			"super" | "parent" => TokenType::Parent,
			"this" => TokenType::This,
			"true" => TokenType::True,
			"var" => TokenType::Var,
			"while" => TokenType::While,
			"break" => TokenType::Break,
			"continue" => TokenType::Continue,
			_ => TokenType::Identifier,
		}
	}

	/// Tokens that open a statement; panic-mode recovery resumes in front of them.
	pub fn starts_statement(self) -> bool {
		use TokenType::*;
		matches!(self, Class | Fun | Var | For | If | While | Print | Return | Break | Continue)
	}
}
