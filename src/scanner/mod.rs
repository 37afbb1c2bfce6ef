//! Turns source text into a flat list of tokens.
//!
//! The scanner walks the source one character at a time, looking at most two
//! characters ahead. Single-character punctuation is emitted immediately,
//! `!`, `=`, `<` and `>` check the next character for their two-character
//! form, and `/` decides between division, a line comment and a (nestable)
//! block comment.
//!
//! We can’t easily detect a `reserved word` until we’ve reached the end of what
//! might instead be an identifier, this is `maximal munch`.
//!
//! Lexical errors never abort the scan: they are recorded and the scanner moves
//! on to the next character, so one stray `@` doesn't hide every other problem
//! in the file.
mod token;

use std::{iter::Peekable, rc::Rc, str::CharIndices};

use TokenType::*;
pub use token::*;

use crate::error::scanner::{ScanError, ScanErrorType};

/// A scanner for plox source code
pub struct Scanner<'a> {
	/// User input source code
	source:      &'a str,
	/// User input source code iterator
	source_iter: Peekable<CharIndices<'a>>,
	/// Points at the beginning of the current lexeme
	start:       usize,
	/// Points just past the character most recently consumed
	cursor:      usize,
	/// Tracks what source line `cursor` is on so we can produce tokens that know
	/// their location.
	line:        usize,
	tokens:      Vec<Token>,
	errors:      Vec<ScanError>,
}

impl<'a> Scanner<'a> {
	pub fn new(source: &'a str) -> Self {
		let source_iter = source.char_indices().peekable();

		Self { source, source_iter, start: 0, cursor: 0, line: 1, tokens: Vec::new(), errors: Vec::new() }
	}

	/// Scan all tokens from the source code. The result always ends with `Eof`;
	/// lexical errors are available from [`Scanner::errors`] afterwards.
	pub fn scan_tokens(&mut self) -> Vec<Token> {
		while let Some(&(index, _)) = self.source_iter.peek() {
			// We are at the beginning of the next lexeme.
			self.start = index;
			self.cursor = self.start;
			if let Err(e) = self.scan_token() {
				self.errors.push(e);
			}
		}
		self.tokens.push(Token::new(Eof, "", None, self.line));
		log::debug!("scanned {} tokens with {} errors", self.tokens.len(), self.errors.len());
		std::mem::take(&mut self.tokens)
	}

	/// Lexical errors found by the last scan, in source order.
	pub fn errors(&self) -> &[ScanError] { &self.errors }

	/// Scan a single token from the source code
	fn scan_token(&mut self) -> Result<(), ScanError> {
		let Some(next_char) = self.advance() else { return Ok(()) };
		#[rustfmt::skip]
		let r#type = match next_char {
			'(' => LeftParen,
			')' => RightParen,
			'{' => LeftBrace,
			'}' => RightBrace,
			'[' => LeftBracket,
			']' => RightBracket,
			',' => Comma,
			'?' => Question,
			':' => Colon,
			'.' => Dot,
			'-' => Minus,
			'+' => Plus,
			';' => Semicolon,
			'*' => Star,
			'!' => if self.match_next('=') { BangEqual } else { Bang },
			'=' => if self.match_next('=') { EqualEqual } else { Equal },
			'<' => if self.match_next('=') { LessEqual } else { Less },
			'>' => if self.match_next('=') { GreaterEqual } else { Greater },
			'/' => if self.match_next('/') {
				while self.peek().is_some_and(|c| c != '\n') { self.advance(); }
				return Ok(());
			} else if self.match_next('*') {
				return self.block_comment();
			} else { Slash },
			' ' | '\r' | '\t' => return Ok(()),
			'\n' => { self.line += 1; return Ok(()) }
			'"' => return self.string(),
			c if c.is_ascii_digit() => return self.number(),
			c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
			_ => return Err(ScanError::new(self.line, ScanErrorType::UnexpectedCharacter(next_char))),
		};

		self.add_token(r#type, None);
		Ok(())
	}

	fn add_token(&mut self, r#type: TokenType, literal: Option<Literal>) {
		let lexeme = &self.source[self.start..self.cursor];
		self.tokens.push(Token::new(r#type, lexeme, literal, self.line));
	}

	/// Match the next character if it is the expected one
	fn match_next(&mut self, expected: char) -> bool {
		matches!(self.peek(), Some(c) if c == expected && { self.advance(); true })
	}

	/// Advance to the next character
	fn advance(&mut self) -> Option<char> {
		let (i, c) = self.source_iter.next()?;
		self.cursor = i + c.len_utf8();
		Some(c)
	}

	/// Peek the current character
	fn peek(&mut self) -> Option<char> { self.source_iter.peek().map(|&(_, c)| c) }

	/// Skip a block comment; the opening `/*` is already consumed. Every
	/// nested `/*` needs its own `*/`.
	fn block_comment(&mut self) -> Result<(), ScanError> {
		let mut depth = 1usize;
		while let Some(c) = self.advance() {
			match c {
				'/' if self.peek() == Some('*') => {
					self.advance();
					depth += 1;
				}
				'*' if self.peek() == Some('/') => {
					self.advance();
					depth -= 1;
					if depth == 0 {
						return Ok(());
					}
				}
				'\n' => self.line += 1,
				_ => {}
			}
		}
		Err(ScanError::new(self.line, ScanErrorType::UnterminatedBlockComment))
	}

	/// Scan a string literal
	fn string(&mut self) -> Result<(), ScanError> {
		while let Some(c) = self.peek() {
			if c == '"' {
				break;
			}
			if c == '\n' {
				self.line += 1
			}
			self.advance();
		}

		self.peek().ok_or_else(|| ScanError::new(self.line, ScanErrorType::UnterminatedString))?;
		self.advance(); // The closing "
		let value: Rc<str> = self.source[self.start + 1..self.cursor - 1].into();
		self.add_token(String, Some(Literal::Str(value)));
		Ok(())
	}

	/// Scan a number literal
	fn number(&mut self) -> Result<(), ScanError> {
		while self.peek().is_some_and(|c| c.is_ascii_digit()) {
			self.advance();
		}

		// Look for a fractional part.
		if self.peek() == Some('.') {
			self.advance(); // consume '.'
			if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
				let text = self.source[self.start..self.cursor].to_string();
				return Err(ScanError::new(self.line, ScanErrorType::MalformedNumber(text)));
			}
			while self.peek().is_some_and(|c| c.is_ascii_digit()) {
				self.advance();
			}
		}

		let text = &self.source[self.start..self.cursor];
		// Only ASCII digits with at most one interior '.' reach here.
		let value = text.parse().unwrap_or_default();
		self.add_token(Number, Some(Literal::Number(value)));
		Ok(())
	}

	/// Scan an identifier or keyword
	fn identifier(&mut self) -> TokenType {
		while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
			self.advance();
		}
		let text = &self.source[self.start..self.cursor];
		TokenType::keyword_or_identifier(text)
	}
}
