//! Recursive-descent parser turning tokens into statements.
//!
//! |Name|Operators|Associates
//! --|--|--
//! Assignment|=|Right
//! Conditional|?:|Right
//! Or|or|Left
//! And|and|Left
//! Equality|== !=|Left
//! Comparison|< > <= >=|Left
//! Term|+ -|Left
//! Factor|* /|Left
//! Unary|! -|Right
//!
//! Grammar:
//!
//! ``` BNF
//! program        → declaration* EOF ;
//! declaration    → classDecl | funDecl | varDecl | statement ;
//! classDecl      → "class" IDENTIFIER ( ( ":" | "<" ) IDENTIFIER )? "{" method* "}" ;
//! funDecl        → "fun" IDENTIFIER function ;
//! method         → IDENTIFIER function ;
//! function       → "(" parameters? ")" block ;
//! varDecl        → "var" IDENTIFIER ( "=" expression )? ";" ;
//! statement      → exprStmt | forStmt | ifStmt | printStmt | returnStmt | whileStmt
//!                | breakStmt | continueStmt | block | ";" ;
//! expression     → assignment ;
//! assignment     → ( call "." )? IDENTIFIER "=" assignment | conditional ;
//! conditional    → logic_or ( "?" expression ":" conditional )? ;
//! logic_or       → logic_and ( "or" logic_and )* ;
//! logic_and      → equality ( "and" equality )* ;
//! equality       → comparison ( ( "!=" | "==" ) comparison )* ;
//! comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
//! term           → factor ( ( "-" | "+" ) factor )* ;
//! factor         → unary ( ( "/" | "*" ) unary )* ;
//! unary          → ( "!" | "-" ) unary | call ;
//! call           → primary ( "(" arguments? ")" | "." IDENTIFIER | "[" expression "]" )* ;
//! primary        → NUMBER | STRING | "true" | "false" | "nil" | "this" | IDENTIFIER
//!                | "parent" "." IDENTIFIER | "(" expression ")" | "fun" function
//!                | "[" ( expression ( "," expression )* )? "]" ;
//! ```
//!
//! On a syntax error the parser records it, then discards tokens until a
//! statement boundary and carries on, so one malformed statement yields one
//! error instead of a cascade.

pub mod expression;

use TokenType::*;

use crate::{
	error::parser::{ParseError, ParseErrorType},
	parser::expression::{Expression, FunctionExpression, FunctionKind, LiteralValue},
	scanner::{Literal, Token, TokenType},
	statement::{Method, Statement},
};

/// Upper bound on call arguments and function parameters.
const MAX_ARGUMENTS: usize = 255;

/// Recursive-descent parser over a scanned token list.
pub struct Parser {
	/// The tokens to parse, terminated by `Eof`.
	tokens:     Vec<Token>,
	current:    usize,
	/// How many loops enclose the statement being parsed, reset inside function bodies.
	loop_depth: usize,
	errors:     Vec<ParseError>,
}

impl Parser {
	pub fn new(mut tokens: Vec<Token>) -> Self {
		if tokens.last().is_none_or(|t| t.r#type != Eof) {
			let line = tokens.last().map_or(1, |t| t.line);
			tokens.push(Token::new(Eof, "", None, line));
		}
		Self { tokens, current: 0, loop_depth: 0, errors: Vec::new() }
	}

	/// Parse the whole token list. Statements that failed to parse are left
	/// out; check [`Parser::errors`] before executing the result.
	pub fn parse(&mut self) -> Vec<Statement> {
		let mut statements = Vec::new();
		while !self.is_at_end() {
			if let Some(statement) = self.declaration() {
				statements.push(statement);
			}
		}
		log::debug!("parsed {} statements with {} errors", statements.len(), self.errors.len());
		statements
	}

	/// Syntax errors found so far, in source order.
	pub fn errors(&self) -> &[ParseError] { &self.errors }

	fn declaration(&mut self) -> Option<Statement> {
		let result = if self.match_any(&[Class]) {
			self.class_declaration()
		} else if self.check(Fun) && self.check_next(Identifier) {
			self.advance();
			self.function_declaration()
		} else if self.match_any(&[Var]) {
			self.var_declaration()
		} else {
			self.statement()
		};
		match result {
			Ok(statement) => Some(statement),
			// Already recorded where it was raised.
			Err(_) => {
				self.synchronize();
				None
			}
		}
	}

	fn class_declaration(&mut self) -> Result<Statement, ParseError> {
		let name = self.consume(Identifier, "class name")?;
		let parent = if self.match_any(&[Colon, Less]) {
			let parent_name = self.consume(Identifier, "parent class name")?;
			Some(*Expression::variable(parent_name))
		} else {
			None
		};
		self.consume(LeftBrace, "'{' before class body")?;

		let mut methods = Vec::new();
		while !self.check(RightBrace) && !self.is_at_end() {
			let name = self.consume(Identifier, "method name")?;
			let function = self.function_body(FunctionKind::Method)?;
			methods.push(Method { name, function });
		}
		self.consume(RightBrace, "'}' after class body")?;

		Ok(Statement::Class { name, parent, methods })
	}

	fn function_declaration(&mut self) -> Result<Statement, ParseError> {
		let name = self.consume(Identifier, "function name")?;
		let function = self.function_body(FunctionKind::Function)?;
		Ok(Statement::Function { name, function })
	}

	/// Parameter list and body of a named function, method or lambda.
	fn function_body(&mut self, kind: FunctionKind) -> Result<FunctionExpression, ParseError> {
		self.consume(LeftParen, "'(' before parameters")?;
		let mut params = Vec::new();
		if !self.check(RightParen) {
			loop {
				if params.len() == MAX_ARGUMENTS {
					let token = self.peek().clone();
					self.error(&token, ParseErrorType::TooManyParameters);
				}
				params.push(self.consume(Identifier, "parameter name")?);
				if !self.match_any(&[Comma]) {
					break;
				}
			}
		}
		self.consume(RightParen, "')' after parameters")?;
		self.consume(LeftBrace, "'{' before function body")?;

		// `break` inside a function body never refers to a loop around the function.
		let enclosing_loops = std::mem::take(&mut self.loop_depth);
		let body = self.block();
		self.loop_depth = enclosing_loops;

		Ok(FunctionExpression { params: params.into(), body: body?.into(), kind })
	}

	fn var_declaration(&mut self) -> Result<Statement, ParseError> {
		let name = self.consume(Identifier, "variable name")?;
		let initializer = if self.match_any(&[Equal]) { Some(*self.expression()?) } else { None };
		self.consume(Semicolon, "';' after variable declaration")?;
		Ok(Statement::Var { name, initializer })
	}

	fn statement(&mut self) -> Result<Statement, ParseError> {
		match self.peek().r#type {
			For => {
				self.advance();
				self.for_statement()
			}
			If => {
				self.advance();
				self.if_statement()
			}
			Print => {
				let keyword = self.advance();
				let expression = *self.expression()?;
				self.consume(Semicolon, "';' after value")?;
				Ok(Statement::Print { keyword, expression })
			}
			Return => {
				let keyword = self.advance();
				let value = if self.check(Semicolon) { None } else { Some(*self.expression()?) };
				self.consume(Semicolon, "';' after return value")?;
				Ok(Statement::Return { keyword, value })
			}
			While => {
				self.advance();
				self.while_statement()
			}
			Break => {
				let keyword = self.loop_control("break")?;
				Ok(Statement::Break(keyword))
			}
			Continue => {
				let keyword = self.loop_control("continue")?;
				Ok(Statement::Continue(keyword))
			}
			LeftBrace => {
				self.advance();
				Ok(Statement::Block(self.block()?))
			}
			Semicolon => {
				self.advance();
				Ok(Statement::Empty)
			}
			_ => {
				let expression = *self.expression()?;
				self.consume(Semicolon, "';' after expression")?;
				Ok(Statement::Expression(expression))
			}
		}
	}

	/// `break;` or `continue;`, which only make sense inside a loop.
	fn loop_control(&mut self, keyword_name: &'static str) -> Result<Token, ParseError> {
		let keyword = self.advance();
		if self.loop_depth == 0 {
			self.error(&keyword, ParseErrorType::OutsideLoop(keyword_name));
		}
		self.consume(Semicolon, "';' after loop control")?;
		Ok(keyword)
	}

	/// Parse a loop body with the loop nesting counter raised.
	fn loop_body(&mut self) -> Result<Statement, ParseError> {
		self.loop_depth += 1;
		let body = self.statement();
		self.loop_depth -= 1;
		body
	}

	/// `for` has no node of its own: it becomes an optional initializer and a
	/// `while` carrying the increment, wrapped in a block.
	fn for_statement(&mut self) -> Result<Statement, ParseError> {
		self.consume(LeftParen, "'(' after 'for'")?;
		let initializer = if self.match_any(&[Semicolon]) {
			None
		} else if self.match_any(&[Var]) {
			Some(self.var_declaration()?)
		} else {
			let expression = *self.expression()?;
			self.consume(Semicolon, "';' after loop initializer")?;
			Some(Statement::Expression(expression))
		};
		let condition = if self.check(Semicolon) { None } else { Some(*self.expression()?) };
		self.consume(Semicolon, "';' after loop condition")?;
		let increment = if self.check(RightParen) { None } else { Some(*self.expression()?) };
		self.consume(RightParen, "')' after for clauses")?;

		let body = self.loop_body()?;
		let condition = condition.unwrap_or(Expression::Literal(LiteralValue::Boolean(true)));
		let loop_statement = Statement::While { condition, body: Box::new(body), increment };

		Ok(match initializer {
			Some(initializer) => Statement::Block(vec![initializer, loop_statement]),
			None => loop_statement,
		})
	}

	fn if_statement(&mut self) -> Result<Statement, ParseError> {
		self.consume(LeftParen, "'(' after 'if'")?;
		let condition = *self.expression()?;
		self.consume(RightParen, "')' after if condition")?;
		let then_branch = Box::new(self.statement()?);
		let else_branch = if self.match_any(&[Else]) { Some(Box::new(self.statement()?)) } else { None };
		Ok(Statement::If { condition, then_branch, else_branch })
	}

	fn while_statement(&mut self) -> Result<Statement, ParseError> {
		self.consume(LeftParen, "'(' after 'while'")?;
		let condition = *self.expression()?;
		self.consume(RightParen, "')' after condition")?;
		let body = Box::new(self.loop_body()?);
		Ok(Statement::While { condition, body, increment: None })
	}

	/// The statements of a block; the opening `{` is already consumed.
	fn block(&mut self) -> Result<Vec<Statement>, ParseError> {
		let mut statements = Vec::new();
		while !self.check(RightBrace) && !self.is_at_end() {
			if let Some(statement) = self.declaration() {
				statements.push(statement);
			}
		}
		self.consume(RightBrace, "'}' after block")?;
		Ok(statements)
	}

	fn expression(&mut self) -> Result<Box<Expression>, ParseError> { self.assignment() }

	fn assignment(&mut self) -> Result<Box<Expression>, ParseError> {
		let expression = self.conditional()?;
		if !self.match_any(&[Equal]) {
			return Ok(expression);
		}
		let equals = self.previous().clone();
		let value = self.assignment()?;
		match *expression {
			Expression::Variable { name, .. } => Ok(Expression::assign(name, value)),
			Expression::Get { object, name } => Ok(Expression::set(object, name, value)),
			target => {
				// Not worth a resynchronisation: the parser is still in a sane state.
				self.error(&equals, ParseErrorType::InvalidAssignmentTarget);
				Ok(Box::new(target))
			}
		}
	}

	fn conditional(&mut self) -> Result<Box<Expression>, ParseError> {
		let condition = self.or()?;
		if self.match_any(&[Question]) {
			let then_branch = self.expression()?;
			self.consume(Colon, "':' after then branch of conditional expression")?;
			let else_branch = self.conditional()?;
			return Ok(Expression::conditional(condition, then_branch, else_branch));
		}
		Ok(condition)
	}

	fn or(&mut self) -> Result<Box<Expression>, ParseError> {
		let mut expression = self.and()?;
		while self.match_any(&[Or]) {
			let operator = self.previous().clone();
			expression = Expression::logical(expression, operator, self.and()?);
		}
		Ok(expression)
	}

	fn and(&mut self) -> Result<Box<Expression>, ParseError> {
		let mut expression = self.equality()?;
		while self.match_any(&[And]) {
			let operator = self.previous().clone();
			expression = Expression::logical(expression, operator, self.equality()?);
		}
		Ok(expression)
	}

	/// Parse equality expressions.
	fn equality(&mut self) -> Result<Box<Expression>, ParseError> {
		let mut expression = self.comparison()?;
		while self.match_any(&[BangEqual, EqualEqual]) {
			let operator = self.previous().clone();
			expression = Expression::binary(expression, operator, self.comparison()?);
		}
		Ok(expression)
	}

	/// Parse comparison expressions.
	fn comparison(&mut self) -> Result<Box<Expression>, ParseError> {
		let mut expression = self.term()?;
		while self.match_any(&[Greater, GreaterEqual, Less, LessEqual]) {
			let operator = self.previous().clone();
			expression = Expression::binary(expression, operator, self.term()?);
		}
		Ok(expression)
	}

	/// Parse term expressions.
	fn term(&mut self) -> Result<Box<Expression>, ParseError> {
		let mut expression = self.factor()?;
		while self.match_any(&[Minus, Plus]) {
			let operator = self.previous().clone();
			expression = Expression::binary(expression, operator, self.factor()?);
		}
		Ok(expression)
	}

	/// Parse factor expressions.
	fn factor(&mut self) -> Result<Box<Expression>, ParseError> {
		let mut expression = self.unary()?;
		while self.match_any(&[Slash, Star]) {
			let operator = self.previous().clone();
			expression = Expression::binary(expression, operator, self.unary()?);
		}
		Ok(expression)
	}

	/// Parse unary expressions.
	fn unary(&mut self) -> Result<Box<Expression>, ParseError> {
		if self.match_any(&[Bang, Minus]) {
			let operator = self.previous().clone();
			return Ok(Expression::unary(operator, self.unary()?));
		}
		self.call()
	}

	/// Calls, property reads and subscripts chain left to right: `a()(b).c[0]`.
	fn call(&mut self) -> Result<Box<Expression>, ParseError> {
		let mut expression = self.primary()?;
		loop {
			if self.match_any(&[LeftParen]) {
				expression = self.finish_call(expression)?;
			} else if self.match_any(&[Dot]) {
				let name = self.consume(Identifier, "property name after '.'")?;
				expression = Expression::get(expression, name);
			} else if self.match_any(&[LeftBracket]) {
				let bracket = self.previous().clone();
				let index = self.expression()?;
				self.consume(RightBracket, "']' after index")?;
				expression = Expression::subscript(expression, bracket, index);
			} else {
				break;
			}
		}
		Ok(expression)
	}

	fn finish_call(&mut self, callee: Box<Expression>) -> Result<Box<Expression>, ParseError> {
		let mut arguments = Vec::new();
		if !self.check(RightParen) {
			loop {
				if arguments.len() == MAX_ARGUMENTS {
					let token = self.peek().clone();
					self.error(&token, ParseErrorType::TooManyArguments);
				}
				arguments.push(*self.expression()?);
				if !self.match_any(&[Comma]) {
					break;
				}
			}
		}
		let paren = self.consume(RightParen, "')' after arguments")?;
		Ok(Expression::call(callee, paren, arguments))
	}

	/// Parse primary expressions.
	fn primary(&mut self) -> Result<Box<Expression>, ParseError> {
		let token = self.advance();
		let expression = match token.r#type {
			False => Expression::Literal(LiteralValue::Boolean(false)),
			True => Expression::Literal(LiteralValue::Boolean(true)),
			Nil => Expression::Literal(LiteralValue::Nil),
			Number | String => Expression::Literal(match token.literal {
				Some(Literal::Number(n)) => LiteralValue::Number(n),
				Some(Literal::Str(s)) => LiteralValue::Str(s),
				None => LiteralValue::Nil,
			}),
			This => return Ok(Expression::this(token)),
			Parent => {
				self.consume(Dot, "'.' after 'parent'")?;
				let method = self.consume(Identifier, "parent class method name")?;
				return Ok(Expression::parent(token, method));
			}
			Identifier => return Ok(Expression::variable(token)),
			LeftParen => {
				let expression = self.expression()?;
				self.consume(RightParen, "')' after expression")?;
				return Ok(Expression::grouping(expression));
			}
			Fun => Expression::Function(self.function_body(FunctionKind::Function)?),
			LeftBracket => {
				let mut elements = Vec::new();
				if !self.check(RightBracket) {
					loop {
						elements.push(*self.expression()?);
						if !self.match_any(&[Comma]) {
							break;
						}
					}
				}
				self.consume(RightBracket, "']' after list elements")?;
				return Ok(Expression::list(token, elements));
			}
			// A binary operator with nothing on its left. Swallow the right-hand
			// operand so the error is reported once.
			BangEqual | EqualEqual | Greater | GreaterEqual | Less | LessEqual | Plus | Star | Slash => {
				let error = self.error(&token, ParseErrorType::MissingLeftOperand);
				self.expression()?;
				return Err(error);
			}
			_ => {
				// Leave the offending token for the resynchronisation to look at.
				if token.r#type != Eof {
					self.current -= 1;
				}
				return Err(self.error(&token, ParseErrorType::ExpectedExpression));
			}
		};
		Ok(Box::new(expression))
	}

	/// Consume and return the current token. `Eof` is never consumed.
	fn advance(&mut self) -> Token {
		if !self.is_at_end() {
			self.current += 1;
			return self.previous().clone();
		}
		self.peek().clone()
	}

	fn match_any(&mut self, types: &[TokenType]) -> bool {
		if types.iter().any(|&t| self.check(t)) {
			self.advance();
			return true;
		}
		false
	}

	fn check(&self, r#type: TokenType) -> bool { !self.is_at_end() && self.peek().r#type == r#type }

	/// Two-token lookahead, used to tell `fun name()` from a lambda statement.
	fn check_next(&self, r#type: TokenType) -> bool {
		self.tokens.get(self.current + 1).is_some_and(|t| t.r#type == r#type)
	}

	fn is_at_end(&self) -> bool { self.peek().r#type == Eof }

	fn peek(&self) -> &Token { &self.tokens[self.current] }

	fn previous(&self) -> &Token { &self.tokens[self.current.saturating_sub(1)] }

	fn consume(&mut self, r#type: TokenType, expected: &'static str) -> Result<Token, ParseError> {
		if self.check(r#type) {
			return Ok(self.advance());
		}
		let token = self.peek().clone();
		Err(self.error(&token, ParseErrorType::Expected(expected)))
	}

	/// Record a syntax error and hand it back so the caller may unwind with it.
	fn error(&mut self, token: &Token, r#type: ParseErrorType) -> ParseError {
		let error = ParseError::new(token, r#type);
		self.errors.push(error.clone());
		error
	}

	/// Discard tokens until the start of the next statement.
	fn synchronize(&mut self) {
		self.advance();
		while !self.is_at_end() {
			if self.previous().r#type == Semicolon || self.peek().r#type.starts_statement() {
				return;
			}
			self.advance();
		}
	}
}
