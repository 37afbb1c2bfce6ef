//! There is no place in the grammar where both an expression and a statement
//! are allowed. The operands of, say, `+` are always expressions, never
//! statements. The body of a `while` loop is always a statement.

use crate::{
	parser::expression::{Expression, FunctionExpression},
	scanner::Token,
};

/// A statement in the programming language.
#[derive(Debug, Clone)]
pub enum Statement {
	/// An expression used as a statement.
	Expression(Expression),
	/// A print statement.
	Print { keyword: Token, expression: Expression },
	/// A variable declaration statement.
	Var {
		/// The token of the variable being declared.
		name:        Token,
		/// An optional initializer expression.
		initializer: Option<Expression>,
	},
	/// A block of statements.
	Block(Vec<Statement>),
	If {
		condition:   Expression,
		then_branch: Box<Statement>,
		else_branch: Option<Box<Statement>>,
	},
	While {
		condition: Expression,
		body:      Box<Statement>,
		/// The increment clause of a desugared `for`, run after every iteration
		/// including those cut short by `continue`.
		increment: Option<Expression>,
	},
	Break(Token),
	Continue(Token),
	/// A return statement.
	Return { keyword: Token, value: Option<Expression> },
	Function { name: Token, function: FunctionExpression },
	Class {
		name:    Token,
		/// Always an `Expression::Variable`.
		parent:  Option<Expression>,
		methods: Vec<Method>,
	},
	/// A bare `;`.
	Empty,
}

/// A named function inside a class body.
#[derive(Debug, Clone)]
pub struct Method {
	pub name:     Token,
	pub function: FunctionExpression,
}
