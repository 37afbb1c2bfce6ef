//! Expression AST nodes
//!
//! An `Expression` is a tree structure representing code like `-123 *
//! (45.67)` as nested nodes. Its `Display` impl prints the tree in a lisp-like
//! form, `(* (- 123) (group 45.67))`, which is what the parser tests compare
//! against.

use std::{
	rc::Rc,
	sync::atomic::{AtomicUsize, Ordering},
};

use Expression::*;

use crate::{scanner::Token, statement::Statement};

/// Identity of an expression node that names a binding. The resolver keys its
/// distance table by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

impl ExprId {
	pub fn fresh() -> Self {
		static NEXT: AtomicUsize = AtomicUsize::new(0);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

/// Expression AST nodes
#[derive(Debug, Clone)]
pub enum Expression {
	Literal(LiteralValue),
	Variable { id: ExprId, name: Token },
	Assign { id: ExprId, name: Token, value: Box<Expression> },
	Grouping(Box<Expression>),
	Unary { operator: Token, right: Box<Expression> },
	Binary { left: Box<Expression>, operator: Token, right: Box<Expression> },
	/// Short-circuiting `and` / `or`.
	Logical { left: Box<Expression>, operator: Token, right: Box<Expression> },
	/// `condition ? then_branch : else_branch`
	Conditional { condition: Box<Expression>, then_branch: Box<Expression>, else_branch: Box<Expression> },
	Call { callee: Box<Expression>, paren: Token, arguments: Vec<Expression> },
	Get { object: Box<Expression>, name: Token },
	Set { object: Box<Expression>, name: Token, value: Box<Expression> },
	This { id: ExprId, keyword: Token },
	/// `parent.method`, an explicit reference to a superclass method.
	Parent { id: ExprId, keyword: Token, method: Token },
	Function(FunctionExpression),
	/// `[a, b, c]`
	List { bracket: Token, elements: Vec<Expression> },
	/// `object[index]`
	Subscript { object: Box<Expression>, bracket: Token, index: Box<Expression> },
}

impl Expression {
	pub fn variable(name: Token) -> Box<Self> { Box::new(Variable { id: ExprId::fresh(), name }) }

	pub fn assign(name: Token, value: Box<Self>) -> Box<Self> {
		Box::new(Assign { id: ExprId::fresh(), name, value })
	}

	pub fn grouping(expr: Box<Self>) -> Box<Self> { Box::new(Grouping(expr)) }

	pub fn unary(operator: Token, right: Box<Self>) -> Box<Self> { Box::new(Unary { operator, right }) }

	pub fn binary(left: Box<Self>, operator: Token, right: Box<Self>) -> Box<Self> {
		Box::new(Binary { left, operator, right })
	}

	pub fn logical(left: Box<Self>, operator: Token, right: Box<Self>) -> Box<Self> {
		Box::new(Logical { left, operator, right })
	}

	pub fn conditional(condition: Box<Self>, then_branch: Box<Self>, else_branch: Box<Self>) -> Box<Self> {
		Box::new(Conditional { condition, then_branch, else_branch })
	}

	pub fn call(callee: Box<Self>, paren: Token, arguments: Vec<Self>) -> Box<Self> {
		Box::new(Call { callee, paren, arguments })
	}

	pub fn get(object: Box<Self>, name: Token) -> Box<Self> { Box::new(Get { object, name }) }

	pub fn set(object: Box<Self>, name: Token, value: Box<Self>) -> Box<Self> { Box::new(Set { object, name, value }) }

	pub fn this(keyword: Token) -> Box<Self> { Box::new(This { id: ExprId::fresh(), keyword }) }

	pub fn parent(keyword: Token, method: Token) -> Box<Self> {
		Box::new(Parent { id: ExprId::fresh(), keyword, method })
	}

	pub fn list(bracket: Token, elements: Vec<Self>) -> Box<Self> { Box::new(List { bracket, elements }) }

	pub fn subscript(object: Box<Self>, bracket: Token, index: Box<Self>) -> Box<Self> {
		Box::new(Subscript { object, bracket, index })
	}
}

/// Literal values in the AST
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
	Number(f64),
	Str(Rc<str>),
	Boolean(bool),
	Nil,
}

/// Whether a function literal is a free function or a class method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
	Function,
	Method,
}

/// A function literal. Named declarations and methods reuse it as their body.
///
/// Parameters and body are reference counted so every closure created from
/// this literal can hold on to them after the statement list is dropped.
#[derive(Debug, Clone)]
pub struct FunctionExpression {
	pub params: Rc<Vec<Token>>,
	pub body:   Rc<Vec<Statement>>,
	pub kind:   FunctionKind,
}

impl std::fmt::Display for Expression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Literal(lit) => write!(f, "{lit}"),
			Variable { name, .. } => write!(f, "{}", name.lexeme),
			Assign { name, value, .. } => write!(f, "(= {} {value})", name.lexeme),
			Grouping(expression) => write!(f, "(group {expression})"),
			Unary { operator, right } => write!(f, "({} {right})", operator.lexeme),
			Binary { left, operator, right } | Logical { left, operator, right } => {
				write!(f, "({} {left} {right})", operator.lexeme)
			}
			Conditional { condition, then_branch, else_branch } => {
				write!(f, "(? {condition} : {then_branch} {else_branch})")
			}
			Call { callee, arguments, .. } => write!(f, "(call {callee}{})", spaced(arguments)),
			Get { object, name } => write!(f, "(get {object} {})", name.lexeme),
			Set { object, name, value } => write!(f, "(set {object} {} {value})", name.lexeme),
			This { .. } => write!(f, "this"),
			Parent { method, .. } => write!(f, "(parent {})", method.lexeme),
			Function(function) => {
				let params = function.params.iter().map(|p| p.lexeme.as_str()).collect::<Vec<_>>().join(" ");
				write!(f, "(fun ({params}) ...)")
			}
			List { elements, .. } => write!(f, "(list{})", spaced(elements)),
			Subscript { object, index, .. } => write!(f, "(index {object} {index})"),
		}
	}
}

fn spaced(expressions: &[Expression]) -> String { expressions.iter().map(|e| format!(" {e}")).collect() }

impl std::fmt::Display for LiteralValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			LiteralValue::Number(n) => write!(f, "{n}"),
			LiteralValue::Str(s) => write!(f, "\"{s}\""),
			LiteralValue::Boolean(b) => write!(f, "{b}"),
			LiteralValue::Nil => write!(f, "nil"),
		}
	}
}
