use crate::scanner::Token;

/// A scoping or legality violation found by the resolver.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("line {line} at '{lexeme}': {type}")]
pub struct ResolveError {
	pub line:   usize,
	pub lexeme: String,
	pub r#type: ResolveErrorType,
}

impl ResolveError {
	pub fn new(token: &Token, r#type: ResolveErrorType) -> Self {
		Self { line: token.line, lexeme: token.lexeme.clone(), r#type }
	}
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveErrorType {
	#[error("Can't read local variable in its own initializer")]
	ReadInOwnInitializer,
	#[error("Already a variable with this name in this scope")]
	AlreadyDeclared,
	#[error("Can't return from top-level code")]
	TopLevelReturn,
	#[error("Can't return a value from an initializer")]
	ReturnValueFromInitializer,
	#[error("Can't use 'this' outside of a class")]
	ThisOutsideClass,
	#[error("Can't use 'parent' outside of a class")]
	ParentOutsideClass,
	#[error("Can't use 'parent' in a class with no parent class")]
	ParentWithoutParentClass,
	#[error("A class can't inherit from itself")]
	SelfInheritance,
}
