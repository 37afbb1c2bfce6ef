use std::collections::HashMap;

use crate::{
	error::interpreter::{RuntimeError, RuntimeErrorType},
	interpreter::value::Value,
	scanner::Token,
	utils::RcCell,
};

/// One lexical scope. Blocks, function calls, class bodies with a parent and
/// bound methods each get their own, chained to the scope they were created in.
///
/// Clone the RcCell, it's shallow copy
#[derive(Default, Debug)]
pub struct Environment {
	values:    HashMap<String, Value>,
	enclosing: Option<RcCell<Environment>>,
}

impl Environment {
	pub fn new() -> Self { Self::default() }

	/// A fresh scope nested in `enclosing`.
	pub fn enclosed_by(enclosing: &RcCell<Environment>) -> RcCell<Self> {
		RcCell::new(Self { values: HashMap::new(), enclosing: Some(enclosing.clone()) })
	}

	/// A variable statement doesn’t just define a new variable, it can also be
	/// used to redefine an existing variable.
	pub fn define(&mut self, name: impl Into<String>, value: Value) { self.values.insert(name.into(), value); }

	/// Names bound directly in this scope.
	pub fn names(&self) -> impl Iterator<Item = &str> { self.values.keys().map(String::as_str) }

	/// Look a name up through the whole chain. Only globals are read this way.
	pub fn get(&self, token: &Token) -> Result<Value, RuntimeError> {
		match self.values.get(&token.lexeme) {
			Some(value) => Ok(value.clone()),
			None => match &self.enclosing {
				Some(enclosing) => enclosing.borrow().get(token),
				None => Err(undefined(token)),
			},
		}
	}

	/// Assign a value to an existing variable.
	pub fn assign(&mut self, token: &Token, value: Value) -> Result<(), RuntimeError> {
		if let Some(slot) = self.values.get_mut(&token.lexeme) {
			*slot = value;
			Ok(())
		} else if let Some(enclosing) = &self.enclosing {
			enclosing.borrow_mut().assign(token, value)
		} else {
			Err(undefined(token))
		}
	}

	/// The scope `distance` links up the chain from `this`; 0 is `this` itself.
	pub fn ancestor(this: &RcCell<Self>, distance: usize) -> Option<RcCell<Self>> {
		let mut environment = this.clone();
		for _ in 0..distance {
			let enclosing = environment.borrow().enclosing.clone()?;
			environment = enclosing;
		}
		Some(environment)
	}

	/// Read `name` from exactly the scope the resolver pointed at.
	pub fn get_at(this: &RcCell<Self>, distance: usize, name: &str) -> Option<Value> {
		Self::ancestor(this, distance)?.borrow().values.get(name).cloned()
	}

	/// Write `token` into exactly the scope the resolver pointed at.
	pub fn assign_at(this: &RcCell<Self>, distance: usize, token: &Token, value: Value) -> Result<(), RuntimeError> {
		let environment = Self::ancestor(this, distance).ok_or_else(|| undefined(token))?;
		let mut environment = environment.borrow_mut();
		match environment.values.get_mut(&token.lexeme) {
			Some(slot) => {
				*slot = value;
				Ok(())
			}
			None => Err(undefined(token)),
		}
	}
}

fn undefined(token: &Token) -> RuntimeError {
	RuntimeError::new(token.line, RuntimeErrorType::UndefinedVariable(token.lexeme.clone()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scanner::TokenType;

	fn name(lexeme: &str) -> Token { Token::synthetic(TokenType::Identifier, lexeme, 1) }

	#[test]
	fn lookup_walks_the_chain() {
		let globals = RcCell::new(Environment::new());
		globals.borrow_mut().define("a", Value::Number(1.0));
		let inner = Environment::enclosed_by(&Environment::enclosed_by(&globals));

		assert_eq!(inner.borrow().get(&name("a")).ok(), Some(Value::Number(1.0)));
		assert!(inner.borrow().get(&name("b")).is_err());
	}

	#[test]
	fn assign_requires_existing_binding() {
		let globals = RcCell::new(Environment::new());
		globals.borrow_mut().define("a", Value::Nil);
		let inner = Environment::enclosed_by(&globals);

		inner.borrow_mut().assign(&name("a"), Value::Bool(true)).unwrap();
		assert_eq!(globals.borrow().get(&name("a")).ok(), Some(Value::Bool(true)));

		let error = inner.borrow_mut().assign(&name("missing"), Value::Nil).unwrap_err();
		assert_eq!(error.r#type(), Some(&RuntimeErrorType::UndefinedVariable("missing".into())));
	}

	#[test]
	fn distance_addresses_one_scope() {
		let globals = RcCell::new(Environment::new());
		globals.borrow_mut().define("x", Value::Number(1.0));
		let middle = Environment::enclosed_by(&globals);
		middle.borrow_mut().define("x", Value::Number(2.0));
		let inner = Environment::enclosed_by(&middle);

		assert_eq!(Environment::get_at(&inner, 1, "x"), Some(Value::Number(2.0)));
		assert_eq!(Environment::get_at(&inner, 2, "x"), Some(Value::Number(1.0)));
		assert_eq!(Environment::get_at(&inner, 0, "x"), None);
		assert_eq!(Environment::get_at(&inner, 3, "x"), None);

		Environment::assign_at(&inner, 2, &name("x"), Value::Nil).unwrap();
		assert_eq!(Environment::get_at(&globals, 0, "x"), Some(Value::Nil));
		assert_eq!(Environment::get_at(&middle, 0, "x"), Some(Value::Number(2.0)));
	}
}
