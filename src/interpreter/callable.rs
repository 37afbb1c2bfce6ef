use std::{fmt::Display, rc::Rc};

use crate::{
	environment::Environment,
	error::interpreter::RuntimeError,
	interpreter::{Flow, Interpreter, value::Value},
	parser::expression::{Expression, FunctionExpression, FunctionKind},
	scanner::Token,
	utils::RcCell,
};

/// An evaluated call argument, together with the expression that produced it.
#[derive(Debug)]
pub struct Argument<'e> {
	pub value:      Value,
	pub expression: &'e Expression,
}

/// Anything a call expression can invoke.
pub trait Callable {
	fn arity(&self) -> usize;

	/// `arguments.len()` has already been checked against [`Callable::arity`].
	fn call(self: Rc<Self>, interpreter: &mut Interpreter, arguments: Vec<Argument<'_>>, paren: &Token)
	-> Result<Value, RuntimeError>;
}

/// A user-defined function or method together with the scope it closes over.
#[derive(Debug, Clone)]
pub struct Function {
	/// `None` for lambdas.
	pub name:           Option<String>,
	pub declaration:    FunctionExpression,
	pub closure:        RcCell<Environment>,
	/// Methods named `init` always hand back their instance.
	pub is_initializer: bool,
}

impl Function {
	pub fn new(name: Option<String>, declaration: FunctionExpression, closure: RcCell<Environment>) -> Self {
		Self { name, declaration, closure, is_initializer: false }
	}

	/// A copy of this method whose closure binds `this` to `instance`.
	pub fn bind(&self, instance: Value) -> Function {
		let environment = Environment::enclosed_by(&self.closure);
		environment.borrow_mut().define("this", instance);
		Function { closure: environment, ..self.clone() }
	}

	fn bound_instance(&self) -> Value { Environment::get_at(&self.closure, 0, "this").unwrap_or(Value::Nil) }
}

impl Callable for Function {
	fn arity(&self) -> usize { self.declaration.params.len() }

	fn call(
		self: Rc<Self>,
		interpreter: &mut Interpreter,
		arguments: Vec<Argument<'_>>,
		_paren: &Token,
	) -> Result<Value, RuntimeError> {
		let environment = Environment::enclosed_by(&self.closure);
		{
			let mut scope = environment.borrow_mut();
			for (param, argument) in self.declaration.params.iter().zip(arguments) {
				scope.define(param.lexeme.as_str(), argument.value);
			}
		}

		let flow = interpreter.execute_block(&self.declaration.body, &environment)?;
		if self.is_initializer {
			return Ok(self.bound_instance());
		}
		Ok(match flow {
			Flow::Return(value) => value,
			Flow::Normal | Flow::Break | Flow::Continue => Value::Nil,
		})
	}
}

impl Display for Function {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match (&self.name, self.declaration.kind) {
			(None, _) => write!(f, "<anonymous fun>"),
			(Some(name), FunctionKind::Function) => write!(f, "<fun {name}>"),
			(Some(name), FunctionKind::Method) => write!(f, "<method {name}>"),
		}
	}
}
