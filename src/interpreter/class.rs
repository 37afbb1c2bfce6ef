use std::{collections::HashMap, fmt::Display, rc::Rc};

use crate::{
	error::interpreter::RuntimeError,
	interpreter::{
		Interpreter,
		callable::{Argument, Callable, Function},
		instance::Instance,
		value::Value,
	},
	scanner::Token,
	utils::RcCell,
};

/// Name of the method run on instantiation.
pub const INITIALIZER: &str = "init";

#[derive(Debug)]
pub struct Class {
	pub name:    String,
	pub parent:  Option<Rc<Class>>,
	pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
	pub fn new(name: impl Into<String>, parent: Option<Rc<Class>>, methods: HashMap<String, Rc<Function>>) -> Self {
		Self { name: name.into(), parent, methods }
	}

	/// Look a method up on this class, then on its ancestors.
	pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
		self.methods.get(name).cloned().or_else(|| self.parent.as_ref().and_then(|parent| parent.find_method(name)))
	}
}

impl Callable for Class {
	fn arity(&self) -> usize { self.find_method(INITIALIZER).map_or(0, |init| init.arity()) }

	fn call(
		self: Rc<Self>,
		interpreter: &mut Interpreter,
		arguments: Vec<Argument<'_>>,
		paren: &Token,
	) -> Result<Value, RuntimeError> {
		let instance = Value::Instance(RcCell::new(Instance::new(self.clone())));
		if let Some(initializer) = self.find_method(INITIALIZER) {
			Rc::new(initializer.bind(instance.clone())).call(interpreter, arguments, paren)?;
		}
		Ok(instance)
	}
}

impl Display for Class {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "<class {}>", self.name) }
}
