use std::{collections::HashMap, fmt::Display, rc::Rc};

use crate::{
	error::interpreter::{RuntimeError, RuntimeErrorType},
	interpreter::{class::Class, value::Value},
	scanner::Token,
	utils::RcCell,
};

/// Fields are named bits of state stored directly in an instance. Properties
/// are the named things, that a get expression may return. Every field is
/// a property, but not every property is a field.
#[derive(Debug)]
pub struct Instance {
	pub class: Rc<Class>,
	fields:    HashMap<String, Value>,
}

impl Instance {
	pub fn new(class: Rc<Class>) -> Self { Self { class, fields: HashMap::new() } }

	/// Fields shadow methods. A method comes back bound to `this`.
	pub fn get(this: &RcCell<Self>, property: &Token) -> Result<Value, RuntimeError> {
		let instance = this.borrow();
		if let Some(value) = instance.fields.get(&property.lexeme) {
			return Ok(value.clone());
		}
		match instance.class.find_method(&property.lexeme) {
			Some(method) => Ok(Value::Function(Rc::new(method.bind(Value::Instance(this.clone()))))),
			None => Err(RuntimeError::new(property.line, RuntimeErrorType::UndefinedProperty(property.lexeme.clone()))),
		}
	}

	/// Fields need no declaration; setting one creates it.
	pub fn set(&mut self, property: &Token, value: Value) { self.fields.insert(property.lexeme.clone(), value); }
}

impl Display for Instance {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "<{} instance>", self.class.name) }
}
