use std::{fmt::Display, rc::Rc};

use Value::*;

use crate::{
	error::interpreter::RuntimeErrorType,
	interpreter::{
		callable::{self, Callable},
		class, instance,
		native::NativeFunction,
	},
	utils::RcCell,
};

/// Value represents a runtime value in plox.
///
/// Cloning is cheap: strings are shared and lists, callables and instances
/// are handles, so a copy aliases the same list or object.
#[derive(Debug, Clone)]
pub enum Value {
	Nil,
	Bool(bool),
	Number(f64),
	Str(Rc<str>),
	List(RcCell<Vec<Value>>),
	Native(Rc<NativeFunction>),
	Function(Rc<callable::Function>),
	Class(Rc<class::Class>),
	Instance(RcCell<instance::Instance>),
}

impl Value {
	/// `nil`, `false`, `0`, `""` and `[]` are falsy, everything else is truthy.
	pub fn is_truthy(&self) -> bool {
		match self {
			Nil => false,
			Bool(b) => *b,
			Number(n) => *n != 0.0,
			Str(s) => !s.is_empty(),
			List(items) => !items.borrow().is_empty(),
			Native(_) | Function(_) | Class(_) | Instance(_) => true,
		}
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			Nil => "nil",
			Bool(_) => "boolean",
			Number(_) => "number",
			Str(_) => "string",
			List(_) => "list",
			Native(_) | Function(_) => "function",
			Class(_) => "class",
			Instance(_) => "instance",
		}
	}

	/// The numeric view used by `+` and the ordering operators: booleans are
	/// 0 or 1 and a string is its UTF-8 bytes read as one big-endian unsigned
	/// integer.
	pub fn to_number(&self) -> Result<f64, RuntimeErrorType> {
		match self {
			Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
			Number(n) => Ok(*n),
			Str(s) => Ok(s.bytes().fold(0.0, |acc, byte| acc * 256.0 + f64::from(byte))),
			other => Err(RuntimeErrorType::NotCoercible(other.type_name())),
		}
	}

	/// The callable behind this value, if it has one.
	pub fn as_callable(&self) -> Option<Rc<dyn Callable>> {
		match self {
			Native(native) => Some(native.clone()),
			Function(function) => Some(function.clone()),
			Class(class) => Some(class.clone()),
			_ => None,
		}
	}

	fn fmt_element(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Str(s) => write!(f, "\"{s}\""),
			other => write!(f, "{other}"),
		}
	}
}

/// Same variant and same value. Objects compare by identity, lists element-wise.
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Nil, Nil) => true,
			(Bool(l), Bool(r)) => l == r,
			(Number(l), Number(r)) => l == r,
			(Str(l), Str(r)) => l == r,
			(List(l), List(r)) => l.ptr_eq(r) || *l.borrow() == *r.borrow(),
			(Native(l), Native(r)) => Rc::ptr_eq(l, r),
			(Function(l), Function(r)) => Rc::ptr_eq(l, r),
			(Class(l), Class(r)) => Rc::ptr_eq(l, r),
			(Instance(l), Instance(r)) => l.ptr_eq(r),
			_ => false,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Nil => write!(f, "nil"),
			Bool(b) => write!(f, "{b}"),
			// `f64`'s Display already drops a zero fraction: 3.0 prints as 3.
			Number(n) => write!(f, "{n}"),
			Str(s) => write!(f, "{s}"),
			List(items) => {
				write!(f, "[")?;
				for (i, item) in items.borrow().iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					item.fmt_element(f)?;
				}
				write!(f, "]")
			}
			Native(_) => write!(f, "<native fun>"),
			Function(function) => write!(f, "{function}"),
			Class(class) => write!(f, "{class}"),
			Instance(instance) => write!(f, "{}", instance.borrow()),
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self { Str(value.into()) }
}
