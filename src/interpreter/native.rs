//! Functions implemented in Rust and pre-bound in the global scope.

use std::{
	fmt::Debug,
	io::BufRead,
	rc::Rc,
	time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::{
	error::interpreter::{RuntimeError, RuntimeErrorType},
	interpreter::{
		Interpreter,
		callable::{Argument, Callable, Function},
		class::Class,
		value::Value,
	},
	parser::expression::Expression,
	scanner::Token,
};

type NativeBody = Box<dyn Fn(&mut Interpreter, &[Argument<'_>]) -> Result<Value, RuntimeErrorType>>;

pub struct NativeFunction {
	pub name:  String,
	pub arity: usize,
	body:      NativeBody,
}

impl NativeFunction {
	pub fn new(
		name: impl Into<String>,
		arity: usize,
		body: impl Fn(&mut Interpreter, &[Argument<'_>]) -> Result<Value, RuntimeErrorType> + 'static,
	) -> Self {
		Self { name: name.into(), arity, body: Box::new(body) }
	}
}

impl Debug for NativeFunction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NativeFunction").field("name", &self.name).field("arity", &self.arity).finish()
	}
}

impl Callable for NativeFunction {
	fn arity(&self) -> usize { self.arity }

	fn call(
		self: Rc<Self>,
		interpreter: &mut Interpreter,
		arguments: Vec<Argument<'_>>,
		paren: &Token,
	) -> Result<Value, RuntimeError> {
		(self.body)(interpreter, &arguments).map_err(|e| RuntimeError::new(paren.line, e))
	}
}

/// Bind the standard natives in `interpreter`'s global scope.
pub fn register_defaults(interpreter: &mut Interpreter) {
	interpreter.define_native("clock", 0, clock);
	interpreter.define_native("sleep", 1, sleep);
	interpreter.define_native("input", 1, input);
	interpreter.define_native("struct", 1, describe);
}

/// Seconds since the UNIX epoch.
fn clock(_: &mut Interpreter, _: &[Argument<'_>]) -> Result<Value, RuntimeErrorType> {
	let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).map_err(|e| RuntimeErrorType::Native(e.to_string()))?;
	Ok(Value::Number(elapsed.as_secs_f64()))
}

fn sleep(_: &mut Interpreter, arguments: &[Argument<'_>]) -> Result<Value, RuntimeErrorType> {
	match arguments[0].value {
		Value::Number(seconds) if seconds >= 0.0 && seconds.is_finite() => {
			std::thread::sleep(Duration::from_secs_f64(seconds));
			Ok(Value::Nil)
		}
		_ => Err(RuntimeErrorType::Native("sleep expects a non-negative number of seconds".into())),
	}
}

/// Show a prompt and read one line from stdin.
fn input(interpreter: &mut Interpreter, arguments: &[Argument<'_>]) -> Result<Value, RuntimeErrorType> {
	let Value::Str(prompt) = &arguments[0].value else {
		return Err(RuntimeErrorType::Native("input expects a string prompt".into()));
	};
	let io_error = |e: std::io::Error| RuntimeErrorType::Native(format!("input failed: {e}"));
	interpreter.write_prompt(&format!("{prompt}> ")).map_err(io_error)?;

	let mut line = String::new();
	std::io::stdin().lock().read_line(&mut line).map_err(io_error)?;
	Ok(Value::Str(line.trim_end_matches(['\n', '\r']).into()))
}

const RULE: &str = "--------------------------";
const METHOD_RULE: &str = "  *********************";

/// Describe a function or class as text. The argument's source expression
/// names the description when it is a plain variable.
fn describe(_: &mut Interpreter, arguments: &[Argument<'_>]) -> Result<Value, RuntimeErrorType> {
	let argument = &arguments[0];
	let label = match argument.expression {
		Expression::Variable { name, .. } => name.lexeme.as_str(),
		_ => "EXPRESSION",
	};
	let mut lines = vec![RULE.to_string(), format!("INPUT {{{label}}}:")];
	match &argument.value {
		Value::Function(function) => describe_function(&mut lines, function, "function"),
		Value::Class(class) => describe_class(&mut lines, class),
		other => {
			return Err(RuntimeErrorType::Native(format!("struct expects a function or class, got {}", other.type_name())));
		}
	}
	lines.push(RULE.to_string());
	Ok(Value::Str(lines.join("\n").into()))
}

fn describe_class(lines: &mut Vec<String>, class: &Class) {
	lines.push("   Type: class".into());
	lines.push(format!("   Name: {}", class.name));
	if let Some(parent) = &class.parent {
		lines.push(format!("   Parent: {parent}"));
	}
	let mut methods = class.methods.iter().collect::<Vec<_>>();
	methods.sort_by_key(|(name, _)| name.as_str());
	for (name, method) in methods {
		lines.push(METHOD_RULE.into());
		lines.push(format!("   Member method {name}:"));
		describe_function(lines, method, "method");
		lines.push(METHOD_RULE.into());
	}
}

fn describe_function(lines: &mut Vec<String>, function: &Function, kind: &str) {
	match &function.name {
		Some(name) => {
			lines.push(format!("   Type: {kind}"));
			lines.push(format!("   Name: {name}"));
		}
		None => lines.push("   Type: anonymous function".into()),
	}
	lines.push("   Parameters:".into());
	if function.declaration.params.is_empty() {
		lines.push("      NONE".into());
	}
	for (i, param) in function.declaration.params.iter().enumerate() {
		lines.push(format!("      - param[{i}]:   ({})", param.lexeme));
	}
}
