//! Tree-walking evaluator.
//!
//! The interpreter walks the statements produced by the parser, evaluating
//! expressions to runtime [`Value`]s. Variable accesses use the distances the
//! resolver computed, so a local is found by hopping a fixed number of scopes
//! rather than by searching for its name; anything the resolver left alone is
//! a global.
//!
//! The current scope is passed down explicitly. A block builds a child scope
//! and hands it to its statements, so leaving the block (normally, through
//! `break`/`continue`/`return`, or with an error) simply drops the child.
//!
//! `break`, `continue` and `return` travel back up as a [`Flow`] value: loops
//! consume `Break` and `Continue`, calls consume `Return`.

pub mod callable;
pub mod class;
pub mod instance;
pub mod native;
pub mod value;

use std::{collections::HashMap, io::Write, rc::Rc};

use value::Value;

use crate::{
	environment::Environment,
	error::interpreter::{RuntimeError, RuntimeErrorType},
	interpreter::{
		callable::{Argument, Function},
		class::{Class, INITIALIZER},
		instance::Instance,
		native::NativeFunction,
	},
	parser::expression::{ExprId, Expression, LiteralValue},
	resolver::{Locals, PARENT, THIS},
	scanner::{Token, TokenType},
	statement::{Method, Statement},
	utils::RcCell,
};

/// Deepest nesting of calls before a program is stopped with a stack overflow.
pub const MAX_CALL_DEPTH: usize = 512;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
	Normal,
	Break,
	Continue,
	Return(Value),
}

/// Interpreter that executes plox statements.
pub struct Interpreter {
	globals:    RcCell<Environment>,
	/// Resolver output: scope distance for every local variable reference.
	locals:     Locals,
	output:     Box<dyn Write>,
	/// Echo the value of expression statements.
	repl:       bool,
	/// Calls currently in progress.
	call_depth: usize,
}

impl Default for Interpreter {
	fn default() -> Self { Self::new() }
}

impl Interpreter {
	/// An interpreter printing to stdout, with the default natives bound.
	pub fn new() -> Self { Self::with_output(Box::new(std::io::stdout())) }

	pub fn with_output(output: Box<dyn Write>) -> Self {
		let mut interpreter = Self {
			globals: RcCell::new(Environment::new()),
			locals: HashMap::new(),
			output,
			repl: false,
			call_depth: 0,
		};
		native::register_defaults(&mut interpreter);
		interpreter
	}

	pub fn set_repl(&mut self, repl: bool) { self.repl = repl; }

	/// Bind a Rust function in the global scope.
	pub fn define_native(
		&mut self,
		name: &str,
		arity: usize,
		body: impl Fn(&mut Interpreter, &[Argument<'_>]) -> Result<Value, RuntimeErrorType> + 'static,
	) {
		let native = NativeFunction::new(name, arity, body);
		self.globals.borrow_mut().define(name, Value::Native(Rc::new(native)));
	}

	/// Names currently bound in the global scope.
	pub fn global_names(&self) -> Vec<String> { self.globals.borrow().names().map(str::to_string).collect() }

	/// Record resolver output. Distances accumulate across runs of one session.
	pub fn add_locals(&mut self, locals: Locals) { self.locals.extend(locals); }

	/// Execute top-level statements in order, stopping at the first runtime error.
	pub fn interpret(&mut self, statements: &[Statement]) -> Result<(), RuntimeError> {
		let globals = self.globals.clone();
		for statement in statements {
			if let Err(e) = self.execute(statement, &globals) {
				log::debug!("runtime error: {e}");
				return Err(e);
			}
		}
		Ok(())
	}

	/// Run `statements` in `environment`, stopping early at the first flow
	/// that isn't `Normal`.
	pub(crate) fn execute_block(
		&mut self,
		statements: &[Statement],
		environment: &RcCell<Environment>,
	) -> Result<Flow, RuntimeError> {
		for statement in statements {
			match self.execute(statement, environment)? {
				Flow::Normal => {}
				flow => return Ok(flow),
			}
		}
		Ok(Flow::Normal)
	}

	pub(crate) fn write_prompt(&mut self, prompt: &str) -> std::io::Result<()> {
		self.output.write_all(prompt.as_bytes())?;
		self.output.flush()
	}

	fn execute(&mut self, statement: &Statement, environment: &RcCell<Environment>) -> Result<Flow, RuntimeError> {
		match statement {
			Statement::Expression(expression) => {
				let value = self.evaluate(expression, environment)?;
				if self.repl {
					writeln!(self.output, "{value}")?;
				}
			}
			Statement::Print { expression, .. } => {
				let value = self.evaluate(expression, environment)?;
				writeln!(self.output, "{value}")?;
			}
			Statement::Var { name, initializer } => {
				let value = match initializer {
					Some(initializer) => self.evaluate(initializer, environment)?,
					None => Value::Nil,
				};
				environment.borrow_mut().define(name.lexeme.as_str(), value);
			}
			Statement::Block(statements) => {
				return self.execute_block(statements, &Environment::enclosed_by(environment));
			}
			Statement::If { condition, then_branch, else_branch } => {
				if self.evaluate(condition, environment)?.is_truthy() {
					return self.execute(then_branch, environment);
				} else if let Some(else_branch) = else_branch {
					return self.execute(else_branch, environment);
				}
			}
			Statement::While { condition, body, increment } => {
				while self.evaluate(condition, environment)?.is_truthy() {
					match self.execute(body, environment)? {
						Flow::Break => break,
						Flow::Return(value) => return Ok(Flow::Return(value)),
						Flow::Normal | Flow::Continue => {}
					}
					if let Some(increment) = increment {
						self.evaluate(increment, environment)?;
					}
				}
			}
			Statement::Break(_) => return Ok(Flow::Break),
			Statement::Continue(_) => return Ok(Flow::Continue),
			Statement::Return { value, .. } => {
				let value = match value {
					Some(value) => self.evaluate(value, environment)?,
					None => Value::Nil,
				};
				return Ok(Flow::Return(value));
			}
			Statement::Function { name, function } => {
				let function = Function::new(Some(name.lexeme.clone()), function.clone(), environment.clone());
				environment.borrow_mut().define(name.lexeme.as_str(), Value::Function(Rc::new(function)));
			}
			Statement::Class { name, parent, methods } => self.class_declaration(name, parent.as_ref(), methods, environment)?,
			Statement::Empty => {}
		}
		Ok(Flow::Normal)
	}

	fn class_declaration(
		&mut self,
		name: &Token,
		parent: Option<&Expression>,
		methods: &[Method],
		environment: &RcCell<Environment>,
	) -> Result<(), RuntimeError> {
		// Published first so method bodies can refer to the class.
		environment.borrow_mut().define(name.lexeme.as_str(), Value::Nil);

		let parent = match parent {
			Some(expression) => match self.evaluate(expression, environment)? {
				Value::Class(class) => Some(class),
				_ => {
					let line = match expression {
						Expression::Variable { name: parent, .. } => parent.line,
						_ => name.line,
					};
					return Err(RuntimeError::new(line, RuntimeErrorType::ParentNotAClass));
				}
			},
			None => None,
		};

		let method_environment = match &parent {
			Some(parent) => {
				let scope = Environment::enclosed_by(environment);
				scope.borrow_mut().define(PARENT, Value::Class(parent.clone()));
				scope
			}
			None => environment.clone(),
		};

		let methods = methods
			.iter()
			.map(|method| {
				let mut function = Function::new(
					Some(method.name.lexeme.clone()),
					method.function.clone(),
					method_environment.clone(),
				);
				function.is_initializer = method.name.lexeme == INITIALIZER;
				(method.name.lexeme.clone(), Rc::new(function))
			})
			.collect();

		let class = Class::new(name.lexeme.as_str(), parent, methods);
		environment.borrow_mut().define(name.lexeme.as_str(), Value::Class(Rc::new(class)));
		Ok(())
	}

	/// Evaluate the given expression and return its value.
	fn evaluate(&mut self, expression: &Expression, environment: &RcCell<Environment>) -> Result<Value, RuntimeError> {
		Ok(match expression {
			Expression::Literal(literal) => match literal {
				LiteralValue::Nil => Value::Nil,
				LiteralValue::Boolean(b) => Value::Bool(*b),
				LiteralValue::Number(n) => Value::Number(*n),
				LiteralValue::Str(s) => Value::Str(s.clone()),
			},
			Expression::Variable { id, name } => self.look_up_variable(*id, name, &name.lexeme, environment)?,
			Expression::Assign { id, name, value } => {
				let value = self.evaluate(value, environment)?;
				match self.locals.get(id) {
					Some(&distance) => Environment::assign_at(environment, distance, name, value.clone())?,
					None => self.globals.borrow_mut().assign(name, value.clone())?,
				}
				value
			}
			Expression::Grouping(inner) => self.evaluate(inner, environment)?,
			Expression::Unary { operator, right } => {
				let right = self.evaluate(right, environment)?;
				match (operator.r#type, right) {
					(TokenType::Minus, Value::Number(n)) => Value::Number(-n),
					(TokenType::Minus, _) => {
						return Err(RuntimeError::new(operator.line, RuntimeErrorType::OperandMustBeNumber));
					}
					(_, right) => Value::Bool(!right.is_truthy()),
				}
			}
			Expression::Binary { left, operator, right } => {
				let left = self.evaluate(left, environment)?;
				let right = self.evaluate(right, environment)?;
				binary(&left, operator, &right).map_err(|e| RuntimeError::new(operator.line, e))?
			}
			Expression::Logical { left, operator, right } => {
				let left = self.evaluate(left, environment)?;
				let short_circuits =
					if operator.r#type == TokenType::Or { left.is_truthy() } else { !left.is_truthy() };
				if short_circuits { left } else { self.evaluate(right, environment)? }
			}
			Expression::Conditional { condition, then_branch, else_branch } => {
				if self.evaluate(condition, environment)?.is_truthy() {
					self.evaluate(then_branch, environment)?
				} else {
					self.evaluate(else_branch, environment)?
				}
			}
			Expression::Call { callee, paren, arguments } => {
				let callee = self.evaluate(callee, environment)?;
				let mut values = Vec::with_capacity(arguments.len());
				for expression in arguments {
					values.push(Argument { value: self.evaluate(expression, environment)?, expression });
				}
				let arguments = values;

				let callable = callee
					.as_callable()
					.ok_or_else(|| RuntimeError::new(paren.line, RuntimeErrorType::NotCallable))?;
				if arguments.len() != callable.arity() {
					return Err(RuntimeError::new(paren.line, RuntimeErrorType::ArityMismatch {
						expected: callable.arity(),
						got:      arguments.len(),
					}));
				}
				if self.call_depth == MAX_CALL_DEPTH {
					return Err(RuntimeError::new(paren.line, RuntimeErrorType::StackOverflow));
				}
				self.call_depth += 1;
				let result = callable.call(self, arguments, paren);
				self.call_depth -= 1;
				result?
			}
			Expression::Get { object, name } => match self.evaluate(object, environment)? {
				Value::Instance(instance) => Instance::get(&instance, name)?,
				_ => return Err(RuntimeError::new(name.line, RuntimeErrorType::NotAnInstance)),
			},
			Expression::Set { object, name, value } => {
				let Value::Instance(instance) = self.evaluate(object, environment)? else {
					return Err(RuntimeError::new(name.line, RuntimeErrorType::FieldOnNonInstance));
				};
				let value = self.evaluate(value, environment)?;
				instance.borrow_mut().set(name, value.clone());
				value
			}
			Expression::This { id, keyword } => self.look_up_variable(*id, keyword, THIS, environment)?,
			Expression::Parent { id, keyword, method } => self.parent_method(*id, keyword, method, environment)?,
			Expression::Function(function) => {
				Value::Function(Rc::new(Function::new(None, function.clone(), environment.clone())))
			}
			Expression::List { elements, .. } => {
				let values = elements
					.iter()
					.map(|element| self.evaluate(element, environment))
					.collect::<Result<Vec<_>, _>>()?;
				Value::List(RcCell::new(values))
			}
			Expression::Subscript { object, bracket, index } => {
				let object = self.evaluate(object, environment)?;
				let index = self.evaluate(index, environment)?;
				subscript(&object, &index).map_err(|e| RuntimeError::new(bracket.line, e))?
			}
		})
	}

	/// Resolved locals are read from exactly the scope the resolver found;
	/// everything else is a global.
	fn look_up_variable(
		&self,
		id: ExprId,
		token: &Token,
		name: &str,
		environment: &RcCell<Environment>,
	) -> Result<Value, RuntimeError> {
		match self.locals.get(&id) {
			Some(&distance) => Environment::get_at(environment, distance, name).ok_or_else(|| {
				RuntimeError::new(token.line, RuntimeErrorType::UndefinedVariable(name.to_string()))
			}),
			None => self.globals.borrow().get(token),
		}
	}

	/// `parent.method`: find `method` on the enclosing class's parent and bind
	/// it to the current `this`, which lives one scope inside `parent`.
	fn parent_method(
		&self,
		id: ExprId,
		keyword: &Token,
		method: &Token,
		environment: &RcCell<Environment>,
	) -> Result<Value, RuntimeError> {
		let undefined = |name: &str| RuntimeError::new(keyword.line, RuntimeErrorType::UndefinedVariable(name.into()));
		let distance = *self.locals.get(&id).ok_or_else(|| undefined(PARENT))?;
		let Some(Value::Class(parent)) = Environment::get_at(environment, distance, PARENT) else {
			return Err(undefined(PARENT));
		};
		let instance = distance
			.checked_sub(1)
			.and_then(|distance| Environment::get_at(environment, distance, THIS))
			.ok_or_else(|| undefined(THIS))?;
		let function = parent.find_method(&method.lexeme).ok_or_else(|| {
			RuntimeError::new(method.line, RuntimeErrorType::UndefinedProperty(method.lexeme.clone()))
		})?;
		Ok(Value::Function(Rc::new(function.bind(instance))))
	}
}

/// Apply a binary operator to two evaluated operands.
fn binary(left: &Value, operator: &Token, right: &Value) -> Result<Value, RuntimeErrorType> {
	use TokenType::*;

	let numbers = || match (left, right) {
		(Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
		_ => Err(RuntimeErrorType::OperandsMustBeNumbers),
	};
	let coerced = || Ok::<_, RuntimeErrorType>((left.to_number()?, right.to_number()?));

	Ok(match operator.r#type {
		Minus => {
			let (l, r) = numbers()?;
			Value::Number(l - r)
		}
		Star => {
			let (l, r) = numbers()?;
			Value::Number(l * r)
		}
		Slash => {
			let (l, r) = numbers()?;
			if r == 0.0 {
				return Err(RuntimeErrorType::DivisionByZero);
			}
			Value::Number(l / r)
		}
		Plus => match (left, right) {
			(Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!("{left}{right}").into()),
			_ => {
				let (l, r) = coerced()?;
				Value::Number(l + r)
			}
		},
		Greater | GreaterEqual | Less | LessEqual => {
			let ordering = match (left, right) {
				(Value::Str(l), Value::Str(r)) => l.partial_cmp(r),
				_ => {
					let (l, r) = coerced()?;
					l.partial_cmp(&r)
				}
			};
			let holds = match ordering {
				Some(ordering) => match operator.r#type {
					Greater => ordering.is_gt(),
					GreaterEqual => ordering.is_ge(),
					Less => ordering.is_lt(),
					_ => ordering.is_le(),
				},
				// NaN is unordered.
				None => false,
			};
			Value::Bool(holds)
		}
		EqualEqual => Value::Bool(left == right),
		BangEqual => Value::Bool(left != right),
		_ => unreachable!("parser only builds binary nodes from binary operators"),
	})
}

/// `object[index]` on a list or a string.
fn subscript(object: &Value, index: &Value) -> Result<Value, RuntimeErrorType> {
	let position = match index {
		Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => *n as usize,
		other => return Err(RuntimeErrorType::InvalidIndex(other.to_string())),
	};
	match object {
		Value::List(items) => {
			let items = items.borrow();
			items.get(position).cloned().ok_or(RuntimeErrorType::IndexOutOfBounds { index: position, len: items.len() })
		}
		Value::Str(s) => s
			.chars()
			.nth(position)
			.map(|c| Value::Str(c.to_string().into()))
			.ok_or_else(|| RuntimeErrorType::IndexOutOfBounds { index: position, len: s.chars().count() }),
		_ => Err(RuntimeErrorType::NotIndexable),
	}
}

#[cfg(test)]
mod tests {
	use std::{cell::RefCell, rc::Rc};

	use super::*;
	use crate::{parser::Parser, resolver::Resolver, scanner::Scanner};

	/// Print sink the test can read back.
	#[derive(Clone, Default)]
	struct Output(Rc<RefCell<Vec<u8>>>);

	impl Write for Output {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.0.borrow_mut().write(buf) }

		fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
	}

	fn run(input: &str) -> (String, Result<(), RuntimeError>) {
		let tokens = Scanner::new(input).scan_tokens();
		let mut parser = Parser::new(tokens);
		let statements = parser.parse();
		assert!(parser.errors().is_empty(), "{:?}", parser.errors());

		let output = Output::default();
		let mut interpreter = Interpreter::with_output(Box::new(output.clone()));
		let locals = Resolver::new(interpreter.global_names()).resolve(&statements).expect("resolves");
		interpreter.add_locals(locals);
		let result = interpreter.interpret(&statements);
		let printed = String::from_utf8(output.0.borrow().clone()).expect("utf-8 output");
		(printed, result)
	}

	fn output_of(input: &str) -> String {
		let (printed, result) = run(input);
		if let Err(e) = result {
			panic!("{input}: {e}");
		}
		printed
	}

	fn error_of(input: &str) -> RuntimeErrorType {
		match run(input).1 {
			Err(RuntimeError::Evaluation(e)) => e.r#type,
			other => panic!("{input}: expected an evaluation error, got {other:?}"),
		}
	}

	#[test]
	fn arithmetic() {
		assert_eq!(output_of("print 1 + 2 * 3;"), "7\n");
		assert_eq!(output_of("print (1 + 2) * 3 - 4 / 8;"), "8.5\n");
		assert_eq!(output_of("print -(3);"), "-3\n");
	}

	#[test]
	fn plus_concatenates_or_coerces() {
		assert_eq!(output_of("print \"a\" + 1;"), "a1\n");
		assert_eq!(output_of("print 2 + \"b\";"), "2b\n");
		assert_eq!(output_of("print \"x\" + nil;"), "xnil\n");
		assert_eq!(output_of("print true + true;"), "2\n");
		assert_eq!(output_of("print 1 + false;"), "1\n");
		assert_eq!(error_of("print nil + 1;"), RuntimeErrorType::NotCoercible("nil"));
	}

	#[test]
	fn comparisons() {
		assert_eq!(output_of("print 1 < 2; print 2 <= 1; print 3 > 2; print 3 >= 3;"), "true\nfalse\ntrue\ntrue\n");
		assert_eq!(output_of("print true > false;"), "true\n");
		assert_eq!(output_of("print \"abc\" < \"abd\"; print \"b\" > \"abc\";"), "true\ntrue\n");
		assert_eq!(output_of("print \"a\" < 98;"), "true\n");
		assert_eq!(error_of("print nil < 1;"), RuntimeErrorType::NotCoercible("nil"));
	}

	#[test]
	fn equality() {
		assert_eq!(output_of("print 1 == 1; print 1 == \"1\"; print nil != false; print [1] == [1];"), "true\nfalse\ntrue\ntrue\n");
	}

	#[test]
	fn type_errors() {
		assert_eq!(error_of("print -\"a\";"), RuntimeErrorType::OperandMustBeNumber);
		assert_eq!(error_of("print 1 - \"a\";"), RuntimeErrorType::OperandsMustBeNumbers);
		assert_eq!(error_of("print true * 2;"), RuntimeErrorType::OperandsMustBeNumbers);
		assert_eq!(error_of("\"f\"();"), RuntimeErrorType::NotCallable);
		assert_eq!(error_of("var n = 1; print n.field;"), RuntimeErrorType::NotAnInstance);
		assert_eq!(error_of("var s = \"s\"; s.field = 1;"), RuntimeErrorType::FieldOnNonInstance);
		assert_eq!(error_of("print undefined;"), RuntimeErrorType::UndefinedVariable("undefined".into()));
		assert_eq!(error_of("undefined = 1;"), RuntimeErrorType::UndefinedVariable("undefined".into()));
	}

	#[test]
	fn division_by_zero_stops_the_program() {
		let (printed, result) = run("print 1; print 1/0; print 2;");
		assert_eq!(printed, "1\n");
		let error = result.unwrap_err();
		assert_eq!(error.r#type(), Some(&RuntimeErrorType::DivisionByZero));
		assert_eq!(error.to_string(), "line 1: Division by zero");
	}

	#[test]
	fn truthiness_drives_control_flow() {
		assert_eq!(output_of("if (0) print 1; else print 2;"), "2\n");
		assert_eq!(output_of("if (\"\") print 1; else print 2;"), "2\n");
		assert_eq!(output_of("if ([]) print 1; else print 2;"), "2\n");
		assert_eq!(output_of("if (\"0\") print 1; else print 2;"), "1\n");
		assert_eq!(output_of("print !nil; print !1;"), "true\nfalse\n");
	}

	#[test]
	fn logical_short_circuits() {
		assert_eq!(output_of("print nil or \"yes\"; print 0 and boom();"), "yes\n0\n");
		assert_eq!(output_of("var hit = false; fun f() { hit = true; return 1; } true or f(); print hit;"), "false\n");
	}

	#[test]
	fn conditional_evaluates_one_branch() {
		assert_eq!(output_of("print 1 ? \"a\" : boom();"), "a\n");
		assert_eq!(output_of("print nil ? boom() : \"b\";"), "b\n");
	}

	#[test]
	fn scoping() {
		let source = "var a = \"global\"; { var a = \"outer\"; { var a = \"inner\"; print a; } print a; } print a;";
		assert_eq!(output_of(source), "inner\nouter\nglobal\n");
		assert_eq!(output_of("var a = 1; { a = 2; var b = a; print b; } print a;"), "2\n2\n");
	}

	#[test]
	fn closures_capture_the_environment() {
		let source = "fun makeCounter() { var i = 0; fun inc() { i = i + 1; return i; } return inc; }
			var c = makeCounter(); print c(); print c();";
		assert_eq!(output_of(source), "1\n2\n");
	}

	#[test]
	fn closures_see_the_declaration_scope() {
		let source = "var a = \"global\"; { fun show() { print a; } show(); var a = \"block\"; show(); }";
		assert_eq!(output_of(source), "global\nglobal\n");
	}

	#[test]
	fn loops_break_and_continue() {
		assert_eq!(output_of("var i = 0; while (i < 3) { print i; i = i + 1; }"), "0\n1\n2\n");
		assert_eq!(output_of("for (var i = 0; i < 10; i = i + 1) { if (i == 2) break; print i; }"), "0\n1\n");
		assert_eq!(output_of("for (var i = 0; i < 4; i = i + 1) { if (i == 1) continue; print i; }"), "0\n2\n3\n");
		let source = "var i = 0; while (i < 5) { i = i + 1; if (i < 4) continue; print i; }";
		assert_eq!(output_of(source), "4\n5\n");
	}

	#[test]
	fn return_unwinds_loops() {
		let source = "fun find() { for (var i = 0; ; i = i + 1) { while (true) { if (i == 3) return i; break; } } } print find();";
		assert_eq!(output_of(source), "3\n");
		assert_eq!(output_of("fun f() { return; } print f(); fun g() {} print g();"), "nil\nnil\n");
	}

	#[test]
	fn recursion() {
		let source = "fun fib(n) { if (n <= 1) return n; return fib(n - 2) + fib(n - 1); } print fib(15);";
		assert_eq!(output_of(source), "610\n");
	}

	#[test]
	fn arity_is_checked() {
		assert_eq!(error_of("fun f(a) {} f(1, 2);"), RuntimeErrorType::ArityMismatch { expected: 1, got: 2 });
		assert_eq!(error_of("class A { init(x) {} } A();"), RuntimeErrorType::ArityMismatch { expected: 1, got: 0 });
		assert_eq!(error_of("class A {} A(1);"), RuntimeErrorType::ArityMismatch { expected: 0, got: 1 });
	}

	#[test]
	fn lambdas() {
		assert_eq!(output_of("var add = fun (a, b) { return a + b; }; print add(1, 2); print add;"), "3\n<anonymous fun>\n");
		assert_eq!(output_of("fun twice(f, x) { return f(f(x)); } print twice(fun (n) { return n * 3; }, 2);"), "18\n");
	}

	#[test]
	fn classes_fields_and_methods() {
		let source = "class Point { init(x, y) { this.x = x; this.y = y; } sum() { return this.x + this.y; } }
			var p = Point(1, 2); print p.sum(); p.x = 10; print p.sum(); print p; print Point;";
		assert_eq!(output_of(source), "3\n12\n<Point instance>\n<class Point>\n");
	}

	#[test]
	fn bound_methods_remember_this() {
		let source = "class A { init(n) { this.n = n; } get() { return this.n; } }
			var m = A(7).get; print m(); print m;";
		assert_eq!(output_of(source), "7\n<method get>\n");
	}

	#[test]
	fn fields_shadow_methods() {
		let source = "class A { m() { return 1; } } var a = A(); a.m = fun () { return 2; }; print a.m();";
		assert_eq!(output_of(source), "2\n");
		assert_eq!(error_of("class A {} print A().nope;"), RuntimeErrorType::UndefinedProperty("nope".into()));
	}

	#[test]
	fn initializer_returns_the_instance() {
		let source = "class A { init() { this.v = 1; return; } } var a = A(); print a.init() == a; print a.v;";
		assert_eq!(output_of(source), "true\n1\n");
	}

	#[test]
	fn inheritance_and_parent_dispatch() {
		let source = "class A { greet() { return \"A\"; } }
			class B : A { greet() { return parent.greet() + \"B\"; } }
			print B().greet();";
		assert_eq!(output_of(source), "AB\n");

		let source = "class A { init(n) { this.n = n; } twice() { return this.n * 2; } }
			class B < A { init(n) { super.init(n + 1); } }
			class C < B { twice() { return parent.twice() + 1; } }
			print C(1).twice();";
		assert_eq!(output_of(source), "5\n");
	}

	#[test]
	fn parent_method_must_exist() {
		let source = "class A {} class B : A { m() { return parent.missing(); } } B().m();";
		assert_eq!(error_of(source), RuntimeErrorType::UndefinedProperty("missing".into()));
	}

	#[test]
	fn parent_must_be_a_class() {
		assert_eq!(error_of("var NotClass = 1; class B : NotClass {}"), RuntimeErrorType::ParentNotAClass);
	}

	#[test]
	fn class_name_is_visible_in_methods() {
		let source = "class Node { make() { return Node(); } } print Node().make();";
		assert_eq!(output_of(source), "<Node instance>\n");
	}

	#[test]
	fn lists_and_subscripts() {
		assert_eq!(output_of("var xs = [1, \"two\", [3]]; print xs; print xs[1]; print xs[2][0];"), "[1, \"two\", [3]]\ntwo\n3\n");
		assert_eq!(output_of("print \"hey\"[1];"), "e\n");
		assert_eq!(error_of("print [1][1];"), RuntimeErrorType::IndexOutOfBounds { index: 1, len: 1 });
		assert_eq!(error_of("print [1][0.5];"), RuntimeErrorType::InvalidIndex("0.5".into()));
		assert_eq!(error_of("print 1[0];"), RuntimeErrorType::NotIndexable);
	}

	#[test]
	fn repl_echoes_expression_statements() {
		let tokens = Scanner::new("1 + 2; var x = 3; x;").scan_tokens();
		let statements = Parser::new(tokens).parse();
		let output = Output::default();
		let mut interpreter = Interpreter::with_output(Box::new(output.clone()));
		interpreter.set_repl(true);
		interpreter.add_locals(Resolver::new(interpreter.global_names()).resolve(&statements).unwrap());
		interpreter.interpret(&statements).unwrap();
		assert_eq!(String::from_utf8(output.0.borrow().clone()).unwrap(), "3\n3\n");
	}

	#[test]
	fn natives() {
		assert_eq!(output_of("print clock() > 0; print clock;"), "true\n<native fun>\n");
		assert_eq!(output_of("print sleep(0);"), "nil\n");
		assert_eq!(
			error_of("sleep(-1);"),
			RuntimeErrorType::Native("sleep expects a non-negative number of seconds".into())
		);
	}

	#[test]
	fn struct_describes_callables() {
		let printed = output_of("fun add(a, b) { return a + b; } print struct(add);");
		assert_eq!(
			printed,
			"--------------------------\nINPUT {add}:\n   Type: function\n   Name: add\n   Parameters:\n      - \
			 param[0]:   (a)\n      - param[1]:   (b)\n--------------------------\n"
		);
		let printed = output_of("class A {} class B : A { m() {} } print struct(B);");
		assert!(printed.contains("   Type: class\n   Name: B\n   Parent: <class A>\n"), "{printed}");
		assert!(printed.contains("   Member method m:\n   Type: method\n   Name: m\n   Parameters:\n      NONE"), "{printed}");
	}

	/// Deep recursion needs more native stack than a test thread gets by default.
	fn run_on_big_stack(input: &'static str) -> (String, Result<(), RuntimeError>) {
		std::thread::Builder::new().stack_size(256 << 20).spawn(move || run(input)).unwrap().join().unwrap()
	}

	#[test]
	fn runaway_recursion_is_a_runtime_error() {
		let (printed, result) = run_on_big_stack("print \"start\"; fun f(n) { return f(n + 1); } f(0); print \"after\";");
		assert_eq!(printed, "start\n");
		assert_eq!(result.unwrap_err().r#type(), Some(&RuntimeErrorType::StackOverflow));
	}

	#[test]
	fn call_depth_unwinds_after_returns_and_errors() {
		let source = "fun down(n) { if (n == 0) return 0; return down(n - 1); }
			for (var i = 0; i < 3; i = i + 1) print down(500);";
		assert_eq!(run_on_big_stack(source).0, "0\n0\n0\n");

		let source = "fun deep(n) { if (n == 0) return 1 / 0; return deep(n - 1); } deep(400);";
		assert_eq!(run_on_big_stack(source).1.unwrap_err().r#type(), Some(&RuntimeErrorType::DivisionByZero));
	}

	#[test]
	fn parent_without_a_bound_instance_is_an_error() {
		let mut interpreter = Interpreter::with_output(Box::new(Output::default()));
		let environment = RcCell::new(Environment::new());
		environment.borrow_mut().define(PARENT, Value::Class(Rc::new(Class::new("A", None, HashMap::new()))));
		let id = ExprId::fresh();
		interpreter.add_locals(Locals::from([(id, 0)]));

		let keyword = Token::new(TokenType::Parent, "parent", None, 1);
		let method = Token::new(TokenType::Identifier, "m", None, 1);
		let error = interpreter.parent_method(id, &keyword, &method, &environment).unwrap_err();
		assert_eq!(error.r#type(), Some(&RuntimeErrorType::UndefinedVariable(THIS.into())));
	}

	#[test]
	fn custom_natives_can_be_registered() {
		let tokens = Scanner::new("print double(21);").scan_tokens();
		let statements = Parser::new(tokens).parse();
		let output = Output::default();
		let mut interpreter = Interpreter::with_output(Box::new(output.clone()));
		interpreter.define_native("double", 1, |_, arguments| match arguments[0].value {
			Value::Number(n) => Ok(Value::Number(n * 2.0)),
			_ => Err(RuntimeErrorType::Native("double expects a number".into())),
		});
		interpreter.interpret(&statements).unwrap();
		assert_eq!(String::from_utf8(output.0.borrow().clone()).unwrap(), "42\n");
	}
}
