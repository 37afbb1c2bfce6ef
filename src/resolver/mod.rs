//! Static pass between parsing and evaluation.
//!
//! The resolver walks the tree once, tracking block scopes as a stack of
//! `name -> initialized` tables. For every expression that reads or writes a
//! local binding it records how many scopes lie between the use and the
//! declaration; the interpreter later hops exactly that many environments.
//! Names found in no scope are left out of the table and treated as globals.
//!
//! Along the way it reports misuse that is visible without running the code:
//! reading a variable in its own initializer, redeclaring a local, `return`
//! outside a function, `this`/`parent` outside a class and a class inheriting
//! from itself. Every problem is collected; resolution never stops early.

use std::collections::HashMap;

use crate::{
	error::resolver::{ResolveError, ResolveErrorType},
	interpreter::class::INITIALIZER,
	parser::expression::{ExprId, Expression, FunctionExpression},
	scanner::Token,
	statement::Statement,
};

/// Scope distance of every resolved local reference, 0 being the innermost scope.
pub type Locals = HashMap<ExprId, usize>;

/// Name the receiver is bound to inside methods.
pub const THIS: &str = "this";
/// Name the parent class is bound to around a subclass's methods.
pub const PARENT: &str = "parent";

#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionType {
	None,
	Function,
	Method,
	Initializer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClassType {
	None,
	Class,
	Subclass,
}

pub struct Resolver {
	/// Innermost scope last. `false` means declared but not yet initialized.
	scopes:           Vec<HashMap<String, bool>>,
	/// Top-level names, tracked only to catch `var a = a;` on an unknown global.
	globals:          HashMap<String, bool>,
	locals:           Locals,
	current_function: FunctionType,
	current_class:    ClassType,
	errors:           Vec<ResolveError>,
}

impl Resolver {
	/// `known_globals` are names already bound at run time, e.g. natives or
	/// declarations from earlier REPL lines.
	pub fn new(known_globals: impl IntoIterator<Item = String>) -> Self {
		Self {
			scopes:           Vec::new(),
			globals:          known_globals.into_iter().map(|name| (name, true)).collect(),
			locals:           HashMap::new(),
			current_function: FunctionType::None,
			current_class:    ClassType::None,
			errors:           Vec::new(),
		}
	}

	/// Resolve a whole program. Returns the distance table, or every problem found.
	pub fn resolve(&mut self, statements: &[Statement]) -> Result<Locals, Vec<ResolveError>> {
		self.scopes.clear();
		self.current_function = FunctionType::None;
		self.current_class = ClassType::None;

		self.resolve_statements(statements);
		log::debug!("resolved {} local references, {} errors", self.locals.len(), self.errors.len());

		let locals = std::mem::take(&mut self.locals);
		if self.errors.is_empty() { Ok(locals) } else { Err(std::mem::take(&mut self.errors)) }
	}

	fn resolve_statements(&mut self, statements: &[Statement]) {
		for statement in statements {
			self.resolve_statement(statement);
		}
	}

	fn resolve_statement(&mut self, statement: &Statement) {
		match statement {
			Statement::Expression(expression) | Statement::Print { expression, .. } => {
				self.resolve_expression(expression)
			}
			Statement::Var { name, initializer } => {
				self.declare(name);
				if let Some(initializer) = initializer {
					self.resolve_expression(initializer);
				}
				self.define(name);
			}
			Statement::Block(statements) => {
				self.begin_scope();
				self.resolve_statements(statements);
				self.end_scope();
			}
			Statement::If { condition, then_branch, else_branch } => {
				self.resolve_expression(condition);
				self.resolve_statement(then_branch);
				if let Some(else_branch) = else_branch {
					self.resolve_statement(else_branch);
				}
			}
			Statement::While { condition, body, increment } => {
				self.resolve_expression(condition);
				self.resolve_statement(body);
				if let Some(increment) = increment {
					self.resolve_expression(increment);
				}
			}
			Statement::Break(_) | Statement::Continue(_) | Statement::Empty => {}
			Statement::Return { keyword, value } => {
				if self.current_function == FunctionType::None {
					self.error(keyword, ResolveErrorType::TopLevelReturn);
				}
				if let Some(value) = value {
					if self.current_function == FunctionType::Initializer {
						self.error(keyword, ResolveErrorType::ReturnValueFromInitializer);
					}
					self.resolve_expression(value);
				}
			}
			Statement::Function { name, function } => {
				// Defined before the body so the function can call itself.
				self.declare(name);
				self.define(name);
				self.resolve_function(function, FunctionType::Function);
			}
			Statement::Class { name, parent, methods } => {
				let enclosing_class = self.current_class;
				self.current_class = ClassType::Class;
				self.declare(name);
				self.define(name);

				if let Some(parent) = parent {
					if let Expression::Variable { name: parent_name, .. } = parent
						&& parent_name.lexeme == name.lexeme
					{
						self.error(parent_name, ResolveErrorType::SelfInheritance);
					}
					self.current_class = ClassType::Subclass;
					self.resolve_expression(parent);
					self.begin_scope();
					self.bind(PARENT);
				}

				self.begin_scope();
				self.bind(THIS);
				for method in methods {
					let r#type =
						if method.name.lexeme == INITIALIZER { FunctionType::Initializer } else { FunctionType::Method };
					self.resolve_function(&method.function, r#type);
				}
				self.end_scope();

				if parent.is_some() {
					self.end_scope();
				}
				self.current_class = enclosing_class;
			}
		}
	}

	fn resolve_expression(&mut self, expression: &Expression) {
		match expression {
			Expression::Literal(_) => {}
			Expression::Variable { id, name } => {
				let uninitialized = match self.scopes.last() {
					Some(scope) => scope.get(&name.lexeme) == Some(&false),
					None => self.globals.get(&name.lexeme) == Some(&false),
				};
				if uninitialized {
					self.error(name, ResolveErrorType::ReadInOwnInitializer);
				}
				self.resolve_local(*id, &name.lexeme);
			}
			Expression::Assign { id, name, value } => {
				self.resolve_expression(value);
				self.resolve_local(*id, &name.lexeme);
			}
			Expression::Grouping(inner) | Expression::Unary { right: inner, .. } => self.resolve_expression(inner),
			Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
				self.resolve_expression(left);
				self.resolve_expression(right);
			}
			Expression::Conditional { condition, then_branch, else_branch } => {
				self.resolve_expression(condition);
				self.resolve_expression(then_branch);
				self.resolve_expression(else_branch);
			}
			Expression::Call { callee, arguments, .. } => {
				self.resolve_expression(callee);
				for argument in arguments {
					self.resolve_expression(argument);
				}
			}
			// Properties are looked up dynamically; only the object is resolved.
			Expression::Get { object, .. } => self.resolve_expression(object),
			Expression::Set { object, value, .. } => {
				self.resolve_expression(value);
				self.resolve_expression(object);
			}
			Expression::This { id, keyword } => {
				if self.current_class == ClassType::None {
					self.error(keyword, ResolveErrorType::ThisOutsideClass);
				} else {
					self.resolve_local(*id, THIS);
				}
			}
			Expression::Parent { id, keyword, .. } => match self.current_class {
				ClassType::None => self.error(keyword, ResolveErrorType::ParentOutsideClass),
				ClassType::Class => self.error(keyword, ResolveErrorType::ParentWithoutParentClass),
				ClassType::Subclass => self.resolve_local(*id, PARENT),
			},
			Expression::Function(function) => self.resolve_function(function, FunctionType::Function),
			Expression::List { elements, .. } => {
				for element in elements {
					self.resolve_expression(element);
				}
			}
			Expression::Subscript { object, index, .. } => {
				self.resolve_expression(object);
				self.resolve_expression(index);
			}
		}
	}

	/// Parameters and body share one scope, matching the single environment a
	/// call creates.
	fn resolve_function(&mut self, function: &FunctionExpression, r#type: FunctionType) {
		let enclosing_function = self.current_function;
		self.current_function = r#type;

		self.begin_scope();
		for param in function.params.iter() {
			self.declare(param);
			self.define(param);
		}
		self.resolve_statements(&function.body);
		self.end_scope();

		self.current_function = enclosing_function;
	}

	fn resolve_local(&mut self, id: ExprId, name: &str) {
		if let Some(distance) = self.scopes.iter().rev().position(|scope| scope.contains_key(name)) {
			log::trace!("'{name}' resolved at distance {distance}");
			self.locals.insert(id, distance);
		}
	}

	fn declare(&mut self, name: &Token) {
		let Some(scope) = self.scopes.last_mut() else {
			self.globals.entry(name.lexeme.clone()).or_insert(false);
			return;
		};
		if scope.contains_key(&name.lexeme) {
			self.error(name, ResolveErrorType::AlreadyDeclared);
			return;
		}
		scope.insert(name.lexeme.clone(), false);
	}

	fn define(&mut self, name: &Token) {
		match self.scopes.last_mut() {
			Some(scope) => scope.insert(name.lexeme.clone(), true),
			None => self.globals.insert(name.lexeme.clone(), true),
		};
	}

	/// Bind an implicit name in the innermost scope.
	fn bind(&mut self, name: &str) {
		if let Some(scope) = self.scopes.last_mut() {
			scope.insert(name.to_string(), true);
		}
	}

	fn begin_scope(&mut self) { self.scopes.push(HashMap::new()); }

	fn end_scope(&mut self) { self.scopes.pop(); }

	fn error(&mut self, token: &Token, r#type: ResolveErrorType) {
		log::debug!("resolve error at line {}: {}", token.line, r#type);
		self.errors.push(ResolveError::new(token, r#type));
	}
}
