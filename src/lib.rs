//! # plox
//!
//! A tree-walking interpreter for a small dynamically-typed scripting
//! language with lexical scoping, closures, single-inheritance classes and
//! `break`/`continue`/`return` control flow.
//!
//! User's source code: `var average = (min + max) / 2;`

//! ## Scanning
//!
//! The scanner takes in the characters and converts them into tokens.
//! Whitespace and comments (`//` lines and nestable `/* */` blocks) are
//! dropped, so the tokens are
//! `["var", "average", "=", "(", "min", "+", "max", ")", "/", "2", ";"]`.

//! ## Parsing
//!
//! A recursive-descent parser builds the syntax tree and reports syntax
//! errors, skipping to the next statement after each one so a single run
//! reports every independent mistake.
//!
//! ``` markdown
//! average (Statement::Var)
//! └── / (Expression::Binary)
//!     ├── + (Expression::Binary)
//!     │   ├── min (Expression::Variable)
//!     │   └── max (Expression::Variable)
//!     └── 2 (Expression::Literal)
//! ```

//! ## Resolving
//!
//! A static pass works out which declaration each name refers to and how
//! many scopes away it lives, and rejects code like `return` at top level.

//! ## Interpreting
//!
//! The interpreter walks the tree, using the resolved distances to find
//! local variables without searching for them by name.
//!
//! ```
//! use std::{cell::RefCell, io::Write, rc::Rc};
//!
//! #[derive(Clone, Default)]
//! struct Sink(Rc<RefCell<Vec<u8>>>);
//!
//! impl Write for Sink {
//!     fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.0.borrow_mut().write(buf) }
//!     fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
//! }
//!
//! let sink = Sink::default();
//! let mut plox = plox::Plox::new().with_output(Box::new(sink.clone()));
//! plox.run("var min = 1; var max = 4; print (min + max) / 2;").unwrap();
//! assert_eq!(sink.0.borrow().as_slice(), b"2.5\n");
//! ```

pub mod cli;
mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
mod plox;
pub mod resolver;
pub mod scanner;
pub mod statement;
mod utils;

pub use error::{
	LoxError,
	interpreter::{RuntimeError, RuntimeErrorType},
	parser::{ParseError, ParseErrorType},
	resolver::{ResolveError, ResolveErrorType},
	scanner::{ScanError, ScanErrorType},
};
pub use interpreter::{Interpreter, value::Value};
pub use plox::Plox;
