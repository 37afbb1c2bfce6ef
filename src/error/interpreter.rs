/// Errors that abort interpretation of the remaining program.
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
	/// A type or lookup failure while evaluating the program.
	#[error(transparent)]
	Evaluation(#[from] EvaluationError),
	/// The print sink refused the output.
	#[error("Failed write output: {0}")]
	Output(#[from] std::io::Error),
}

impl RuntimeError {
	pub fn new(line: usize, r#type: RuntimeErrorType) -> Self { EvaluationError { line, r#type }.into() }

	/// The kind of evaluation failure, if this is one.
	pub fn r#type(&self) -> Option<&RuntimeErrorType> {
		match self {
			RuntimeError::Evaluation(e) => Some(&e.r#type),
			RuntimeError::Output(_) => None,
		}
	}
}

#[derive(thiserror::Error, Debug)]
#[error("line {line}: {type}")]
pub struct EvaluationError {
	pub line:   usize,
	pub r#type: RuntimeErrorType,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorType {
	#[error("Operand must be a number")]
	OperandMustBeNumber,
	#[error("Operands must be numbers")]
	OperandsMustBeNumbers,
	/// The numeric coercion behind `+` and the comparisons rejects this kind of value.
	#[error("Can't use {0} as a numeric operand")]
	NotCoercible(&'static str),
	#[error("Division by zero")]
	DivisionByZero,
	#[error("Undefined variable '{0}'")]
	UndefinedVariable(String),
	#[error("Undefined property '{0}'")]
	UndefinedProperty(String),
	#[error("Can only call functions and classes")]
	NotCallable,
	#[error("Expected {expected} arguments but got {got}")]
	ArityMismatch { expected: usize, got: usize },
	#[error("Only instances have properties")]
	NotAnInstance,
	#[error("Only instances have fields")]
	FieldOnNonInstance,
	#[error("Parent must be a class")]
	ParentNotAClass,
	#[error("Only lists and strings can be indexed")]
	NotIndexable,
	#[error("Index must be a non-negative integer, got {0}")]
	InvalidIndex(String),
	#[error("Index {index} out of bounds for length {len}")]
	IndexOutOfBounds { index: usize, len: usize },
	#[error("Stack overflow: more than {} nested calls", crate::interpreter::MAX_CALL_DEPTH)]
	StackOverflow,
	/// A native function rejected its arguments or failed.
	#[error("{0}")]
	Native(String),
}
