use std::{cell::RefCell, io::Write, path::PathBuf, rc::Rc};

use indoc::indoc;
use plox::{LoxError, Plox, RuntimeErrorType, Value};

/// In-memory sink shared between a session and the test reading it back.
#[derive(Clone, Default)]
struct Sink(Rc<RefCell<Vec<u8>>>);

impl Sink {
	fn contents(&self) -> String { String::from_utf8(self.0.borrow().clone()).expect("utf-8 output") }
}

impl Write for Sink {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.0.borrow_mut().write(buf) }

	fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
}

struct Session {
	plox:   Plox,
	output: Sink,
	report: Sink,
}

fn session() -> Session {
	let output = Sink::default();
	let report = Sink::default();
	let plox = Plox::new().with_output(Box::new(output.clone())).with_reporter(Box::new(report.clone()));
	Session { plox, output, report }
}

fn fixture(name: &str) -> PathBuf { PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name) }

fn run(source: &str) -> String {
	let mut session = session();
	if let Err(e) = session.plox.run(source) {
		panic!("{e}\n{}", session.report.contents());
	}
	session.output.contents()
}

#[test]
fn test_class_fixture() {
	let mut session = session();
	session.plox.run_file(fixture("classes.plox")).unwrap();
	assert_eq!(session.output.contents(), indoc! {"
		rectangle with area 6
		square with area 16
		<Square instance>
		<class Square>
	"});
}

#[test]
fn test_closure_fixture() {
	let mut session = session();
	session.plox.run_file(fixture("closures.lox")).unwrap();
	assert_eq!(session.output.contents(), "1\n2\n1\n42\n");
}

#[test]
fn test_loop_fixture() {
	let mut session = session();
	session.plox.run_file(fixture("loops.plox")).unwrap();
	assert_eq!(session.output.contents(), "19\n3\n");
}

#[test]
fn test_unsupported_extension() {
	let mut session = session();
	let error = session.plox.run_file(fixture("wrong_extension.txt")).unwrap_err();
	assert!(matches!(&error, LoxError::UnsupportedExtension(extension) if extension == "txt"));
	assert_eq!(error.exit_code(), 74);
	assert!(session.output.contents().is_empty());
}

#[test]
fn test_missing_file() {
	let error = session().plox.run_file(fixture("missing.plox")).unwrap_err();
	assert!(matches!(error, LoxError::Io(_)));
	assert_eq!(error.exit_code(), 74);
}

#[test]
fn test_syntax_errors_are_all_reported() {
	let mut session = session();
	let error = session.plox.run_file(fixture("broken.plox")).unwrap_err();
	assert!(matches!(error, LoxError::ParserErrors(2)));
	assert_eq!(error.exit_code(), 65);

	let report = session.report.contents();
	let lines = report.lines().collect::<Vec<_>>();
	assert_eq!(lines.len(), 2, "{report}");
	assert!(lines.iter().all(|line| line.starts_with("Syntax error: line ")), "{report}");
	assert!(lines[0].contains("line 1"), "{report}");
	assert!(session.output.contents().is_empty());
}

#[test]
fn test_lexical_errors_stop_before_running() {
	let mut session = session();
	let error = session.plox.run("print 1; @ \"open").unwrap_err();
	assert!(matches!(error, LoxError::ScannerErrors(2)));
	assert_eq!(session.report.contents().lines().count(), 2);
	assert!(session.output.contents().is_empty());
}

#[test]
fn test_resolver_errors_stop_before_running() {
	let mut session = session();
	let error = session.plox.run("print 1; return 2; class A : A {}").unwrap_err();
	assert!(matches!(error, LoxError::ResolverErrors(2)));
	assert_eq!(error.exit_code(), 65);
	assert!(session.report.contents().starts_with("Semantic error: line 1 at 'return'"));
	assert!(session.output.contents().is_empty());
}

#[test]
fn test_runtime_error_keeps_earlier_output() {
	let mut session = session();
	let error = session.plox.run("print \"before\"; print 1 / 0; print \"after\";").unwrap_err();
	assert_eq!(session.output.contents(), "before\n");
	assert_eq!(error.exit_code(), 70);
	match error {
		LoxError::Runtime(e) => {
			assert_eq!(e.r#type(), Some(&RuntimeErrorType::DivisionByZero));
			assert_eq!(e.to_string(), "line 1: Division by zero");
		}
		other => panic!("expected a runtime error, got {other}"),
	}
}

#[test]
fn test_globals_persist_across_runs() {
	let mut session = session();
	session.plox.run("var greeting = \"hi\"; fun shout(s) { return s + \"!\"; }").unwrap();
	session.plox.run("print shout(greeting);").unwrap();
	session.plox.run("var greeting = greeting + \" there\"; print greeting;").unwrap();
	assert_eq!(session.output.contents(), "hi!\nhi there\n");
}

#[test]
fn test_unknown_global_in_own_initializer() {
	let mut session = session();
	let error = session.plox.run("var fresh = fresh;").unwrap_err();
	assert!(matches!(error, LoxError::ResolverErrors(1)));
	assert!(session.report.contents().contains("Can't read local variable in its own initializer"));
}

#[test]
fn test_repl_lines() {
	let output = Sink::default();
	let report = Sink::default();
	let mut plox =
		Plox::new().with_output(Box::new(output.clone())).with_reporter(Box::new(report.clone())).repl(true);

	let input = indoc! {"
		var x = 20;
		x + 1;
		x / 0;
		print x;
		var = ;
	"};
	plox.run_lines(input.as_bytes()).unwrap();

	assert_eq!(output.contents(), "> > 21\n> > 20\n> > ");
	let report = report.contents();
	assert!(report.contains("Runtime error: line 1: Division by zero"), "{report}");
	assert!(report.contains("Syntax error: "), "{report}");
	assert!(report.ends_with("\nExited plox repl\n"), "{report}");
}

#[test]
fn test_custom_native() {
	let mut session = session();
	session.plox.interpreter().define_native("len", 1, |_, arguments| match &arguments[0].value {
		Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
		other => Err(RuntimeErrorType::Native(format!("len expects a string, got {}", other.type_name()))),
	});
	session.plox.run("print len(\"plox\");").unwrap();
	assert_eq!(session.output.contents(), "4\n");

	let error = session.plox.run("len(1);").unwrap_err();
	assert_eq!(error.to_string(), "Runtime error: line 1: len expects a string, got number");
}

#[test]
fn test_struct_native() {
	let output = run(indoc! {"
		class Greeter {
			init(name) { this.name = name; }
			greet(other) { print this.name + \" greets \" + other; }
		}
		print struct(Greeter);
	"});
	assert_eq!(output, indoc! {"
		--------------------------
		INPUT {Greeter}:
		   Type: class
		   Name: Greeter
		  *********************
		   Member method greet:
		   Type: method
		   Name: greet
		   Parameters:
		      - param[0]:   (other)
		  *********************
		  *********************
		   Member method init:
		   Type: method
		   Name: init
		   Parameters:
		      - param[0]:   (name)
		  *********************
		--------------------------
	"});
}

#[test]
fn test_struct_of_an_expression() {
	let output = run("print struct(fun (a) { return a; });");
	assert_eq!(output, indoc! {"
		--------------------------
		INPUT {EXPRESSION}:
		   Type: anonymous function
		   Parameters:
		      - param[0]:   (a)
		--------------------------
	"});
}

#[test]
fn test_lists() {
	let output = run(indoc! {r#"
		var words = ["a", "b", "c"];
		var joined = "";
		for (var i = 0; i < 3; i = i + 1) joined = joined + words[i];
		print joined;
		print words;
		print [1, [2, nil], true];
		if ([]) print "non-empty"; else print "empty";
	"#});
	assert_eq!(output, "abc\n[\"a\", \"b\", \"c\"]\n[1, [2, nil], true]\nempty\n");
}

#[test]
fn test_runaway_recursion_stops_with_a_runtime_error() {
	let (output, error) = std::thread::Builder::new()
		.stack_size(256 << 20)
		.spawn(|| {
			let mut session = session();
			let error = session
				.plox
				.run("fun f(n) { return f(n + 1); } print \"start\"; f(0); print \"after\";")
				.unwrap_err();
			(session.output.contents(), error)
		})
		.unwrap()
		.join()
		.unwrap();

	assert_eq!(output, "start\n");
	assert_eq!(error.exit_code(), 70);
	match error {
		LoxError::Runtime(e) => assert_eq!(e.r#type(), Some(&RuntimeErrorType::StackOverflow)),
		other => panic!("expected a runtime error, got {other}"),
	}
}
