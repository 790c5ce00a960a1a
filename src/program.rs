//! Programs: parsed `do function`s ready to be decorated
//!
//! A [`Program`] is a parsed function plus the host functions it may call.
//! It implements [`Suspendable`] by running the body on a fresh VM until the
//! first `yield`. Each suspension is reported with a resume closure that
//! clones the suspended VM, so the same point can be resumed any number of
//! times (List's bind does exactly that).

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::config::ValidationConfig;
use crate::decorator::{Do, Suspendable};
use crate::error::DoError;
use crate::executor::errors::{self, ErrorInfo};
use crate::executor::{run_until_done, stdlib, Control, NativeFn, Val, VM};
use crate::parser::semantic_validator::{validate_function, ValidationError};
use crate::parser::{self, FunctionDef};
use crate::runner::{Resume, Yielded};

#[derive(Debug, Clone)]
pub struct Program {
    def: Rc<FunctionDef>,
    source: Rc<str>,
    natives: HashMap<String, Val>,
}

impl Program {
    /// Parse a source file holding one `do function`.
    pub fn parse(source: &str) -> Result<Self, DoError> {
        let def = parser::parse_function(source)?;
        Ok(Self {
            def: Rc::new(def),
            source: Rc::from(source),
            natives: HashMap::new(),
        })
    }

    /// Make a host function callable from the body under `name`.
    ///
    /// Host functions shadow stdlib names.
    pub fn with_native(
        mut self,
        name: &str,
        func: impl Fn(&[Val]) -> Result<Val, DoError> + 'static,
    ) -> Self {
        self.natives
            .insert(name.to_string(), Val::Native(NativeFn::new(name, func)));
        self
    }

    pub fn def(&self) -> &FunctionDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Run the semantic validator against the stdlib and host functions.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut globals = stdlib::global_names();
        globals.extend(self.natives.keys().cloned());
        validate_function(&self.def, &self.source, &globals)
    }

    /// Validate and decorate with the default validation settings.
    pub fn compile(self) -> Result<Do<Program>, DoError> {
        self.compile_with(&ValidationConfig::default())
    }

    /// Validate and decorate. Errors always fail; warnings fail only when
    /// `warnings_as_errors` is set, otherwise they are logged.
    pub fn compile_with(self, config: &ValidationConfig) -> Result<Do<Program>, DoError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(|e| e.is_error());

        if !errors.is_empty() || (config.warnings_as_errors && !warnings.is_empty()) {
            let mut all = errors;
            if config.warnings_as_errors {
                all.extend(warnings);
            }
            return Err(DoError::Validation { errors: all });
        }

        for warning in &warnings {
            warn!(function = %self.def.name, "{}", warning);
        }

        Ok(Do::new(self.def.name.clone(), self))
    }

    fn globals(&self) -> HashMap<String, Val> {
        let mut globals = stdlib::globals();
        globals.extend(self.natives.clone());
        globals
    }
}

impl Suspendable for Program {
    fn arity(&self) -> Option<usize> {
        Some(self.def.params.len())
    }

    fn start(&self, args: &[Val]) -> Result<Yielded, DoError> {
        let locals = self
            .def
            .params
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect();
        drive(VM::new(self.def.body.clone(), self.globals(), locals))
    }
}

/// Run a VM to its next suspension point or to completion.
fn drive(mut vm: VM) -> Result<Yielded, DoError> {
    run_until_done(&mut vm)?;

    match vm.control.clone() {
        Control::Suspend { operand, span } => {
            trace!(%span, "body suspended");
            let snapshot = vm;
            Ok(Yielded::Suspend {
                operand,
                site: Some(span),
                resume: Resume::new(move |value| {
                    let mut vm = snapshot.clone();
                    vm.resume(value);
                    drive(vm)
                }),
            })
        }
        Control::Return(value) => Ok(Yielded::Return(value)),
        // Fell off the end of the body
        Control::None => Ok(Yielded::Return(Val::Null)),
        Control::Break | Control::Continue => Err(ErrorInfo::new(
            errors::INVALID_CONTROL,
            "break or continue outside of a loop",
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monad::{List, Maybe, State};

    #[test]
    fn test_compile_and_run_state() {
        let source = r#"
do function bump(by) {
    let n = yield State.get()
    yield State.put(n + by)
    return State.pure(n)
}
"#;
        let bump = Program::parse(source).unwrap().compile().unwrap();
        assert_eq!(bump.name(), "bump");

        let composed = bump.call(&[Val::Num(2.0)]).unwrap();
        let (ctx, value) = State::from_val(&composed).unwrap().run(Val::Num(5.0)).unwrap();
        assert_eq!(ctx, Val::Num(7.0));
        assert_eq!(value, Val::Num(5.0));
    }

    #[test]
    fn test_multi_shot_resume_with_list() {
        let source = r#"
do function pairs() {
    let a = yield List.of([1, 2])
    let b = yield List.of(["x", "y"])
    return List.pure(a + b)
}
"#;
        let pairs = Program::parse(source).unwrap().compile().unwrap();
        let composed = pairs.call(&[]).unwrap();

        let results = List::from_val(&composed).unwrap().run().unwrap();
        let strings: Vec<String> = results.iter().map(ToString::to_string).collect();
        assert_eq!(strings, vec!["1x", "1y", "2x", "2y"]);
    }

    #[test]
    fn test_loop_state_survives_resume() {
        let source = r#"
do function total(items) {
    let sum = 0
    for (let item of items) {
        let seen = yield State.get()
        yield State.put(seen + 1)
        sum = sum + item
    }
    return State.pure(sum)
}
"#;
        let total = Program::parse(source).unwrap().compile().unwrap();
        let items = Val::List(vec![Val::Num(1.0), Val::Num(2.0), Val::Num(3.0)]);
        let composed = total.call(&[items]).unwrap();

        let (ctx, value) = State::from_val(&composed).unwrap().run(Val::Num(0.0)).unwrap();
        assert_eq!(ctx, Val::Num(3.0));
        assert_eq!(value, Val::Num(6.0));
    }

    #[test]
    fn test_falling_off_the_end_returns_null() {
        let source = "do function f() { yield Maybe.just(1) }";
        let f = Program::parse(source).unwrap().compile().unwrap();

        let composed = Maybe::from_val(&f.call(&[]).unwrap()).unwrap();
        let err = composed.run().unwrap_err();
        assert!(matches!(err, DoError::UnexpectedValue { expected: "Maybe", .. }));
    }

    #[test]
    fn test_natives_shadow_and_extend_globals() {
        let source = "do function f() { return State.pure(double(21)) }";
        let f = Program::parse(source)
            .unwrap()
            .with_native("double", |args| Ok(Val::Num(args[0].as_num().unwrap_or(0.0) * 2.0)))
            .compile()
            .unwrap();

        let composed = State::from_val(&f.call(&[]).unwrap()).unwrap();
        assert_eq!(composed.run(Val::Null).unwrap().1, Val::Num(42.0));
    }

    #[test]
    fn test_validation_errors_block_compile() {
        let source = "do function f() { return missing }";
        let err = Program::parse(source).unwrap().compile().unwrap_err();
        match err {
            DoError::Validation { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].rule_id, "undefined-variable");
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_warnings_as_errors() {
        let source = "do function f() { let unused = 1\n return State.pure(1) }";

        assert!(Program::parse(source).unwrap().compile().is_ok());

        let strict = ValidationConfig {
            warnings_as_errors: true,
        };
        let err = Program::parse(source).unwrap().compile_with(&strict).unwrap_err();
        assert!(matches!(err, DoError::Validation { ref errors } if errors[0].rule_id == "unused-variable"));
    }

    #[test]
    fn test_arity_mismatch() {
        let f = Program::parse("do function f(a, b) { return State.pure(a) }")
            .unwrap()
            .compile()
            .unwrap();
        let err = f.call(&[Val::Null]).unwrap_err();
        assert_eq!(err.to_string(), "'f' expects 2 argument(s), got 1");
    }

    #[test]
    fn test_parameter_named_like_operator() {
        let source = r#"
do function f(add) {
    let n = yield State.get()
    return State.pure(n + add)
}
"#;
        let f = Program::parse(source).unwrap().compile().unwrap();
        let composed = State::from_val(&f.call(&[Val::Num(2.0)]).unwrap()).unwrap();
        assert_eq!(composed.run(Val::Num(40.0)).unwrap().1, Val::Num(42.0));
    }

    #[test]
    fn test_native_named_like_operator() {
        let source = r#"
do function f(x) {
    let mul = "local"
    yield State.put(mul)
    return State.pure(x * 3)
}
"#;
        let f = Program::parse(source)
            .unwrap()
            .with_native("mul", |_| Ok(Val::Str("hijacked".into())))
            .compile()
            .unwrap();
        let composed = State::from_val(&f.call(&[Val::Num(2.0)]).unwrap()).unwrap();
        let (ctx, value) = composed.run(Val::Null).unwrap();
        assert_eq!(ctx, Val::Str("local".into()));
        assert_eq!(value, Val::Num(6.0));
    }

    #[test]
    fn test_many_suspension_points_state() {
        let source = r#"
do function sum(items) {
    for (let item of items) {
        let seen = yield State.get()
        yield State.put(seen + item)
    }
    return State.get()
}
"#;
        let sum = Program::parse(source).unwrap().compile().unwrap();
        let items = Val::List((1..=1000).map(|n| Val::Num(n as f64)).collect());
        let composed = State::from_val(&sum.call(&[items]).unwrap()).unwrap();

        let (ctx, value) = composed.run(Val::Num(0.0)).unwrap();
        assert_eq!(ctx, Val::Num(500_500.0));
        assert_eq!(value, Val::Num(500_500.0));
    }

    #[test]
    fn test_many_suspension_points_maybe_and_list() {
        let source = r#"
do function count(n, unit) {
    let i = 0
    while (i < n) {
        i = yield unit(i + 1)
    }
    return unit(i)
}
"#;
        let count = Program::parse(source).unwrap().compile().unwrap();
        let constructor = |namespace: &str, name: &str| match &stdlib::globals()[namespace] {
            Val::Obj(functions) => functions[name].clone(),
            other => panic!("Expected {} namespace, got {:?}", namespace, other),
        };

        let composed = count
            .call(&[Val::Num(5000.0), constructor("Maybe", "just")])
            .unwrap();
        assert_eq!(
            Maybe::from_val(&composed).unwrap().run().unwrap(),
            Some(Val::Num(5000.0))
        );

        let composed = count
            .call(&[Val::Num(5000.0), constructor("List", "pure")])
            .unwrap();
        assert_eq!(
            List::from_val(&composed).unwrap().run().unwrap(),
            vec![Val::Num(5000.0)]
        );
    }
}
