//! Runtime value types

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value as JsonValue;

use super::super::errors::{self, ErrorInfo};
use crate::error::DoError;
use crate::monad::MonadValue;

/// Signature of a host function callable from a body
pub type NativeImpl = dyn Fn(&[Val]) -> Result<Val, DoError>;

/// Runtime value type
#[derive(Debug, Clone)]
pub enum Val {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Val>),
    /// Insertion ordered, duplicate free. Equality ignores order.
    Set(Vec<Val>),
    Obj(HashMap<String, Val>),
    Native(NativeFn),
    /// Capability-conforming value: the only kind a `yield` accepts
    Monad(MonadValue),
}

impl Val {
    /// Check if value is truthy (for conditionals)
    pub fn is_truthy(&self) -> bool {
        match self {
            Val::Bool(b) => *b,
            Val::Null => false,
            _ => true,
        }
    }

    /// Name of the value's type as seen from a body
    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Null => "null",
            Val::Bool(_) => "boolean",
            Val::Num(_) => "number",
            Val::Str(_) => "string",
            Val::List(_) => "list",
            Val::Set(_) => "set",
            Val::Obj(_) => "object",
            Val::Native(_) => "function",
            Val::Monad(_) => "monad",
        }
    }

    /// Short description used in error messages, e.g. "number `5`"
    pub fn describe(&self) -> String {
        match self {
            Val::Null => "null".to_string(),
            Val::Monad(m) => format!("a {} monad", m.family()),
            Val::Native(f) => format!("function `{}`", f.name()),
            other => format!("{} `{}`", other.type_name(), other),
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Val::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Val::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_monad(&self) -> Option<&MonadValue> {
        match self {
            Val::Monad(m) => Some(m),
            _ => None,
        }
    }

    /// Build a set value, dropping duplicates while keeping first-seen order
    pub fn set_of(items: impl IntoIterator<Item = Val>) -> Val {
        let mut out: Vec<Val> = Vec::new();
        for item in items {
            if !out.contains(&item) {
                out.push(item);
            }
        }
        Val::Set(out)
    }

    /// Convert a JSON value (CLI arguments, contexts) into a runtime value
    pub fn from_json(json: &JsonValue) -> Val {
        match json {
            JsonValue::Null => Val::Null,
            JsonValue::Bool(b) => Val::Bool(*b),
            JsonValue::Number(n) => Val::Num(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Val::Str(s.clone()),
            JsonValue::Array(items) => Val::List(items.iter().map(Val::from_json).collect()),
            JsonValue::Object(map) => Val::Obj(
                map.iter()
                    .map(|(k, v)| (k.clone(), Val::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert back to JSON. Sets become arrays; functions and monads have
    /// no JSON form.
    pub fn to_json(&self) -> Result<JsonValue, DoError> {
        Ok(match self {
            Val::Null => JsonValue::Null,
            Val::Bool(b) => JsonValue::Bool(*b),
            Val::Num(n) => num_to_json(*n),
            Val::Str(s) => JsonValue::String(s.clone()),
            Val::List(items) | Val::Set(items) => JsonValue::Array(
                items
                    .iter()
                    .map(Val::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Val::Obj(map) => {
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json()?);
                }
                JsonValue::Object(out)
            }
            Val::Native(_) | Val::Monad(_) => {
                return Err(ErrorInfo::new(
                    errors::NOT_SERIALIZABLE,
                    format!("{} has no JSON representation", self.describe()),
                )
                .into())
            }
        })
    }
}

fn num_to_json(n: f64) -> JsonValue {
    if is_integral(n) {
        JsonValue::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15
}

impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Val::Null, Val::Null) => true,
            (Val::Bool(a), Val::Bool(b)) => a == b,
            (Val::Num(a), Val::Num(b)) => a == b,
            (Val::Str(a), Val::Str(b)) => a == b,
            (Val::List(a), Val::List(b)) => a == b,
            (Val::Set(a), Val::Set(b)) => {
                a.iter().all(|v| b.contains(v)) && b.iter().all(|v| a.contains(v))
            }
            (Val::Obj(a), Val::Obj(b)) => a == b,
            (Val::Native(a), Val::Native(b)) => a.ptr_eq(b),
            (Val::Monad(a), Val::Monad(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Null => write!(f, "null"),
            Val::Bool(b) => write!(f, "{}", b),
            Val::Num(n) if is_integral(*n) => write!(f, "{}", *n as i64),
            Val::Num(n) => write!(f, "{}", n),
            Val::Str(s) => write!(f, "{}", s),
            Val::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Val::Set(items) => {
                write!(f, "{{")?;
                write_items(f, items)?;
                write!(f, "}}")
            }
            Val::Obj(map) => {
                let mut keys: Vec<_> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, map[key])?;
                }
                write!(f, "}}")
            }
            Val::Native(func) => write!(f, "<function {}>", func.name()),
            Val::Monad(m) => write!(f, "<{} monad>", m.family()),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Val]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl From<MonadValue> for Val {
    fn from(m: MonadValue) -> Self {
        Val::Monad(m)
    }
}

/* ===================== Host Functions ===================== */

/// A Rust function exposed to bodies under a name
#[derive(Clone)]
pub struct NativeFn {
    name: Rc<str>,
    func: Rc<NativeImpl>,
}

impl NativeFn {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&[Val]) -> Result<Val, DoError> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name.into()),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Val]) -> Result<Val, DoError> {
        (self.func)(args)
    }

    fn ptr_eq(&self, other: &NativeFn) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeFn").field(&self.name).finish()
    }
}
