//! Interpreter for the custom-code source type.
//!
//! A custom-code snippet is a small program of `fn` definitions and `let`
//! bindings. Running it calls the entry function with no arguments and
//! returns the produced [`Value`]. Only the built-in library is reachable:
//! there is no access to files, processes or the network, and every random
//! draw goes through the generator's random source.

mod builtins;
mod eval;
mod lexer;
mod parser;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use casegen_core::format_float;
use thiserror::Error;

use self::eval::Interpreter;
use self::parser::Program;

/// Preferred entry point name.
pub const ENTRY_POINT: &str = "generate_data";
/// Prefix used to find an entry point when `generate_data` is absent.
pub const ENTRY_PREFIX: &str = "generate";
/// Maximum nesting of user function calls.
pub const MAX_CALL_DEPTH: usize = 64;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScriptError {
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("no entry point: define 'generate_data' or a function whose name starts with 'generate'")]
    MissingEntryPoint,
    #[error("entry point '{0}' must not take parameters")]
    EntryPointParameters(String),
    #[error("unknown name '{0}'")]
    UnknownName(String),
    #[error("{name}() expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },
    #[error("type error: {0}")]
    Type(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("call depth exceeded {0}")]
    RecursionLimit(usize),
}

/// Runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<Value>),
    /// Reference to a user function or builtin by name.
    Func(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Func(_) => "function",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Str(value) => !value.is_empty(),
            Value::Bool(value) => *value,
            Value::List(items) => !items.is_empty(),
            Value::Func(_) => true,
        }
    }

    fn write_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(value) => write!(f, "'{value}'"),
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => f.write_str(&format_float(*value)),
            Value::Str(value) => f.write_str(value),
            Value::Bool(value) => write!(f, "{value}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    item.write_nested(f)?;
                }
                f.write_str("]")
            }
            Value::Func(name) => write!(f, "<fn {name}>"),
        }
    }
}

/// A compiled custom-code program.
#[derive(Debug, Clone)]
pub struct Script {
    program: Program,
    entry: String,
}

impl Script {
    pub fn compile(source: &str) -> Result<Self, ScriptError> {
        let tokens = lexer::tokenize(source)?;
        let program = parser::parse(tokens)?;

        let entry = program
            .function(ENTRY_POINT)
            .or_else(|| {
                program
                    .functions
                    .iter()
                    .find(|def| def.name.starts_with(ENTRY_PREFIX))
            })
            .ok_or(ScriptError::MissingEntryPoint)?;
        if !entry.params.is_empty() {
            return Err(ScriptError::EntryPointParameters(entry.name.clone()));
        }
        let entry = entry.name.clone();

        Ok(Self { program, entry })
    }

    pub fn entry_name(&self) -> &str {
        &self.entry
    }

    /// Evaluate the top-level bindings, then call the entry point.
    pub fn run(&self, rng: &mut dyn rand::RngCore) -> Result<Value, ScriptError> {
        let mut interpreter = Interpreter::new(&self.program, rng);
        interpreter.bind_globals()?;
        interpreter.call(&self.entry, Vec::new())
    }
}

/// Compiled scripts keyed by their source text.
#[derive(Debug, Default)]
pub struct ScriptCache {
    scripts: HashMap<String, Script>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&mut self, source: &str) -> Result<&Script, ScriptError> {
        match self.scripts.entry(source.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let script = Script::compile(source)?;
                Ok(entry.insert(script))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
