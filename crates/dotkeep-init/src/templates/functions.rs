//! Named functions available to config templates
//!
//! `TemplateFunctions` maps a function name to a `tera::Function`. Inserting
//! a name that already exists replaces the earlier function, which is how the
//! prompt functions layer on top of the defaults.

use crate::prompt::Prompter;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeMap, HashMap};
use std::process::Command;
use std::sync::Arc;
use tera::{Function, Tera, Value};

type FunctionArgs = HashMap<String, Value>;

/// Registry of template functions keyed by name
#[derive(Clone, Default)]
pub struct TemplateFunctions {
    functions: BTreeMap<String, Arc<dyn Function>>,
}

impl std::fmt::Debug for TemplateFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

impl TemplateFunctions {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `name`, returning the function it replaced
    pub fn insert<F>(&mut self, name: impl Into<String>, function: F) -> Option<Arc<dyn Function>>
    where
        F: Function + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function))
    }

    /// Merge `other` into this registry; `other` wins on name collisions
    pub fn extend(&mut self, other: TemplateFunctions) {
        self.functions.extend(other.functions);
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Install every function into a Tera instance
    pub fn register(&self, tera: &mut Tera) {
        for (name, function) in &self.functions {
            let function = Arc::clone(function);
            tera.register_function(name, move |args: &FunctionArgs| function.call(args));
        }
    }

    /// Default functions: `include`, `look_path` and `output`
    pub fn defaults(source_dir: &Utf8Path) -> Self {
        let mut functions = Self::new();

        let include_root = source_dir.to_owned();
        functions.insert("include", move |args: &FunctionArgs| {
            include(&include_root, args)
        });

        functions.insert("look_path", look_path);

        let output_dir = source_dir.to_owned();
        functions.insert("output", move |args: &FunctionArgs| output(&output_dir, args));

        functions
    }

    /// Prompt functions backed by `prompter`
    pub fn prompts(prompter: Arc<Prompter>) -> Self {
        let mut functions = Self::new();

        let p = Arc::clone(&prompter);
        functions.insert("prompt_string", move |args: &FunctionArgs| {
            let field = required_str("prompt_string", args, "field")?;
            p.prompt_string(field).map(Value::String).map_err(tera::Error::msg)
        });

        let p = Arc::clone(&prompter);
        functions.insert("prompt_bool", move |args: &FunctionArgs| {
            let field = required_str("prompt_bool", args, "field")?;
            p.prompt_bool(field).map(Value::Bool).map_err(tera::Error::msg)
        });

        let p = Arc::clone(&prompter);
        functions.insert("prompt_int", move |args: &FunctionArgs| {
            let field = required_str("prompt_int", args, "field")?;
            p.prompt_int(field).map(Value::from).map_err(tera::Error::msg)
        });

        functions.insert("stdin_is_a_tty", move |_: &FunctionArgs| {
            Ok(Value::Bool(prompter.is_interactive()))
        });

        functions
    }

    /// Defaults for `source_dir` with the prompt functions layered on top
    pub fn standard(source_dir: &Utf8Path, prompter: Arc<Prompter>) -> Self {
        let mut functions = Self::defaults(source_dir);
        functions.extend(Self::prompts(prompter));
        functions
    }
}

/// Fetch a required string argument
fn required_str<'a>(function: &str, args: &'a FunctionArgs, key: &str) -> tera::Result<&'a str> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(tera::Error::msg(format!(
            "{function}: argument `{key}` must be a string, got {other}"
        ))),
        None => Err(tera::Error::msg(format!(
            "{function}: missing required argument `{key}`"
        ))),
    }
}

/// `include(path=..)`: file contents, relative paths resolved against the source directory
fn include(source_dir: &Utf8Path, args: &FunctionArgs) -> tera::Result<Value> {
    let path = Utf8PathBuf::from(required_str("include", args, "path")?);
    let full_path = if path.is_absolute() {
        path
    } else {
        source_dir.join(path)
    };

    std::fs::read_to_string(&full_path)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("include: {full_path}: {e}")))
}

/// `look_path(file=..)`: absolute path of an executable, empty when not found
fn look_path(args: &FunctionArgs) -> tera::Result<Value> {
    let file = required_str("look_path", args, "file")?;
    let found = which::which(file)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Value::String(found))
}

/// `output(command=.., args=[..])`: stdout of a command run in the source directory
fn output(source_dir: &Utf8Path, args: &FunctionArgs) -> tera::Result<Value> {
    let command = required_str("output", args, "command")?;
    let command_args: Vec<String> = match args.get("args") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(other) => {
            return Err(tera::Error::msg(format!(
                "output: argument `args` must be an array, got {other}"
            )))
        }
    };

    let mut cmd = Command::new(command);
    cmd.args(&command_args);
    if source_dir.is_dir() {
        cmd.current_dir(source_dir);
    }

    let result = cmd
        .output()
        .map_err(|e| tera::Error::msg(format!("output: {command}: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(tera::Error::msg(format!(
            "output: {command} exited with {}: {}",
            result.status,
            stderr.trim()
        )));
    }

    Ok(Value::String(
        String::from_utf8_lossy(&result.stdout).into_owned(),
    ))
}
