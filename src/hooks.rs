//! User-overridable behaviors for the injector, held by composition.
//!
//! The four formatting/renaming behaviors plus stringification are modeled
//! as an explicit strategy struct the injector owns. Defaults target
//! JS-like snippet payloads; callers replace any of them at construction
//! through [`crate::InjectorBuilder`] or later through the injector's
//! `set_*` methods. There is no process-wide mutable default.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::value::Value;

pub type StringifyFn = Box<dyn Fn(&Value) -> String>;
pub type DeclarationFormatterFn = Box<dyn Fn(&str, &str) -> String>;
pub type MinifierFn = Box<dyn Fn(&str) -> String>;
pub type VariableNameRetrieverFn = Box<dyn Fn(&str) -> Option<String>>;
pub type VariableNameReplacerFn = Box<dyn Fn(&str, &str, &str) -> String>;

/// The injector's strategy record.
pub struct Hooks {
    /// Renders a definition value as text.
    pub stringify: StringifyFn,
    /// Formats one namespace declaration from its name and the stringified
    /// member branch.
    pub declaration_formatter: DeclarationFormatterFn,
    /// Post-processes joined definition text when minification is requested.
    pub minifier: MinifierFn,
    /// Extracts the first declared identifier from a definition's source.
    pub variable_name_retriever: VariableNameRetrieverFn,
    /// Rewrites the first declaration of `old` in a definition's source to
    /// declare `new` instead.
    pub variable_name_replacer: VariableNameReplacerFn,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            stringify: Box::new(default_stringify),
            declaration_formatter: Box::new(default_declaration_formatter),
            minifier: Box::new(default_minifier),
            variable_name_retriever: Box::new(default_variable_name_retriever),
            variable_name_replacer: Box::new(default_variable_name_replacer),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

// First `var|const|let|function NAME` declaration in a snippet.
static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:var|const|let|function)[\s\r\n]+(\w+)").expect("declaration pattern")
});

/// Default stringification: strings verbatim, booleans and numbers via
/// their display forms (integral floats without the trailing `.0`), maps as
/// inline JSON.
pub fn default_stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::Map(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Default declaration format: `var <namespace> = <branch>;`.
pub fn default_declaration_formatter(namespace: &str, branch: &str) -> String {
    format!("var {namespace} = {branch};")
}

/// Default minifier: identity.
pub fn default_minifier(text: &str) -> String {
    text.to_string()
}

/// Default identifier extraction: the name bound by the first
/// `var|const|let|function` declaration, if any.
pub fn default_variable_name_retriever(source: &str) -> Option<String> {
    DECLARATION_RE
        .captures(source)
        .map(|captures| captures[1].to_string())
}

/// Default identifier rewrite: renames the first declaration of `old_name`,
/// leaving later uses untouched (those are rewritten keyword-by-keyword by
/// the reference pipeline).
pub fn default_variable_name_replacer(source: &str, old_name: &str, new_name: &str) -> String {
    let pattern = format!(
        r"(var|const|let|function)[\s\r\n]+{}",
        regex::escape(old_name)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return source.to_string();
    };
    re.replace(source, |captures: &Captures| {
        format!("{} {}", &captures[1], new_name)
    })
    .into_owned()
}
