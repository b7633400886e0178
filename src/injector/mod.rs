//! The injection engine: keyword scanning, value generation, and text
//! composition over a definition store.
//!
//! Scanning walks top-level namespaces in declaration order and matches
//! dotted keywords with word-boundary regexes, so `scan` output order is
//! stable across runs of the same store. Injection either pastes stringified
//! definitions around (or into) the scanned text, or runs the reference
//! pipeline that renames definitions, rewires their mutual references, and
//! emits namespace declaration objects.

mod deps;

use regex::{NoExpand, Regex};

use crate::errors::DefinjectError;
use crate::hooks::Hooks;
use crate::path::IntoDefinitionPath;
use crate::store::{DefineOptions, DefinitionStore};
use crate::tree::export::{Export, Shape, View};
use crate::tree::mutate::set_branch_active;
use crate::value::Value;

// ============================================================================
// OPTIONS
// ============================================================================

/// Where injected definition text lands relative to the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertLocation {
    /// Definitions first, then the original text.
    #[default]
    Start,
    /// Original text first, then the definitions.
    End,
    /// Each keyword occurrence in the text is replaced by its definition;
    /// nothing is prepended or appended.
    Replace,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Reconcile each namespace's active set with the scanned text: the
    /// matched keywords become active, everything else in the namespace
    /// becomes inactive.
    pub overwrite: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    pub overwrite: bool,
    /// Run each stringified value through the minifier hook.
    pub minify: bool,
}

#[derive(Debug, Clone)]
pub struct InjectOptions {
    pub overwrite: bool,
    /// Compose definitions as renamed internal variables referenced through
    /// namespace declaration objects, in dependency order.
    pub reference: bool,
    pub insert_location: InsertLocation,
    /// Joins the definition block and the original text.
    pub separator: String,
    /// Joins individual definitions within the block.
    pub delimiter: String,
    pub minify: bool,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            reference: false,
            insert_location: InsertLocation::Start,
            separator: "\n".to_string(),
            delimiter: "\n".to_string(),
            minify: false,
        }
    }
}

// ============================================================================
// INJECTOR
// ============================================================================

/// A definition store paired with the hooks that turn definitions into text.
///
/// # Examples
///
/// ```rust
/// use definject::{InjectOptions, Injector};
/// let mut injector = Injector::builder()
///     .definition("Num.seven", "const seven = 7;")
///     .build();
/// let output = injector
///     .inject("use(Num.seven);", &InjectOptions::default())
///     .unwrap();
/// assert_eq!(output, "const seven = 7;\nuse(Num.seven);");
/// ```
#[derive(Debug)]
pub struct Injector {
    store: DefinitionStore,
    hooks: Hooks,
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl Injector {
    pub fn new() -> Self {
        Self {
            store: DefinitionStore::new(),
            hooks: Hooks::default(),
        }
    }

    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    pub fn with_store(store: DefinitionStore) -> Self {
        Self {
            store,
            hooks: Hooks::default(),
        }
    }

    pub fn store(&self) -> &DefinitionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DefinitionStore {
        &mut self.store
    }

    // ------------------------------------------------------------------
    // Hook replacement
    // ------------------------------------------------------------------

    pub fn set_stringify(&mut self, f: impl Fn(&Value) -> String + 'static) {
        self.hooks.stringify = Box::new(f);
    }

    pub fn set_declaration_formatter(&mut self, f: impl Fn(&str, &str) -> String + 'static) {
        self.hooks.declaration_formatter = Box::new(f);
    }

    pub fn set_minifier(&mut self, f: impl Fn(&str) -> String + 'static) {
        self.hooks.minifier = Box::new(f);
    }

    pub fn set_variable_name_retriever(&mut self, f: impl Fn(&str) -> Option<String> + 'static) {
        self.hooks.variable_name_retriever = Box::new(f);
    }

    pub fn set_variable_name_replacer(
        &mut self,
        f: impl Fn(&str, &str, &str) -> String + 'static,
    ) {
        self.hooks.variable_name_replacer = Box::new(f);
    }

    // ------------------------------------------------------------------
    // Store surface, delegated
    // ------------------------------------------------------------------

    pub fn define(&mut self, path: impl IntoDefinitionPath, value: impl Into<Value>) {
        self.store.define(path, value);
    }

    pub fn define_with(
        &mut self,
        path: impl IntoDefinitionPath,
        value: impl Into<Value>,
        options: DefineOptions,
    ) {
        self.store.define_with(path, value, options);
    }

    pub fn undefine(&mut self, path: impl IntoDefinitionPath) {
        self.store.undefine(path);
    }

    pub fn undefine_all(&mut self, select: View) {
        self.store.undefine_all(select);
    }

    pub fn activate(&mut self, path: impl IntoDefinitionPath) {
        self.store.activate(path);
    }

    pub fn activate_all(&mut self) {
        self.store.activate_all();
    }

    pub fn deactivate(&mut self, path: impl IntoDefinitionPath) {
        self.store.deactivate(path);
    }

    pub fn deactivate_all(&mut self) {
        self.store.deactivate_all();
    }

    pub fn get(&self, path: impl IntoDefinitionPath, select: View) -> Option<&Value> {
        self.store.get(path, select)
    }

    pub fn has(&self, path: impl IntoDefinitionPath, select: View) -> bool {
        self.store.has(path, select)
    }

    pub fn get_all(&self, select: View, shape: Shape) -> Export {
        self.store.get_all(select, shape)
    }

    // ------------------------------------------------------------------
    // Scan
    // ------------------------------------------------------------------

    /// Finds known definition keywords in `text`, namespace by namespace in
    /// declaration order, first occurrence only.
    ///
    /// Without `overwrite`, only keywords in the active view are reported.
    /// With `overwrite`, each namespace's active set is reconciled with the
    /// text: matched keywords are activated and the rest of the namespace is
    /// deactivated, and every match is reported.
    pub fn scan(&mut self, text: &str, options: &ScanOptions) -> Vec<String> {
        if !options.overwrite {
            return self.scan_active(text);
        }

        let namespaces: Vec<String> = self.store.namespaces().cloned().collect();
        let mut keywords = Vec::new();
        for namespace in namespaces {
            let matches = self.matches_in_namespace(&namespace, text);
            if let Some(branch) = self.store.root_mut().children.get_mut(&namespace) {
                set_branch_active(branch, false);
            }
            for keyword in &matches {
                self.store.activate(keyword.as_str());
            }
            keywords.extend(matches);
        }
        keywords
    }

    /// [`Self::scan`], joined with `delimiter`.
    pub fn scan_joined(&mut self, text: &str, delimiter: &str, options: &ScanOptions) -> String {
        self.scan(text, options).join(delimiter)
    }

    fn scan_active(&self, text: &str) -> Vec<String> {
        let mut keywords = Vec::new();
        for namespace in self.store.namespaces() {
            for keyword in self.matches_in_namespace(namespace, text) {
                if self.store.has(keyword.as_str(), View::Active) {
                    keywords.push(keyword);
                }
            }
        }
        keywords
    }

    /// Word-boundary matches of `<namespace>(.segment)*` in `text` that name
    /// a node the store knows, deduplicated to first occurrence.
    fn matches_in_namespace(&self, namespace: &str, text: &str) -> Vec<String> {
        let pattern = format!(r"\b{}(\.\w+)*", regex::escape(namespace));
        let Ok(re) = Regex::new(&pattern) else {
            return Vec::new();
        };
        let mut matches = Vec::new();
        for found in re.find_iter(text) {
            let keyword = found.as_str();
            if matches.iter().any(|m| m == keyword) {
                continue;
            }
            if self.store.has(keyword, View::All) {
                matches.push(keyword.to_string());
            }
        }
        matches
    }

    // ------------------------------------------------------------------
    // Generate
    // ------------------------------------------------------------------

    /// The active-view values behind the keywords [`Self::scan`] finds in
    /// `text`, in scan order. Namespace-only matches carry no value and are
    /// skipped.
    pub fn generate(&mut self, text: &str, options: &GenerateOptions) -> Vec<Value> {
        let scan_options = ScanOptions {
            overwrite: options.overwrite,
        };
        self.scan(text, &scan_options)
            .iter()
            .filter_map(|keyword| self.store.get(keyword.as_str(), View::Active).cloned())
            .collect()
    }

    /// [`Self::generate`], stringified and joined with `delimiter`. The
    /// minifier, when requested, runs on the joined string.
    pub fn generate_joined(
        &mut self,
        text: &str,
        delimiter: &str,
        options: &GenerateOptions,
    ) -> String {
        let values = self.generate(text, options);
        let joined = values
            .iter()
            .map(|value| (self.hooks.stringify)(value))
            .collect::<Vec<_>>()
            .join(delimiter);
        if options.minify {
            (self.hooks.minifier)(&joined)
        } else {
            joined
        }
    }

    // ------------------------------------------------------------------
    // Inject
    // ------------------------------------------------------------------

    /// Composes the definitions scanned from `text` with the text itself.
    ///
    /// Plain mode stringifies each scanned definition, joins them with
    /// `delimiter` (minified as a whole when requested), and places the block
    /// per `insert_location`. `Replace` substitutes each keyword occurrence
    /// in the text instead. Reference mode (everything but `Replace`) runs
    /// the dependency pipeline instead of pasting definitions verbatim.
    pub fn inject(&mut self, text: &str, options: &InjectOptions) -> Result<String, DefinjectError> {
        let scan_options = ScanOptions {
            overwrite: options.overwrite,
        };
        let keywords = self.scan(text, &scan_options);

        if options.reference && options.insert_location != InsertLocation::Replace {
            return self.inject_with_references(text, &keywords, options);
        }

        let entries: Vec<(String, String)> = keywords
            .iter()
            .filter_map(|keyword| {
                self.store
                    .get(keyword.as_str(), View::Active)
                    .map(|value| (keyword.clone(), (self.hooks.stringify)(value)))
            })
            .collect();

        if options.insert_location == InsertLocation::Replace {
            let mut result = text.to_string();
            for (keyword, source) in &entries {
                let pattern = format!(r"\b{}\b", regex::escape(keyword));
                let Ok(re) = Regex::new(&pattern) else {
                    continue;
                };
                result = re.replace_all(&result, NoExpand(source)).into_owned();
            }
            return Ok(result);
        }

        let block = entries
            .iter()
            .map(|(_, source)| source.as_str())
            .collect::<Vec<_>>()
            .join(&options.delimiter);
        let block = if options.minify {
            (self.hooks.minifier)(&block)
        } else {
            block
        };
        Ok(assemble(vec![block], text, options))
    }
}

/// Joins the definition blocks and the original text per the insert
/// location, skipping empty pieces so separators never dangle.
pub(crate) fn assemble(blocks: Vec<String>, text: &str, options: &InjectOptions) -> String {
    let mut pieces: Vec<String> = Vec::with_capacity(blocks.len() + 1);
    match options.insert_location {
        InsertLocation::Start => {
            pieces.extend(blocks);
            pieces.push(text.to_string());
        }
        InsertLocation::End | InsertLocation::Replace => {
            pieces.push(text.to_string());
            pieces.extend(blocks);
        }
    }
    pieces.retain(|piece| !piece.is_empty());
    pieces.join(&options.separator)
}

// ============================================================================
// BUILDER
// ============================================================================

/// Assembles an [`Injector`] from seed definitions and hook overrides.
#[derive(Debug, Default)]
pub struct InjectorBuilder {
    store: DefinitionStore,
    hooks: Hooks,
}

impl InjectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing store instead of an empty one.
    pub fn store(mut self, store: DefinitionStore) -> Self {
        self.store = store;
        self
    }

    /// Adds one activated definition.
    pub fn definition(mut self, path: impl IntoDefinitionPath, value: impl Into<Value>) -> Self {
        self.store.define(path, value);
        self
    }

    /// Adds one definition with an explicit activation flag.
    pub fn definition_with(
        mut self,
        path: impl IntoDefinitionPath,
        value: impl Into<Value>,
        options: DefineOptions,
    ) -> Self {
        self.store.define_with(path, value, options);
        self
    }

    pub fn stringify(mut self, f: impl Fn(&Value) -> String + 'static) -> Self {
        self.hooks.stringify = Box::new(f);
        self
    }

    pub fn declaration_formatter(mut self, f: impl Fn(&str, &str) -> String + 'static) -> Self {
        self.hooks.declaration_formatter = Box::new(f);
        self
    }

    pub fn minifier(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.hooks.minifier = Box::new(f);
        self
    }

    pub fn variable_name_retriever(mut self, f: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.hooks.variable_name_retriever = Box::new(f);
        self
    }

    pub fn variable_name_replacer(
        mut self,
        f: impl Fn(&str, &str, &str) -> String + 'static,
    ) -> Self {
        self.hooks.variable_name_replacer = Box::new(f);
        self
    }

    pub fn build(self) -> Injector {
        Injector {
            store: self.store,
            hooks: self.hooks,
        }
    }
}
