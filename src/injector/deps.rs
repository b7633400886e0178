//! Reference-mode composition: dependency discovery, topological ordering,
//! collision-free renaming, cross-reference rewriting, and namespace
//! declaration formatting.
//!
//! Every collection here is insertion-ordered, so the emitted program is
//! deterministic: independent definitions keep scan order, and the ready
//! queue of the topological sort drains in discovery order.

use std::collections::VecDeque;

use indexmap::IndexMap;
use regex::{NoExpand, Regex};

use super::{assemble, InjectOptions, Injector};
use crate::errors::DefinjectError;
use crate::tree::export::View;

/// A definition pulled into the composition, before renaming.
struct DefinitionEntry {
    source: String,
    /// Keywords of other definitions this source mentions, in scan order.
    dependencies: Vec<String>,
}

/// A definition after renaming, ready for cross-reference rewriting.
struct ProcessedDefinition {
    external_keyword: String,
    internal_name: String,
    source: String,
    dependencies: Vec<String>,
}

/// The member tree of one namespace declaration. Leaves are internal
/// variable names; branches are nested member maps.
enum ReferenceBranch {
    Leaf(String),
    Branch(IndexMap<String, ReferenceBranch>),
}

impl Injector {
    /// Composes `keywords` as a dependency-ordered program: each definition
    /// is bound to a fresh internal variable, references between definitions
    /// are rewired to those variables, and each namespace gets a declaration
    /// mapping external member paths to the internal names.
    pub(super) fn inject_with_references(
        &self,
        text: &str,
        keywords: &[String],
        options: &InjectOptions,
    ) -> Result<String, DefinjectError> {
        let (entries, edges) = self.collect_entries(keywords);
        let order = topological_order(&entries, &edges)?;
        let mut processed = self.rename_definitions(&entries, &order)?;
        rewrite_cross_references(&mut processed);

        // Declarations cover transitively pulled definitions too, in
        // discovery order, so rewired sources always have a binding.
        let appearance: Vec<String> = entries.keys().cloned().collect();
        let declarations = self.format_declarations(&appearance, &processed);

        let sources = processed
            .iter()
            .map(|def| def.source.as_str())
            .collect::<Vec<_>>()
            .join(&options.delimiter);
        let sources = if options.minify {
            (self.hooks.minifier)(&sources)
        } else {
            sources
        };

        let mut blocks = vec![sources];
        blocks.extend(declarations);
        Ok(assemble(blocks, text, options))
    }

    /// Breadth-first closure over the scanned keywords: stringify each
    /// definition, scan its source for further active keywords, and record
    /// dependency edges. Namespace-only keywords carry no value and drop out.
    fn collect_entries(
        &self,
        keywords: &[String],
    ) -> (IndexMap<String, DefinitionEntry>, Vec<(String, String)>) {
        let mut entries: IndexMap<String, DefinitionEntry> = IndexMap::new();
        let mut edges: Vec<(String, String)> = Vec::new();
        let mut queue: VecDeque<String> = keywords.iter().cloned().collect();

        while let Some(keyword) = queue.pop_front() {
            if entries.contains_key(&keyword) {
                continue;
            }
            let Some(value) = self.store().get(keyword.as_str(), View::Active) else {
                continue;
            };
            let source = (self.hooks.stringify)(value);
            let dependencies = self.scan_active(&source);
            for dependency in &dependencies {
                // A definition mentioning its own keyword is rewired in
                // place, not ordered against itself.
                if dependency != &keyword {
                    edges.push((dependency.clone(), keyword.clone()));
                    queue.push_back(dependency.clone());
                }
            }
            entries.insert(
                keyword,
                DefinitionEntry {
                    source,
                    dependencies,
                },
            );
        }
        (entries, edges)
    }

    /// Binds each ordered definition to a fresh `_<name><n>` internal
    /// variable via the retriever and replacer hooks. Per-name counters start
    /// at 0, so two definitions both declaring `x` become `_x0` and `_x1`.
    fn rename_definitions(
        &self,
        entries: &IndexMap<String, DefinitionEntry>,
        order: &[String],
    ) -> Result<Vec<ProcessedDefinition>, DefinjectError> {
        let mut counters: IndexMap<String, usize> = IndexMap::new();
        let mut processed = Vec::with_capacity(order.len());

        for keyword in order {
            let entry = &entries[keyword];
            let name = (self.hooks.variable_name_retriever)(&entry.source)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| DefinjectError::InvalidIdentifier {
                    keyword: keyword.clone(),
                })?;
            let count = *counters
                .entry(name.clone())
                .and_modify(|count| *count += 1)
                .or_insert(0);
            let internal_name = format!("_{name}{count}");
            let source = (self.hooks.variable_name_replacer)(&entry.source, &name, &internal_name);
            processed.push(ProcessedDefinition {
                external_keyword: keyword.clone(),
                internal_name,
                source,
                dependencies: entry.dependencies.clone(),
            });
        }
        Ok(processed)
    }

    /// One declaration per namespace, in the keywords' first-appearance
    /// order, each rendered through the declaration formatter hook.
    fn format_declarations(
        &self,
        keywords: &[String],
        processed: &[ProcessedDefinition],
    ) -> Vec<String> {
        let internal_by_keyword: IndexMap<&str, &str> = processed
            .iter()
            .map(|def| (def.external_keyword.as_str(), def.internal_name.as_str()))
            .collect();

        let mut namespaces: IndexMap<String, ReferenceBranch> = IndexMap::new();
        for keyword in keywords {
            let Some(internal_name) = internal_by_keyword.get(keyword.as_str()) else {
                continue;
            };
            let segments: Vec<&str> = keyword.split('.').collect();
            insert_reference(&mut namespaces, &segments, internal_name);
        }

        namespaces
            .iter()
            .map(|(namespace, branch)| {
                (self.hooks.declaration_formatter)(namespace, &render_reference(branch))
            })
            .collect()
    }
}

/// Kahn's algorithm over insertion-ordered maps. Edges run dependency to
/// dependent, so dependencies are emitted first. A non-empty remainder means
/// a cycle; its keywords are reported in discovery order.
fn topological_order(
    entries: &IndexMap<String, DefinitionEntry>,
    edges: &[(String, String)],
) -> Result<Vec<String>, DefinjectError> {
    let mut indegree: IndexMap<&str, usize> =
        entries.keys().map(|keyword| (keyword.as_str(), 0)).collect();
    let mut adjacency: IndexMap<&str, Vec<&str>> =
        entries.keys().map(|keyword| (keyword.as_str(), Vec::new())).collect();

    for (dependency, dependent) in edges {
        if !entries.contains_key(dependency) || !entries.contains_key(dependent) {
            continue;
        }
        let neighbors = adjacency
            .entry(dependency.as_str())
            .or_default();
        if !neighbors.contains(&dependent.as_str()) {
            neighbors.push(dependent.as_str());
            if let Some(count) = indegree.get_mut(dependent.as_str()) {
                *count += 1;
            }
        }
    }

    let mut ready: VecDeque<&str> = indegree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(keyword, _)| *keyword)
        .collect();
    let mut order = Vec::with_capacity(entries.len());

    while let Some(keyword) = ready.pop_front() {
        order.push(keyword.to_string());
        for neighbor in &adjacency[keyword] {
            let Some(count) = indegree.get_mut(neighbor) else {
                continue;
            };
            *count -= 1;
            if *count == 0 {
                ready.push_back(*neighbor);
            }
        }
    }

    if order.len() != entries.len() {
        let cycle = indegree
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(keyword, _)| keyword.to_string())
            .collect();
        return Err(DefinjectError::CyclicDependency { cycle });
    }
    Ok(order)
}

/// Rewrites each definition's mentions of its dependencies' external
/// keywords into their internal variable names.
fn rewrite_cross_references(processed: &mut [ProcessedDefinition]) {
    let internal_by_keyword: IndexMap<String, String> = processed
        .iter()
        .map(|def| (def.external_keyword.clone(), def.internal_name.clone()))
        .collect();

    for def in processed {
        let dependencies = def.dependencies.clone();
        for dependency in dependencies {
            let Some(internal_name) = internal_by_keyword.get(&dependency) else {
                continue;
            };
            let pattern = format!(r"\b{}\b", regex::escape(&dependency));
            let Ok(re) = Regex::new(&pattern) else {
                continue;
            };
            def.source = re
                .replace_all(&def.source, NoExpand(internal_name))
                .into_owned();
        }
    }
}

/// Inserts one keyword path into the namespace member trees. A single-segment
/// keyword is a bare top-level binding; deeper paths become nested members.
/// A branch position always wins over a previously inserted leaf.
fn insert_reference(
    namespaces: &mut IndexMap<String, ReferenceBranch>,
    segments: &[&str],
    internal_name: &str,
) {
    let [namespace, members @ ..] = segments else {
        return;
    };
    if members.is_empty() {
        namespaces.insert(
            namespace.to_string(),
            ReferenceBranch::Leaf(internal_name.to_string()),
        );
        return;
    }

    let entry = namespaces
        .entry(namespace.to_string())
        .or_insert_with(|| ReferenceBranch::Branch(IndexMap::new()));
    if let ReferenceBranch::Leaf(_) = entry {
        *entry = ReferenceBranch::Branch(IndexMap::new());
    }

    let mut current = entry;
    for (index, member) in members.iter().enumerate() {
        let ReferenceBranch::Branch(children) = current else {
            return;
        };
        if index == members.len() - 1 {
            children.insert(
                member.to_string(),
                ReferenceBranch::Leaf(internal_name.to_string()),
            );
            return;
        }
        let child = children
            .entry(member.to_string())
            .or_insert_with(|| ReferenceBranch::Branch(IndexMap::new()));
        if let ReferenceBranch::Leaf(_) = child {
            *child = ReferenceBranch::Branch(IndexMap::new());
        }
        current = child;
    }
}

/// Renders a member tree as an unquoted-identifier object literal, or the
/// bare internal name for a top-level binding.
fn render_reference(branch: &ReferenceBranch) -> String {
    match branch {
        ReferenceBranch::Leaf(internal_name) => internal_name.clone(),
        ReferenceBranch::Branch(children) => {
            let members: Vec<String> = children
                .iter()
                .map(|(member, child)| format!("{}: {}", member, render_reference(child)))
                .collect();
            format!("{{ {} }}", members.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, dependencies: &[&str]) -> DefinitionEntry {
        DefinitionEntry {
            source: source.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn topological_order_puts_dependencies_first() {
        let mut entries = IndexMap::new();
        entries.insert("A".to_string(), entry("var a = B;", &["B"]));
        entries.insert("B".to_string(), entry("var b = C;", &["C"]));
        entries.insert("C".to_string(), entry("var c = 1;", &[]));
        let edges = vec![
            ("B".to_string(), "A".to_string()),
            ("C".to_string(), "B".to_string()),
        ];

        let order = topological_order(&entries, &edges).unwrap();
        assert_eq!(order, ["C", "B", "A"]);
    }

    #[test]
    fn independent_definitions_keep_insertion_order() {
        let mut entries = IndexMap::new();
        entries.insert("X".to_string(), entry("var x = 1;", &[]));
        entries.insert("Y".to_string(), entry("var y = 2;", &[]));

        let order = topological_order(&entries, &[]).unwrap();
        assert_eq!(order, ["X", "Y"]);
    }

    #[test]
    fn cycle_is_reported_with_its_members() {
        let mut entries = IndexMap::new();
        entries.insert("A".to_string(), entry("var a = B;", &["B"]));
        entries.insert("B".to_string(), entry("var b = A;", &["A"]));
        let edges = vec![
            ("B".to_string(), "A".to_string()),
            ("A".to_string(), "B".to_string()),
        ];

        let err = topological_order(&entries, &edges).unwrap_err();
        match err {
            DefinjectError::CyclicDependency { cycle } => {
                assert_eq!(cycle, ["A", "B"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nested_members_render_as_object_literals() {
        let mut namespaces = IndexMap::new();
        insert_reference(&mut namespaces, &["Array", "map"], "_map0");
        insert_reference(&mut namespaces, &["Array", "sort", "quick"], "_quick0");

        let rendered = render_reference(&namespaces["Array"]);
        assert_eq!(rendered, "{ map: _map0, sort: { quick: _quick0 } }");
    }

    #[test]
    fn top_level_keyword_renders_bare() {
        let mut namespaces = IndexMap::new();
        insert_reference(&mut namespaces, &["JsConstant"], "_num0");
        assert_eq!(render_reference(&namespaces["JsConstant"]), "_num0");
    }
}
