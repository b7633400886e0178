//! Generic tree traversals shared by the mutator and the exporter.
//!
//! Two walk directions cover every aggregate query and branch-wide mutation
//! in the crate: a post-order dive that folds children results into the
//! parent visit, and an iterative bubble over path prefixes (implemented in
//! [`super::mutate`], since bubbling always mutates through the parent's
//! child map).

use super::DefinitionNode;

/// Post-order traversal. Children are visited first; their results are
/// handed to the parent's visit as an aggregation vector.
pub fn dive<T>(node: &DefinitionNode, visit: &mut impl FnMut(&DefinitionNode, Vec<T>) -> T) -> T {
    let mut child_results = Vec::with_capacity(node.children.len());
    for child in node.children.values() {
        child_results.push(dive(child, visit));
    }
    visit(node, child_results)
}

/// Pre-order mutating traversal over a whole subtree.
pub fn dive_mut(node: &mut DefinitionNode, visit: &mut impl FnMut(&mut DefinitionNode)) {
    visit(node);
    for child in node.children.values_mut() {
        dive_mut(child, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn leaf(keyword: &str, active: bool) -> DefinitionNode {
        DefinitionNode::new(keyword, Some(Value::from("v")), active)
    }

    #[test]
    fn dive_folds_post_order() {
        let mut root = DefinitionNode::root();
        let mut ns = DefinitionNode::new("a", None, true);
        ns.children.insert("b".into(), leaf("a.b", true));
        ns.children.insert("c".into(), leaf("a.c", false));
        root.children.insert("a".into(), ns);

        let count = dive(&root, &mut |_, children: Vec<usize>| {
            1 + children.into_iter().sum::<usize>()
        });
        assert_eq!(count, 4);
    }

    #[test]
    fn dive_mut_reaches_every_node() {
        let mut root = DefinitionNode::root();
        let mut ns = DefinitionNode::new("a", None, true);
        ns.children.insert("b".into(), leaf("a.b", true));
        root.children.insert("a".into(), ns);

        dive_mut(&mut root, &mut |node| node.active = false);
        assert!(!root.active);
        assert!(!root.children["a"].active);
        assert!(!root.children["a"].children["b"].active);
    }
}
