//! Namespace-agnostic traversal over a parsed XML document.
//!
//! NF-e producers are inconsistent about namespace declarations: some bind
//! the portal namespace as the default, some use an `nfe:` prefix, some omit
//! it entirely. Every lookup here resolves elements by *local* tag name
//! only, so all three shapes read identically.
//!
//! Absence is a normal, expected case for optional fiscal fields; none of
//! these functions fail on missing nodes.

use roxmltree::Node;

/// First *direct* element child of `parent` whose local tag name equals
/// `local_name`. Never matches deeper descendants.
pub fn child<'a, 'd>(parent: Node<'a, 'd>, local_name: &str) -> Option<Node<'a, 'd>> {
    parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
}

/// First element matching `local_name` anywhere in `root`'s subtree (root
/// inclusive), in document order.
///
/// Used for locating top-level sections (`infNFe`, `ide`, `emit`, ...)
/// without depending on the exact nesting path.
pub fn descendant<'a, 'd>(root: Node<'a, 'd>, local_name: &str) -> Option<Node<'a, 'd>> {
    root.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
}

/// Trimmed text content of the `child` matching `local_name`, or an empty
/// string when the child is absent or empty.
pub fn text(parent: Node, local_name: &str) -> String {
    child(parent, local_name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

/// Trimmed text content of `node` itself.
pub fn own_text(node: Node) -> String {
    node.text().map(|t| t.trim().to_string()).unwrap_or_default()
}

/// Value of the attribute named `name` on `node`, ignoring any namespace
/// prefix on the attribute.
pub fn attr(node: Node, name: &str) -> String {
    node.attributes()
        .find(|a| a.name() == name)
        .map(|a| a.value().trim().to_string())
        .unwrap_or_default()
}

/// All direct element children of `node`, in document order.
pub fn element_children<'a, 'd>(node: Node<'a, 'd>) -> impl Iterator<Item = Node<'a, 'd>> {
    node.children().filter(|n| n.is_element())
}
