//! Document - Arena-based mutable DOM
//!
//! Efficient DOM storage with:
//! - Arena allocation for nodes
//! - NodeId indices for traversal
//! - String interning for element/attribute names
//! - A mutation journal fed by every tracked structural or text change

use super::mutation::{Mutation, MutationJournal};
use super::node::{Node, NodeAttribute, NodeId, DOCUMENT_NODE};
use super::strings::StringPool;
use crate::core::tokenizer::{Token, Tokenizer};

/// Elements that never take children
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// A live, mutable markup document stored in arena format
#[derive(Debug)]
pub struct Document {
    /// Arena of nodes; index 0 is the document node
    nodes: Vec<Node>,
    /// Interned element and attribute names
    pub strings: StringPool,
    /// Pending mutation records
    journal: MutationJournal,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(256);
        nodes.push(Node::document());
        Document {
            nodes,
            strings: StringPool::new(),
            journal: MutationJournal::default(),
        }
    }

    /// Parse markup into a new document (lenient, never fails)
    pub fn parse(input: &str) -> Self {
        let mut doc = Self::new();
        doc.build_into(DOCUMENT_NODE, input);
        doc
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    /// Build nodes from markup under `parent` without journaling.
    /// Returns the nodes appended directly to `parent`.
    fn build_into(&mut self, parent: NodeId, input: &str) -> Vec<NodeId> {
        let mut stack: Vec<NodeId> = vec![parent];
        let mut top_level = Vec::new();

        for token in Tokenizer::new(input) {
            let parent_id = *stack.last().unwrap_or(&parent);

            let node_id = match token {
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let mut node = Node::element(self.strings.intern(&name));
                    node.attributes = attributes
                        .into_iter()
                        .map(|attr| NodeAttribute {
                            name_id: self.strings.intern(&attr.name),
                            value: attr.value.into_owned(),
                        })
                        .collect();

                    let id = self.alloc(node);
                    self.link_child(parent_id, id);
                    if !self_closing && !VOID_ELEMENTS.contains(&name.as_ref()) {
                        stack.push(id);
                    }
                    id
                }

                Token::EndTag { name } => {
                    // Close the nearest open element with this name; stray end tags are dropped
                    let open = stack[1..]
                        .iter()
                        .rposition(|&id| self.node_name(id) == Some(name.as_ref()));
                    if let Some(pos) = open {
                        stack.truncate(pos + 1);
                    }
                    continue;
                }

                Token::Text(content) => {
                    if content.is_empty() {
                        continue;
                    }
                    // Keep text contiguous: a dropped tag must not leave two adjacent text nodes
                    let last = self.nodes[parent_id as usize]
                        .last_child
                        .filter(|&id| self.nodes[id as usize].is_text());
                    if let Some(last) = last {
                        self.nodes[last as usize].data.push_str(&content);
                        continue;
                    }
                    let id = self.alloc(Node::text(content.into_owned()));
                    self.link_child(parent_id, id);
                    id
                }

                Token::Comment(content) => {
                    let id = self.alloc(Node::comment(content.to_string()));
                    self.link_child(parent_id, id);
                    id
                }

                Token::Declaration(content) => {
                    let id = self.alloc(Node::declaration(content.to_string()));
                    self.link_child(parent_id, id);
                    id
                }
            };

            if parent_id == parent {
                top_level.push(node_id);
            }
        }

        top_level
    }

    /// Link a detached child as the last child of its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        // Get parent's last_child first to avoid borrow issues
        let last_child_opt = self.nodes[parent_id as usize].last_child;

        {
            let child = &mut self.nodes[child_id as usize];
            child.parent = Some(parent_id);
            child.prev_sibling = last_child_opt;
            child.next_sibling = None;
        }

        if let Some(last_child_id) = last_child_opt {
            self.nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            // First child
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
    }

    /// Link a detached child right before `next` (or last when None)
    fn link_before(&mut self, parent_id: NodeId, child_id: NodeId, next: Option<NodeId>) {
        let Some(next_id) = next else {
            self.link_child(parent_id, child_id);
            return;
        };

        let prev = self.nodes[next_id as usize].prev_sibling;
        {
            let child = &mut self.nodes[child_id as usize];
            child.parent = Some(parent_id);
            child.prev_sibling = prev;
            child.next_sibling = Some(next_id);
        }
        self.nodes[next_id as usize].prev_sibling = Some(child_id);
        match prev {
            Some(prev_id) => self.nodes[prev_id as usize].next_sibling = Some(child_id),
            None => self.nodes[parent_id as usize].first_child = Some(child_id),
        }
    }

    /// Unlink a node from its parent, returning the old parent
    fn unlink(&mut self, id: NodeId) -> Option<NodeId> {
        let node = self.nodes.get(id as usize)?;
        let parent = node.parent?;
        let (prev, next) = (node.prev_sibling, node.next_sibling);

        match prev {
            Some(prev_id) => self.nodes[prev_id as usize].next_sibling = next,
            None => self.nodes[parent as usize].first_child = next,
        }
        match next {
            Some(next_id) => self.nodes[next_id as usize].prev_sibling = prev,
            None => self.nodes[parent as usize].last_child = prev,
        }

        let node = &mut self.nodes[id as usize];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
        Some(parent)
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// Get element name as string
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get(id)?;
        if node.is_element() {
            self.strings.get(node.name_id)
        } else {
            None
        }
    }

    /// Get the content of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        let node = self.get(id)?;
        if node.is_text() {
            Some(&node.data)
        } else {
            None
        }
    }

    /// Get the parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Get attribute value by name
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let name_id = self.strings.lookup(name)?;
        self.get(id)?
            .attributes
            .iter()
            .find(|attr| attr.name_id == name_id)
            .map(|attr| attr.value.as_str())
    }

    /// Check whether an element carries a class token
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .is_some_and(|value| value.split_ascii_whitespace().any(|token| token == class))
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get(id).and_then(|n| n.first_child);
        ChildIter { doc: self, next: first }
    }

    /// Iterate over all descendants of a node (depth-first, document order)
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        // Initialize stack with all children in reverse order (so first is processed first)
        let mut stack = Vec::new();
        if let Some(node) = self.get(id) {
            let mut child_id = node.last_child;
            while let Some(cid) = child_id {
                stack.push(cid);
                child_id = self.get(cid).and_then(|n| n.prev_sibling);
            }
        }
        DescendantIter { doc: self, stack }
    }

    /// Iterate over the ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> AncestorIter<'_> {
        AncestorIter {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Check whether `id` is `ancestor` or lies inside it
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Check whether a node is reachable from the document node
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(DOCUMENT_NODE, id)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        let mut result = String::new();
        for node_id in self.descendants(id) {
            if let Some(text) = self.text(node_id) {
                result.push_str(text);
            }
        }
        result
    }

    /// All elements under `root` carrying a class token, in document order
    pub fn elements_with_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.has_class(id, class))
            .collect()
    }

    /// First element under `root` carrying a class token
    pub fn first_with_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(root).find(|&id| self.has_class(id, class))
    }

    // =========================================================================
    // Attribute writes (not journaled)
    // =========================================================================

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        if !self.get(id).is_some_and(Node::is_element) {
            return false;
        }
        let name_id = self.strings.intern(name);
        let node = &mut self.nodes[id as usize];
        match node.attributes.iter_mut().find(|attr| attr.name_id == name_id) {
            Some(attr) => attr.value = value.to_string(),
            None => node.attributes.push(NodeAttribute {
                name_id,
                value: value.to_string(),
            }),
        }
        true
    }

    /// Remove an attribute; returns whether it was present
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let Some(name_id) = self.strings.lookup(name) else {
            return false;
        };
        let Some(node) = self.nodes.get_mut(id as usize) else {
            return false;
        };
        let before = node.attributes.len();
        node.attributes.retain(|attr| attr.name_id != name_id);
        node.attributes.len() != before
    }

    /// Add a class token; returns false if already present or not an element
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.has_class(id, class) {
            return false;
        }
        let value = match self.attribute(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attribute(id, "class", &value)
    }

    /// Remove a class token, dropping the attribute when nothing is left
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        if !self.has_class(id, class) {
            return false;
        }
        let remaining = self
            .attribute(id, "class")
            .unwrap_or_default()
            .split_ascii_whitespace()
            .filter(|token| *token != class)
            .collect::<Vec<_>>()
            .join(" ");
        if remaining.is_empty() {
            self.remove_attribute(id, "class")
        } else {
            self.set_attribute(id, "class", &remaining)
        }
    }

    // =========================================================================
    // Structural writes (journaled)
    // =========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let name_id = self.strings.intern(&name.to_ascii_lowercase());
        self.alloc(Node::element(name_id))
    }

    /// Create a detached text node
    #[cfg(test)]
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::text(text.into()))
    }

    /// Insert `child` under `parent` before `reference` (append when None).
    /// Moves `child` if it is attached elsewhere.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> bool {
        let len = self.nodes.len();
        if parent as usize >= len || child as usize >= len || child == DOCUMENT_NODE {
            return false;
        }
        // Would create a cycle
        if self.contains(child, parent) {
            return false;
        }
        if let Some(next) = reference {
            if self.parent(next) != Some(parent) {
                return false;
            }
            if next == child {
                return true;
            }
        }

        self.detach(child);
        self.link_before(parent, child, reference);
        self.journal
            .record(Mutation::child_list(parent, vec![child], Vec::new()));
        true
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` right after `reference`
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> bool {
        let Some(parent) = self.parent(reference) else {
            return false;
        };
        let next = self.nodes[reference as usize].next_sibling;
        self.insert_before(parent, child, next)
    }

    /// Remove a node (and its subtree) from its parent
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.unlink(id) else {
            return false;
        };
        self.journal
            .record(Mutation::child_list(parent, Vec::new(), vec![id]));
        true
    }

    /// Replace the content of a text node
    #[cfg(test)]
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.nodes.get_mut(id as usize) {
            Some(node) if node.is_text() => {
                node.data.clear();
                node.data.push_str(text);
                self.journal.record(Mutation::character_data(id));
                true
            }
            _ => false,
        }
    }

    /// Split a text node at byte offset `at`, like DOM `splitText`.
    ///
    /// The node keeps `[0, at)`; a new text node holding `[at, len)` is
    /// inserted right after it and returned. `at` must be a char boundary
    /// strictly inside the text.
    pub fn split_text(&mut self, id: NodeId, at: usize) -> Option<NodeId> {
        let node = self.get(id)?;
        if !node.is_text() || at == 0 || at >= node.data.len() || !node.data.is_char_boundary(at) {
            return None;
        }

        let tail = self.nodes[id as usize].data.split_off(at);
        self.journal.record(Mutation::character_data(id));
        let new_id = self.alloc(Node::text(tail));
        if self.parent(id).is_some() {
            self.insert_after(id, new_id);
        }
        Some(new_id)
    }

    /// Put `wrapper` where `id` is and move `id` inside it
    pub fn wrap(&mut self, id: NodeId, wrapper: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        self.insert_before(parent, wrapper, Some(id)) && self.append_child(wrapper, id)
    }

    /// Move all children of `id` into its place and detach it.
    /// Returns the first and last moved child.
    pub fn unwrap(&mut self, id: NodeId) -> Option<(NodeId, NodeId)> {
        let parent = self.parent(id)?;
        let children: Vec<NodeId> = self.children(id).collect();
        for &child in &children {
            self.insert_before(parent, child, Some(id));
        }
        self.detach(id);
        Some((*children.first()?, *children.last()?))
    }

    /// Merge a text node with its adjacent text siblings.
    ///
    /// Returns the surviving node, or None if the merged text is empty (the
    /// node is then detached too). Non-text nodes are returned unchanged.
    pub fn merge_text_siblings(&mut self, id: NodeId) -> Option<NodeId> {
        if !self.get(id)?.is_text() {
            return Some(id);
        }

        let mut survivor = id;
        while let Some(prev) = self.nodes[survivor as usize]
            .prev_sibling
            .filter(|&p| self.nodes[p as usize].is_text())
        {
            let data = std::mem::take(&mut self.nodes[survivor as usize].data);
            self.nodes[prev as usize].data.push_str(&data);
            self.journal.record(Mutation::character_data(prev));
            self.detach(survivor);
            survivor = prev;
        }
        while let Some(next) = self.nodes[survivor as usize]
            .next_sibling
            .filter(|&n| self.nodes[n as usize].is_text())
        {
            let data = std::mem::take(&mut self.nodes[next as usize].data);
            self.nodes[survivor as usize].data.push_str(&data);
            self.journal.record(Mutation::character_data(survivor));
            self.detach(next);
        }

        if self.nodes[survivor as usize].data.is_empty() {
            self.detach(survivor);
            return None;
        }
        Some(survivor)
    }

    /// Replace all children of `parent` with nodes parsed from markup.
    /// Journaled as a single child-list record.
    pub fn replace_children(&mut self, parent: NodeId, input: &str) -> Vec<NodeId> {
        if parent as usize >= self.nodes.len() {
            return Vec::new();
        }
        let removed: Vec<NodeId> = self.children(parent).collect();
        for &child in &removed {
            self.unlink(child);
        }
        let added = self.build_into(parent, input);
        if !removed.is_empty() || !added.is_empty() {
            self.journal
                .record(Mutation::child_list(parent, added.clone(), removed));
        }
        added
    }

    // =========================================================================
    // Journal
    // =========================================================================

    /// Run `f` with journaling suspended
    pub fn untracked<R>(&mut self, f: impl FnOnce(&mut Document) -> R) -> R {
        self.journal.suspend();
        let result = f(self);
        self.journal.resume();
        result
    }

    /// Drain pending mutation records
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        self.journal.take()
    }

    /// Number of pending mutation records
    #[cfg(test)]
    pub fn pending_mutations(&self) -> usize {
        self.journal.len()
    }
}

/// Iterator over child nodes
pub struct ChildIter<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl<'d> Iterator for ChildIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.get(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first)
pub struct DescendantIter<'d> {
    doc: &'d Document,
    stack: Vec<NodeId>,
}

impl<'d> Iterator for DescendantIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Add children to stack in reverse order (so first child is processed first)
        if let Some(node) = self.doc.get(current) {
            let mut child_id = node.last_child;
            while let Some(id) = child_id {
                self.stack.push(id);
                child_id = self.doc.get(id).and_then(|n| n.prev_sibling);
            }
        }

        Some(current)
    }
}

/// Iterator over ancestors, nearest first
#[derive(Clone)]
pub struct AncestorIter<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl<'d> Iterator for AncestorIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}
