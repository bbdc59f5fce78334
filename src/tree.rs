//! The normalized expression tree produced from MathML input.

use std::fmt::Write;

/// MathML element tags the describer understands.
///
/// Anything outside this set is carried as [`Tag::Other`] so the tree
/// stays structurally complete; the generator renders such nodes with a
/// placeholder instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Math,
    Mrow,
    Mfrac,
    Msup,
    Msqrt,
    Munderover,
    Msubsup,
    Mfenced,
    Mi,
    Mn,
    Mo,
    Other(String),
}

impl Tag {
    /// Map a namespace-stripped element name to a tag.
    pub fn from_local_name(name: &str) -> Self {
        match name {
            "math" => Tag::Math,
            "mrow" => Tag::Mrow,
            "mfrac" => Tag::Mfrac,
            "msup" => Tag::Msup,
            "msqrt" => Tag::Msqrt,
            "munderover" => Tag::Munderover,
            "msubsup" => Tag::Msubsup,
            "mfenced" => Tag::Mfenced,
            "mi" => Tag::Mi,
            "mn" => Tag::Mn,
            "mo" => Tag::Mo,
            other => Tag::Other(other.to_string()),
        }
    }

    /// The element name as it appeared in the markup.
    pub fn name(&self) -> &str {
        match self {
            Tag::Math => "math",
            Tag::Mrow => "mrow",
            Tag::Mfrac => "mfrac",
            Tag::Msup => "msup",
            Tag::Msqrt => "msqrt",
            Tag::Munderover => "munderover",
            Tag::Msubsup => "msubsup",
            Tag::Mfenced => "mfenced",
            Tag::Mi => "mi",
            Tag::Mn => "mn",
            Tag::Mo => "mo",
            Tag::Other(name) => name,
        }
    }

    /// Identifier/number leaves that merge when adjacent in a row.
    pub fn is_literal(&self) -> bool {
        matches!(self, Tag::Mi | Tag::Mn)
    }

    /// Tags whose direct text content is kept on the node.
    pub(crate) fn keeps_text(&self) -> bool {
        matches!(self, Tag::Mi | Tag::Mn | Tag::Mo)
    }
}

/// A node in the normalized expression tree.
///
/// Children are exclusively owned by their parent. `index` records the
/// node's position among its siblings and is recomputed whenever a child
/// list is reassigned during normalization, so `children[i].index == i`
/// always holds on a normalized tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub tag: Tag,
    /// Text content; present only for `mi`, `mn` and `mo` nodes.
    pub text: Option<String>,
    pub index: usize,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a childless node.
    pub fn leaf(tag: Tag, text: Option<String>) -> Self {
        TreeNode {
            tag,
            text,
            index: 0,
            children: Vec::new(),
        }
    }

    /// Create a structural node, renumbering the children.
    pub fn with_children(tag: Tag, children: Vec<TreeNode>) -> Self {
        let mut node = TreeNode {
            tag,
            text: None,
            index: 0,
            children,
        };
        node.renumber_children();
        node
    }

    /// Reassign `index` for the current child list.
    pub fn renumber_children(&mut self) {
        for (i, child) in self.children.iter_mut().enumerate() {
            child.index = i;
        }
    }

    /// Render an indented diagnostic dump of the subtree.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0, None);
        out
    }

    fn dump_into(&self, out: &mut String, level: usize, parent: Option<&Tag>) {
        let indent = "  ".repeat(level);
        let child_tags: Vec<&str> = self.children.iter().map(|c| c.tag.name()).collect();
        let parent_info = match parent {
            Some(tag) => format!("{} (index={})", tag.name(), self.index),
            None => "None".to_string(),
        };

        let _ = writeln!(out, "{indent}Tag: {}", self.tag.name());
        let _ = writeln!(out, "{indent}Text: {:?}", self.text);
        let _ = writeln!(out, "{indent}Children: {child_tags:?}");
        let _ = writeln!(out, "{indent}Parent: {parent_info}");
        let _ = writeln!(out, "{indent}Index: {}", self.index);
        let _ = writeln!(out);

        for child in &self.children {
            child.dump_into(out, level + 1, Some(&self.tag));
        }
    }
}
