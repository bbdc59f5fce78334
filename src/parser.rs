//! MathML parsing and tree normalization.
//!
//! [`normalize`] turns a MathML fragment into a [`TreeNode`] tree ready
//! for description: namespace prefixes are stripped, runs of adjacent
//! identifier/number leaves inside rows are coalesced, and a top-level
//! comparison in the `math` root is split into left and right sides.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::lexicon::is_comparison;
use crate::tree::{Tag, TreeNode};

/// An element whose end tag has not been seen yet.
struct OpenElement {
    tag: Tag,
    text: String,
    children: Vec<TreeNode>,
}

impl OpenElement {
    fn new(tag: Tag) -> Self {
        OpenElement {
            tag,
            text: String::new(),
            children: Vec::new(),
        }
    }
}

/// Parse a MathML string into a normalized tree.
///
/// Fails if the input is not well-formed XML or contains no root
/// element. Unknown element tags are kept in the tree as
/// [`Tag::Other`]; the describer renders them as placeholders.
pub fn normalize(mathml: &str) -> Result<TreeNode> {
    let mut reader = Reader::from_str(mathml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<TreeNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = String::from_utf8_lossy(local_name(name.as_ref()));
                stack.push(OpenElement::new(Tag::from_local_name(&local)));
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                let local = String::from_utf8_lossy(local_name(name.as_ref()));
                let leaf = TreeNode::leaf(Tag::from_local_name(&local), None);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(leaf),
                    None => root = Some(leaf),
                }
            }
            Ok(Event::Text(e)) => {
                // Only text before the first child counts as the
                // element's own content.
                if let Some(open) = stack.last_mut()
                    && open.children.is_empty()
                {
                    open.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(open) = stack.last_mut()
                    && open.children.is_empty()
                {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        open.text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if let Some(open) = stack.pop() {
                    let node = close_element(open);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root = Some(node),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    root.ok_or_else(|| Error::InvalidMathml("document contains no root element".to_string()))
}

/// Finalize an element once all of its children are normalized.
fn close_element(open: OpenElement) -> TreeNode {
    let OpenElement {
        tag,
        text,
        children,
    } = open;

    let text = (tag.keeps_text() && !text.is_empty()).then_some(text);

    if children.is_empty() {
        return TreeNode::leaf(tag, text);
    }

    let children = match tag {
        Tag::Mrow | Tag::Mfenced => merge_adjacent_literals(children),
        _ => children,
    };
    let children = match tag {
        Tag::Math => split_comparison(children),
        _ => children,
    };

    let mut node = TreeNode {
        tag,
        text,
        index: 0,
        children,
    };
    node.renumber_children();
    node
}

/// Coalesce runs of two or more adjacent `mi`/`mn` children into one
/// synthetic `mn` whose text is the concatenation of the run.
///
/// Adjacent letters and digits in a row denote a single multi-character
/// name or number; single literals and non-literals pass through.
pub(crate) fn merge_adjacent_literals(children: Vec<TreeNode>) -> Vec<TreeNode> {
    let mut merged: Vec<TreeNode> = Vec::with_capacity(children.len());
    let mut iter = children.into_iter().peekable();

    while let Some(child) = iter.next() {
        if !child.tag.is_literal() {
            merged.push(child);
            continue;
        }

        let mut run_text = child.text.clone().unwrap_or_default();
        let mut run_len = 1;
        while let Some(next) = iter.next_if(|n| n.tag.is_literal()) {
            run_text.push_str(next.text.as_deref().unwrap_or(""));
            run_len += 1;
        }

        if run_len > 1 {
            let text = (!run_text.is_empty()).then_some(run_text);
            merged.push(TreeNode::leaf(Tag::Mn, text));
        } else {
            merged.push(child);
        }
    }

    merged
}

/// Split the child list of a `math` root at the first comparison
/// operator: everything before it becomes a left `mrow`, everything
/// after a right `mrow`, with empty sides omitted. Later comparison
/// operators stay inside whichever side captured them.
pub(crate) fn split_comparison(children: Vec<TreeNode>) -> Vec<TreeNode> {
    let Some(pos) = children
        .iter()
        .position(|c| c.tag == Tag::Mo && c.text.as_deref().is_some_and(is_comparison))
    else {
        return children;
    };

    let mut left = children;
    let mut rest = left.split_off(pos);
    let operator = rest.remove(0);
    let right = rest;

    let mut split = Vec::with_capacity(3);
    if !left.is_empty() {
        split.push(TreeNode::with_children(Tag::Mrow, left));
    }
    split.push(operator);
    if !right.is_empty() {
        split.push(TreeNode::with_children(Tag::Mrow, right));
    }
    split
}

/// Extract local name from a namespaced XML name (e.g., "m:mrow" -> "mrow").
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve XML entity references, including the math symbols common in
/// MathML sources.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        "minus" => return Some("−".to_string()),
        "sdot" => return Some("⋅".to_string()),
        "middot" => return Some("·".to_string()),
        "sum" => return Some("∑".to_string()),
        "int" => return Some("∫".to_string()),
        "ge" | "geq" => return Some("≥".to_string()),
        "le" | "leq" => return Some("≤".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Every node's children must be numbered 0..n.
    fn assert_indices_consistent(node: &TreeNode) {
        for (i, child) in node.children.iter().enumerate() {
            assert_eq!(child.index, i, "child {i} of {:?} misnumbered", node.tag);
            assert_indices_consistent(child);
        }
    }

    #[test]
    fn test_parse_simple_fraction() {
        let tree = normalize("<math><mfrac><mi>a</mi><mi>b</mi></mfrac></math>").unwrap();

        assert_eq!(tree.tag, Tag::Math);
        assert_eq!(tree.children.len(), 1);

        let frac = &tree.children[0];
        assert_eq!(frac.tag, Tag::Mfrac);
        assert_eq!(frac.children.len(), 2);
        assert_eq!(frac.children[0].text.as_deref(), Some("a"));
        assert_eq!(frac.children[1].text.as_deref(), Some("b"));
        assert_indices_consistent(&tree);
    }

    #[test]
    fn test_namespace_prefix_stripped() {
        let tree = normalize(
            r#"<m:math xmlns:m="http://www.w3.org/1998/Math/MathML"><m:mi>x</m:mi></m:math>"#,
        )
        .unwrap();

        assert_eq!(tree.tag, Tag::Math);
        assert_eq!(tree.children[0].tag, Tag::Mi);
        assert_eq!(tree.children[0].text.as_deref(), Some("x"));
    }

    #[test]
    fn test_structural_tags_keep_no_text() {
        let tree = normalize("<math><mrow>stray<mi>x</mi></mrow></math>").unwrap();
        assert_eq!(tree.children[0].tag, Tag::Mrow);
        assert_eq!(tree.children[0].text, None);
    }

    #[test]
    fn test_merge_adjacent_literals_in_mrow() {
        let tree = normalize("<math><mrow><mn>1</mn><mn>0</mn></mrow></math>").unwrap();

        let row = &tree.children[0];
        assert_eq!(row.children.len(), 1);
        assert_eq!(row.children[0].tag, Tag::Mn);
        assert_eq!(row.children[0].text.as_deref(), Some("10"));
    }

    #[test]
    fn test_merge_mixed_run_becomes_mn() {
        let tree =
            normalize("<math><mrow><mi>x</mi><mi>y</mi><mo>+</mo><mn>1</mn></mrow></math>")
                .unwrap();

        let row = &tree.children[0];
        assert_eq!(row.children.len(), 3);
        assert_eq!(row.children[0].tag, Tag::Mn);
        assert_eq!(row.children[0].text.as_deref(), Some("xy"));
        assert_eq!(row.children[1].tag, Tag::Mo);
        assert_eq!(row.children[2].text.as_deref(), Some("1"));
        assert_indices_consistent(&tree);
    }

    #[test]
    fn test_single_literal_not_rewritten() {
        let tree = normalize("<math><mrow><mi>x</mi><mo>+</mo><mi>y</mi></mrow></math>").unwrap();

        let row = &tree.children[0];
        assert_eq!(row.children.len(), 3);
        assert_eq!(row.children[0].tag, Tag::Mi);
        assert_eq!(row.children[2].tag, Tag::Mi);
    }

    #[test]
    fn test_no_merge_outside_row_containers() {
        // Adjacent literals directly under math stay separate.
        let tree = normalize("<math><mi>x</mi><mi>y</mi></math>").unwrap();
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].tag, Tag::Mi);
        assert_eq!(tree.children[1].tag, Tag::Mi);
    }

    #[test]
    fn test_comparison_split_both_sides() {
        let tree = normalize(
            "<math><mi>a</mi><mo>+</mo><mi>b</mi><mo>=</mo><mn>4</mn></math>",
        )
        .unwrap();

        assert_eq!(tree.children.len(), 3);
        assert_eq!(tree.children[0].tag, Tag::Mrow);
        assert_eq!(tree.children[0].children.len(), 3);
        assert_eq!(tree.children[1].tag, Tag::Mo);
        assert_eq!(tree.children[1].text.as_deref(), Some("="));
        assert_eq!(tree.children[2].tag, Tag::Mrow);
        assert_eq!(tree.children[2].children.len(), 1);
        assert_indices_consistent(&tree);
    }

    #[test]
    fn test_comparison_split_empty_left_side() {
        let tree = normalize("<math><mo>=</mo><mi>b</mi></math>").unwrap();

        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].tag, Tag::Mo);
        assert_eq!(tree.children[0].index, 0);
        assert_eq!(tree.children[1].tag, Tag::Mrow);
    }

    #[test]
    fn test_comparison_split_first_operator_wins() {
        let tree = normalize(
            "<math><mi>a</mi><mo>=</mo><mi>b</mi><mo>=</mo><mi>c</mi></math>",
        )
        .unwrap();

        assert_eq!(tree.children.len(), 3);
        // The second "=" stays inside the right-hand row.
        let right = &tree.children[2];
        assert_eq!(right.tag, Tag::Mrow);
        assert_eq!(right.children.len(), 3);
        assert_eq!(right.children[1].text.as_deref(), Some("="));
    }

    #[test]
    fn test_comparison_not_split_inside_mfenced() {
        let tree =
            normalize("<math><mfenced><mi>a</mi><mo>=</mo><mi>b</mi></mfenced></math>").unwrap();

        let fenced = &tree.children[0];
        assert_eq!(fenced.tag, Tag::Mfenced);
        assert_eq!(fenced.children.len(), 3);
        assert_eq!(fenced.children[1].text.as_deref(), Some("="));
    }

    #[test]
    fn test_escaped_comparison_token_splits() {
        let tree =
            normalize(r"<math><mi>a</mi><mo>\geqslant</mo><mi>b</mi></math>").unwrap();

        assert_eq!(tree.children.len(), 3);
        assert_eq!(tree.children[1].text.as_deref(), Some(r"\geqslant"));
    }

    #[test]
    fn test_numeric_entity_resolved() {
        let tree = normalize("<math><mo>&#x2211;</mo></math>").unwrap();
        assert_eq!(tree.children[0].text.as_deref(), Some("∑"));

        let tree = normalize("<math><mo>&#8722;</mo></math>").unwrap();
        assert_eq!(tree.children[0].text.as_deref(), Some("−"));
    }

    #[test]
    fn test_named_entity_comparison_splits() {
        let tree = normalize("<math><mi>a</mi><mo>&lt;</mo><mi>b</mi></math>").unwrap();

        assert_eq!(tree.children.len(), 3);
        assert_eq!(tree.children[1].text.as_deref(), Some("<"));
    }

    #[test]
    fn test_empty_element_is_leaf() {
        let tree = normalize("<math><mfenced/></math>").unwrap();
        assert_eq!(tree.children[0].tag, Tag::Mfenced);
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn test_unknown_tag_passes_through() {
        let tree = normalize("<math><semantics><mi>x</mi></semantics></math>").unwrap();
        assert_eq!(
            tree.children[0].tag,
            Tag::Other("semantics".to_string())
        );
        assert_eq!(tree.children[0].children.len(), 1);
    }

    #[test]
    fn test_malformed_xml_fails() {
        // Unclosed root never produces a complete document.
        assert!(normalize("<math><mi>a</mi>").is_err());
        // Mismatched end tag is rejected by the XML reader.
        assert!(matches!(
            normalize("<math><mi>a</mrow></math>"),
            Err(Error::Xml(_))
        ));
    }

    #[test]
    fn test_text_after_child_is_ignored() {
        // Only the text before the first child belongs to the element.
        let tree = normalize("<math><mi>a<mfenced/>c</mi></math>").unwrap();

        let ident = &tree.children[0];
        assert_eq!(ident.tag, Tag::Mi);
        assert_eq!(ident.text.as_deref(), Some("a"));
        assert_eq!(ident.children.len(), 1);
    }

    #[test]
    fn test_entity_after_child_is_ignored() {
        let tree = normalize("<math><mo>+<mfenced/>&#x2211;</mo></math>").unwrap();

        let op = &tree.children[0];
        assert_eq!(op.text.as_deref(), Some("+"));
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(normalize(""), Err(Error::InvalidMathml(_))));
        assert!(matches!(normalize("   "), Err(Error::InvalidMathml(_))));
    }

    #[test]
    fn test_merge_is_idempotent_on_normalized_tree() {
        let tree = normalize(
            "<math><mrow><mi>a</mi><mn>1</mn><mo>+</mo><mi>b</mi><mi>c</mi></mrow></math>",
        )
        .unwrap();

        let row = &tree.children[0];
        let remerged = merge_adjacent_literals(row.children.clone());
        assert_eq!(remerged, row.children);
    }

    fn arb_leaf() -> impl Strategy<Value = TreeNode> {
        prop_oneof![
            "[a-z0-9]{1,3}".prop_map(|s| TreeNode::leaf(Tag::Mi, Some(s))),
            "[0-9]{1,3}".prop_map(|s| TreeNode::leaf(Tag::Mn, Some(s))),
            Just(TreeNode::leaf(Tag::Mi, None)),
            Just(TreeNode::leaf(Tag::Mo, Some("+".to_string()))),
            Just(TreeNode::leaf(Tag::Msqrt, None)),
        ]
    }

    proptest! {
        #[test]
        fn prop_merge_leaves_no_adjacent_literals(
            children in prop::collection::vec(arb_leaf(), 0..12)
        ) {
            let merged = merge_adjacent_literals(children);
            for pair in merged.windows(2) {
                prop_assert!(!(pair[0].tag.is_literal() && pair[1].tag.is_literal()));
            }
        }

        #[test]
        fn prop_merge_is_idempotent(
            children in prop::collection::vec(arb_leaf(), 0..12)
        ) {
            let once = merge_adjacent_literals(children);
            let twice = merge_adjacent_literals(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_merge_preserves_text(
            children in prop::collection::vec(arb_leaf(), 0..12)
        ) {
            let expected: String = children
                .iter()
                .filter_map(|c| c.text.as_deref())
                .collect();
            let merged = merge_adjacent_literals(children);
            let actual: String = merged
                .iter()
                .filter_map(|c| c.text.as_deref())
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
