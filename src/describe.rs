//! Rendering a normalized tree into a Russian description.
//!
//! [`describe`] is a pure recursive function over the tree. The
//! `top_level` flag is true for the initial call and for direct children
//! of a `math` node, false everywhere else; it selects the nominative
//! versus genitive form of the nouns the phrases are built from.
//!
//! The generator never fails: unmapped symbols and tags degrade to
//! visible placeholder phrases instead of aborting the description.

use crate::lexicon::{comparison_word, decline, is_comparison, operator_noun};
use crate::tree::{Tag, TreeNode};

/// Render `node` as a Russian phrase.
pub fn describe(node: &TreeNode, top_level: bool) -> String {
    let genitive = !top_level;

    // Infix triplets take priority; when any window matches, the per-tag
    // rule for this node is skipped entirely.
    if let Some(phrase) = describe_operator_triplets(node, genitive) {
        return phrase;
    }

    match &node.tag {
        Tag::Mfrac => format!(
            "{} {} и {}",
            decline("отношение", genitive),
            describe_child(node, 0),
            describe_child(node, 1)
        ),
        Tag::Msup => {
            let base = describe_child(node, 0);
            let exponent = describe_child(node, 1);
            match exponent.as_str() {
                "2" => format!("{base} в квадрате"),
                "3" => format!("{base} в кубе"),
                _ => format!("{base} в степени {exponent}"),
            }
        }
        Tag::Msqrt => format!(
            "{} из {}",
            decline("корень", genitive),
            describe_child(node, 0)
        ),
        Tag::Munderover | Tag::Msubsup => describe_bounded_operator(node),
        Tag::Mi => node
            .text
            .clone()
            .unwrap_or_else(|| "неизвестная переменная".to_string()),
        Tag::Mn => node
            .text
            .clone()
            .unwrap_or_else(|| "неизвестное число".to_string()),
        Tag::Mo => describe_operator(node, genitive),
        Tag::Mrow => node.children.iter().map(|c| describe(c, false)).collect(),
        Tag::Mfenced => {
            if node.children.is_empty() {
                "()".to_string()
            } else {
                let inner: Vec<String> =
                    node.children.iter().map(|c| describe(c, false)).collect();
                format!("({})", inner.join(" "))
            }
        }
        // Direct children of the root are worded in the nominative.
        Tag::Math => node.children.iter().map(|c| describe(c, true)).collect(),
        Tag::Other(_) => "неизвестный тег".to_string(),
    }
}

/// Scan a window of three over the children, phrasing every
/// `operand <mo> operand` triplet; matches are joined with "; ".
fn describe_operator_triplets(node: &TreeNode, genitive: bool) -> Option<String> {
    if node.children.len() < 3 {
        return None;
    }

    let mut phrases = Vec::new();
    for window in node.children.windows(3) {
        let middle = &window[1];
        if middle.tag != Tag::Mo {
            continue;
        }
        let Some(symbol) = middle.text.as_deref() else {
            continue;
        };
        // Comparisons were already split into sides; a big-sum symbol is
        // not an infix operator.
        if is_comparison(symbol) || symbol == "∑" {
            continue;
        }

        phrases.push(format!(
            "{} {} и {}",
            operator_phrase(symbol, genitive),
            describe(&window[0], false),
            describe(&window[2], false)
        ));
    }

    if phrases.is_empty() {
        None
    } else {
        Some(phrases.join("; "))
    }
}

/// Phrase a lone operator node.
fn describe_operator(node: &TreeNode, genitive: bool) -> String {
    let symbol = node.text.as_deref().unwrap_or("");

    if is_comparison(symbol) {
        return format!(" {} ", comparison_word(symbol).unwrap_or(" ? "));
    }

    match symbol {
        "∑" => "сумма".to_string(),
        "∫" => "интеграл".to_string(),
        // An operator in first position is taken to be a unary prefix
        // and kept as its raw symbol.
        _ if node.index == 0 => symbol.to_string(),
        _ if node.children.len() == 2 => format!(
            "{} {} и {}",
            operator_phrase(symbol, genitive),
            describe(&node.children[0], false),
            describe(&node.children[1], false)
        ),
        _ => operator_phrase(symbol, genitive),
    }
}

/// `munderover`/`msubsup`: symbol, lower bound, upper bound.
///
/// The phrase ends with a trailing "от " on purpose; the continuation is
/// supplied by whatever follows in the surrounding row.
fn describe_bounded_operator(node: &TreeNode) -> String {
    let symbol = describe_child(node, 0);

    let lower_phrase = match node.children.get(1) {
        Some(lower) if lower.children.len() >= 3 => {
            let joined: String = lower.children.iter().map(|c| describe(c, false)).collect();
            format!("по {joined}")
        }
        _ => String::new(),
    };

    let upper_phrase = match node.children.get(2) {
        Some(upper) if !upper.children.is_empty() => {
            format!("до {}", describe(&upper.children[0], false))
        }
        _ => String::new(),
    };

    format!("{symbol} {lower_phrase} {upper_phrase} от ")
}

fn operator_phrase(symbol: &str, genitive: bool) -> String {
    match operator_noun(symbol) {
        Some(noun) => decline(noun, genitive).to_string(),
        None => format!("операция {symbol}"),
    }
}

fn describe_child(node: &TreeNode, i: usize) -> String {
    node.children
        .get(i)
        .map(|c| describe(c, false))
        .unwrap_or_default()
}
