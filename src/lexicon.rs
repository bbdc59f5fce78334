//! Russian wording tables for mathematical symbols.
//!
//! The generator picks nouns and connective words from the fixed tables
//! here; [`decline`] handles the one piece of grammar involved, choosing
//! between the nominative and genitive form of a noun depending on where
//! in the phrase it lands.

/// Return `word` in the requested case.
///
/// Only the six math nouns the generator emits have a genitive entry;
/// any other word passes through unchanged.
pub fn decline(word: &str, genitive: bool) -> &str {
    if !genitive {
        return word;
    }
    match word {
        "отношение" => "отношения",
        "корень" => "корня",
        "сумма" => "суммы",
        "разность" => "разности",
        "произведение" => "произведения",
        "частное" => "частного",
        _ => word,
    }
}

/// Noun for an arithmetic operator symbol.
pub fn operator_noun(symbol: &str) -> Option<&'static str> {
    match symbol {
        "+" => Some("сумма"),
        "-" | "−" => Some("разность"),
        "*" | "⋅" | "·" => Some("произведение"),
        "/" => Some("частное"),
        _ => None,
    }
}

/// Connective word for a comparison symbol.
pub fn comparison_word(symbol: &str) -> Option<&'static str> {
    match symbol {
        "=" => Some("равно"),
        ">" => Some("больше"),
        "<" => Some("меньше"),
        "≥" => Some("больше или равно"),
        "≤" => Some("меньше или равно"),
        _ => None,
    }
}

/// Whether `symbol` is one of the comparison operators that split a
/// formula into left and right sides. The TeX-style escaped tokens show
/// up verbatim in some datasets, so they count too.
pub fn is_comparison(symbol: &str) -> bool {
    matches!(symbol, "=" | ">" | "<" | "≥" | "≤" | "\\geqslant" | "\\leqslant")
}
