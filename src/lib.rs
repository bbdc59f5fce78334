//! # mathprose
//!
//! A small library that reads MathML markup and describes the structure
//! of the formula in natural-language Russian prose. It is an
//! explanatory/accessibility tool: `a/b` becomes "отношение a и b", not
//! a computed value.
//!
//! ## How it works
//!
//! Conversion runs in two stages:
//!
//! 1. [`normalize`] parses the MathML into a [`TreeNode`] tree, merging
//!    adjacent identifier/number leaves inside rows and splitting a
//!    top-level comparison into left and right sides.
//! 2. [`describe`] recursively renders the tree through Russian phrase
//!    templates, declining nouns into the genitive when they appear
//!    nested inside a larger phrase.
//!
//! ## Quick Start
//!
//! ```
//! use mathprose::transcribe;
//!
//! let text = transcribe("<math><mfrac><mi>a</mi><mi>b</mi></mfrac></math>").unwrap();
//! assert_eq!(text, "отношение a и b");
//!
//! let text = transcribe("<math><mi>x</mi><mo>+</mo><mn>1</mn></math>").unwrap();
//! assert_eq!(text, "сумма x и 1");
//! ```
//!
//! Only the MathML tags `math`, `mrow`, `mfrac`, `msup`, `msqrt`,
//! `munderover`, `msubsup`, `mfenced`, `mi`, `mn` and `mo` are worded;
//! anything else renders as a visible placeholder rather than an error.

pub mod describe;
pub mod error;
pub mod lexicon;
pub mod parser;
pub mod tree;

pub use describe::describe;
pub use error::{Error, Result};
pub use parser::normalize;
pub use tree::{Tag, TreeNode};

/// Convert a MathML string straight to its Russian description.
pub fn transcribe(mathml: &str) -> Result<String> {
    let tree = normalize(mathml)?;
    Ok(describe(&tree, true))
}
