//! Canonical key inference.
//!
//! Entity names are upper-camel-case (`InstrumentType`); their canonical key
//! is the lowercase, underscore-separated form (`instrument_type`). The key
//! links schema artifacts together (ontology nodes, relationship endpoints)
//! and is unrelated to any domain data key such as `id` or `lei`.

/// Infer the canonical key for an entity name.
///
/// Two passes over the name:
/// 1. Insert `_` before every capitalized word (`Xyz...`) that follows any
///    character, which splits acronym runs: `HTTPServer` → `HTTP_Server`.
/// 2. Insert `_` between a lowercase letter or digit and a following
///    uppercase letter: `cfiCode` → `cfi_Code`.
///
/// The result is then lower-cased. Total over any input; never fails.
pub fn infer_key(name: &str) -> String {
    let words = split_capitalized_words(name);
    split_lower_upper(&words).to_lowercase()
}

fn split_capitalized_words(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    let mut i = 0;

    while i < chars.len() {
        let starts_word = i + 2 < chars.len()
            && chars[i + 1].is_ascii_uppercase()
            && chars[i + 2].is_ascii_lowercase();

        if !starts_word {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        out.push(chars[i]);
        out.push('_');
        out.push(chars[i + 1]);
        let mut j = i + 2;
        while j < chars.len() && chars[j].is_ascii_lowercase() {
            out.push(chars[j]);
            j += 1;
        }
        i = j;
    }

    out
}

fn split_lower_upper(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if (c.is_ascii_lowercase() || c.is_ascii_digit())
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_uppercase())
        {
            out.push(c);
            out.push('_');
            out.push(chars[i + 1]);
            i += 2;
        } else {
            out.push(c);
            i += 1;
        }
    }

    out
}
