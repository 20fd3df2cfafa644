// src/keywords.rs

//! Food-keyword lexicon and matcher.
//!
//! One case-insensitive substring scan backs both the inclusion filter and
//! the display highlighter, so an event can never be included without a
//! highlightable match (or vice versa).

/// Built-in French/German/English terms for receptions, meals and
/// refreshments. Longer phrases come before their prefixes so the first
/// match is the most specific one.
const FOOD_TERMS: [&str; 34] = [
    "apéro riche",
    "apéritif",
    "apéro",
    "apero",
    "aperitif",
    "verre de l'amitié",
    "petit-déjeuner",
    "déjeuner",
    "dîner",
    "goûter",
    "collation",
    "repas",
    "buffet",
    "brunch",
    "raclette",
    "fondue",
    "pizza",
    "barbecue",
    "bbq",
    "grillade",
    "breakfast",
    "lunch",
    "dinner",
    "snacks",
    "snack",
    "refreshments",
    "refreshment",
    "drinks",
    "catering",
    "essen",
    "imbiss",
    "znüni",
    "zvieri",
    "umtrunk",
];

/// A fixed, ordered keyword list.
#[derive(Debug, Clone)]
pub struct Lexicon {
    terms: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            terms: FOOD_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl Lexicon {
    /// Built-in lexicon extended with caller-supplied keywords.
    pub fn with_extra(extra: &[String]) -> Self {
        let mut lexicon = Self::default();
        lexicon
            .terms
            .extend(extra.iter().map(|t| t.to_lowercase()));
        lexicon
    }

    /// Keywords in scan order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// First keyword contained in `text`, scanning the lexicon in order.
    pub fn first_match<'a>(&'a self, text: &str) -> Option<&'a str> {
        let haystack = text.to_lowercase();
        self.terms
            .iter()
            .find(|term| haystack.contains(term.as_str()))
            .map(String::as_str)
    }

    /// True when any keyword occurs in `text`.
    pub fn has_match(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    /// Byte range of the first keyword occurrence, in the original string.
    pub fn match_range(&self, text: &str) -> Option<std::ops::Range<usize>> {
        let (lowered, offsets) = lower_with_offsets(text);
        for term in &self.terms {
            if let Some(pos) = lowered.find(term.as_str()) {
                let start = offsets[pos];
                let end = offsets[pos + term.len()];
                return Some(start..end);
            }
        }
        None
    }

    /// Wrap the first keyword occurrence in the given markers.
    ///
    /// Returns the text unchanged when nothing matches.
    pub fn highlight(&self, text: &str, open: &str, close: &str) -> String {
        match self.match_range(text) {
            Some(range) => {
                let mut out = String::with_capacity(text.len() + open.len() + close.len());
                out.push_str(&text[..range.start]);
                out.push_str(open);
                out.push_str(&text[range.clone()]);
                out.push_str(close);
                out.push_str(&text[range.end..]);
                out
            }
            None => text.to_string(),
        }
    }
}

/// Lowercase `text` and map every byte position of the lowered string back
/// to a byte position in the original. Lowercasing can change byte lengths
/// (and char counts), so indices found in the lowered string cannot be used
/// on the original directly.
fn lower_with_offsets(text: &str) -> (String, Vec<usize>) {
    let mut lowered = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len() + 1);
    for (idx, c) in text.char_indices() {
        for lc in c.to_lowercase() {
            let mut buf = [0u8; 4];
            let encoded = lc.encode_utf8(&mut buf);
            for _ in 0..encoded.len() {
                offsets.push(idx);
            }
            lowered.push_str(encoded);
        }
    }
    offsets.push(text.len());
    (lowered, offsets)
}
