use std::collections::HashSet;

/// Set of k-word sequences taken from normalized text
pub type ShingleSet = HashSet<String>;

/// Lower-case the text and split it into words.
///
/// Anything that is not alphanumeric separates tokens, so "car." and "car"
/// produce the same token.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}

/// Normalized form of the text: tokens joined by single spaces
pub fn normalize(text: &str) -> String {
    tokenize(text).join(" ")
}

/// Build the shingle set for already tokenized text.
///
/// Fewer tokens than `k` yield one shingle holding every token, so short
/// titles stay comparable. No tokens yield an empty set.
pub fn shingles_from_tokens(tokens: &[String], k: usize) -> ShingleSet {
    if tokens.is_empty() {
        return ShingleSet::new();
    }

    if tokens.len() < k {
        return std::iter::once(tokens.join(" ")).collect();
    }

    tokens.windows(k).map(|window| window.join(" ")).collect()
}

/// Cached per-item data used by the scorer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fingerprint {
    pub shingles: ShingleSet,
    /// Character count of the normalized text
    pub normalized_len: usize,
}

impl Fingerprint {
    pub fn is_empty(&self) -> bool {
        self.shingles.is_empty()
    }
}

/// Turns item text into a [`Fingerprint`]
pub trait Tokenizer {
    fn fingerprint(&self, text: &str) -> Fingerprint;
}

/// Word shingler with a fixed shingle size
#[derive(Debug, Clone, Copy)]
pub struct Shingler {
    k: usize,
}

impl Shingler {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn shingle_size(&self) -> usize {
        self.k
    }
}

impl Default for Shingler {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Tokenizer for Shingler {
    fn fingerprint(&self, text: &str) -> Fingerprint {
        let tokens = tokenize(text);
        // tokens joined by single spaces
        let normalized_len = tokens.iter().map(|t| t.chars().count()).sum::<usize>()
            + tokens.len().saturating_sub(1);

        Fingerprint {
            shingles: shingles_from_tokens(&tokens, self.k),
            normalized_len,
        }
    }
}
