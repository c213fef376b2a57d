use crate::shingles::{Fingerprint, ShingleSet};

/// Jaccard coefficient of two shingle sets.
///
/// An empty set on either side scores 0: no evidence of similarity.
pub fn jaccard(a: &ShingleSet, b: &ShingleSet) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // iterate the smaller set
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|s| large.contains(*s)).count();
    let union = a.len() + b.len() - intersection;

    intersection as f64 / union as f64
}

/// Whether two normalized lengths are too far apart to be worth comparing
pub fn lengths_disparate(len_a: usize, len_b: usize, min_ratio: f64) -> bool {
    let (shorter, longer) = if len_a <= len_b {
        (len_a, len_b)
    } else {
        (len_b, len_a)
    };

    if longer == 0 {
        return false;
    }

    (shorter as f64 / longer as f64) < min_ratio
}

/// Scores fingerprints with a length pre-filter in front of the Jaccard test
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    length_filter_ratio: f64,
}

/// Outcome of scoring one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Lengths differ too much; shingles never compared
    Filtered,
    Jaccard(f64),
}

impl Score {
    pub fn value(self) -> f64 {
        match self {
            Score::Filtered => 0.0,
            Score::Jaccard(value) => value,
        }
    }
}

impl Scorer {
    pub fn new(length_filter_ratio: f64) -> Self {
        Self {
            length_filter_ratio,
        }
    }

    pub fn score(&self, a: &Fingerprint, b: &Fingerprint) -> Score {
        if lengths_disparate(a.normalized_len, b.normalized_len, self.length_filter_ratio) {
            return Score::Filtered;
        }
        Score::Jaccard(jaccard(&a.shingles, &b.shingles))
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shingles::{Shingler, Tokenizer};

    fn fp(text: &str) -> Fingerprint {
        Shingler::default().fingerprint(text)
    }

    #[test]
    fn test_identical_texts() {
        let a = fp("This is a test article about machine learning");
        assert_eq!(Scorer::default().score(&a, &a).value(), 1.0);
    }

    #[test]
    fn test_self_similarity_short_text() {
        let a = fp("hello");
        assert_eq!(Scorer::default().score(&a, &a).value(), 1.0);
    }

    #[test]
    fn test_completely_different_texts() {
        let a = fp("Apple announces new iPhone");
        let b = fp("Climate change impacts global weather");
        assert_eq!(Scorer::default().score(&a, &b).value(), 0.0);
    }

    #[test]
    fn test_electric_car_vs_vehicle() {
        let a = fp("Tesla launches new electric car");
        let b = fp("Tesla launches new electric vehicle");
        assert_eq!(Scorer::default().score(&a, &b).value(), 0.5);
    }

    #[test]
    fn test_similar_texts_low_overlap() {
        let a = fp("Tesla launches new electric car model in China");
        let b = fp("Tesla unveils new electric vehicle model in China");
        let score = Scorer::default().score(&a, &b).value();
        assert!(score > 0.05);
        assert!(score < 0.3);
    }

    #[test]
    fn test_symmetry() {
        let texts = [
            "Tesla launches new electric car",
            "Tesla launches new electric vehicle in Berlin",
            "hello",
            "",
            "Markets rally as inflation cools and the central bank holds rates",
        ];
        let scorer = Scorer::default();
        for a in &texts {
            for b in &texts {
                let (fa, fb) = (fp(a), fp(b));
                assert_eq!(scorer.score(&fa, &fb), scorer.score(&fb, &fa));
            }
        }
    }

    #[test]
    fn test_empty_sets_score_zero() {
        let empty = fp("");
        let other = fp("world news today");
        assert_eq!(Scorer::default().score(&empty, &empty).value(), 0.0);
        assert_eq!(Scorer::default().score(&empty, &other).value(), 0.0);
        assert_eq!(jaccard(&ShingleSet::new(), &ShingleSet::new()), 0.0);
    }

    #[test]
    fn test_length_filter_short_circuits_shared_shingles() {
        // b contains every shingle of a but is far longer
        let a = fp("stock markets rally");
        let b = fp("stock markets rally as investors cheer the strongest jobs report in years");
        assert!(jaccard(&a.shingles, &b.shingles) > 0.0);
        assert_eq!(Scorer::new(0.5).score(&a, &b), Score::Filtered);
        assert_eq!(Scorer::new(0.5).score(&a, &b).value(), 0.0);
    }

    #[test]
    fn test_zero_ratio_disables_length_filter() {
        let a = fp("stock markets rally");
        let b = fp("stock markets rally as investors cheer the strongest jobs report in years");
        assert!(matches!(Scorer::new(0.0).score(&a, &b), Score::Jaccard(v) if v > 0.0));
    }

    #[test]
    fn test_lengths_disparate_boundary() {
        assert!(!lengths_disparate(5, 10, 0.5));
        assert!(lengths_disparate(4, 10, 0.5));
        assert!(!lengths_disparate(10, 4, 0.4));
        assert!(!lengths_disparate(0, 0, 0.5));
        assert!(lengths_disparate(0, 3, 0.5));
    }
}
