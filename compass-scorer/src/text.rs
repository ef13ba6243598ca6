//! Term weighting for the content engine.
//!
//! [`TfIdf`] is fitted per call over the catalog documents and projects any
//! text into the same L2-normalised sparse space. Cosine similarity between
//! two projections lies in `0.0..=1.0`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

/// Maximum number of terms kept in a fitted vocabulary.
pub const MAX_VOCABULARY: usize = 1000;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
        "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
        "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
        "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
        "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
        "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
        "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
        "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
        "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
        "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
        "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
        "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
        "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its", "itself",
        "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many", "may",
        "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most", "mostly",
        "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
        "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
        "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
        "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
        "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
        "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
        "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something",
        "sometime", "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than",
        "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
        "thereby", "therefore", "therein", "thereupon", "these", "they", "thick", "thin",
        "third", "this", "those", "though", "three", "through", "throughout", "thru", "thus",
        "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two", "un",
        "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
        "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
        "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
        "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
        "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Whether `term` is an English stop word.
#[must_use]
pub fn is_stop_word(term: &str) -> bool {
    STOP_WORDS.contains(term)
}

/// Split `text` into lower-case terms of two or more word characters,
/// dropping stop words.
///
/// # Examples
/// ```
/// use compass_scorer::tokenize;
///
/// assert_eq!(
///     tokenize("Coping_Skills for a family!"),
///     vec!["coping_skills", "family"]
/// );
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().nth(1).is_some())
        .map(str::to_lowercase)
        .filter(|word| !is_stop_word(word))
        .collect()
}

/// Sparse, L2-normalised term vector keyed by vocabulary index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    weights: BTreeMap<usize, f32>,
}

impl SparseVector {
    /// Whether the vector has no non-zero component.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Euclidean norm.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "the norm is a sum of squared weights"
    )]
    pub fn norm(&self) -> f32 {
        self.weights
            .values()
            .map(|weight| weight * weight)
            .sum::<f32>()
            .sqrt()
    }

    /// Cosine similarity with `other`, clamped to `0.0..=1.0`.
    ///
    /// Returns zero when either vector has zero norm.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "cosine similarity divides the dot product by both norms"
    )]
    pub fn cosine(&self, other: &Self) -> f32 {
        let denominator = self.norm() * other.norm();
        if denominator <= 0.0_f32 {
            return 0.0_f32;
        }
        let dot: f32 = self
            .weights
            .iter()
            .filter_map(|(index, weight)| other.weights.get(index).map(|rhs| weight * rhs))
            .sum();
        (dot / denominator).clamp(0.0_f32, 1.0_f32)
    }
}

/// A fitted TF-IDF vocabulary.
///
/// # Examples
/// ```
/// use compass_scorer::TfIdf;
///
/// let space = TfIdf::fit(&["prevention awareness", "addiction therapy recovery"]);
/// let query = space.transform("prevention awareness");
/// let first = space.transform("prevention awareness");
/// assert!((query.cosine(&first) - 1.0).abs() < 1e-6);
/// assert_eq!(query.cosine(&space.transform("addiction recovery")), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfIdf {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfIdf {
    /// Fit a vocabulary over `documents`.
    ///
    /// Keeps at most [`MAX_VOCABULARY`] terms, preferring higher corpus
    /// frequency and then lexical order. Inverse document frequency is
    /// smoothed as `ln((1 + n) / (1 + df)) + 1`.
    #[must_use]
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let mut frequency: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for document in documents {
            let terms = tokenize(document.as_ref());
            let unique: HashSet<&String> = terms.iter().collect();
            for term in &unique {
                frequency.entry((*term).clone()).or_default().1 += 1;
            }
            for term in terms.iter() {
                if let Some(entry) = frequency.get_mut(term) {
                    entry.0 += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize, usize)> = frequency
            .into_iter()
            .map(|(term, (count, df))| (term, count, df))
            .collect();
        ranked.sort_by(|lhs, rhs| rhs.1.cmp(&lhs.1).then_with(|| lhs.0.cmp(&rhs.0)));
        ranked.truncate(MAX_VOCABULARY);

        let total = documents.len();
        let mut vocabulary = HashMap::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (index, (term, _, df)) in ranked.into_iter().enumerate() {
            vocabulary.insert(term, index);
            idf.push(smoothed_idf(total, df));
        }
        Self { vocabulary, idf }
    }

    /// Number of terms in the vocabulary.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether the vocabulary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Project `text` into the fitted space.
    ///
    /// Terms outside the vocabulary are ignored; text without known terms
    /// yields an empty vector.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "term weights multiply small term counts by idf and normalise"
    )]
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for term in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_default() += 1;
            }
        }
        let mut weights: BTreeMap<usize, f32> = counts
            .into_iter()
            .filter_map(|(index, count)| {
                self.idf
                    .get(index)
                    .map(|idf| (index, count as f32 * idf))
            })
            .collect();
        let norm = SparseVector {
            weights: weights.clone(),
        }
        .norm();
        if norm > 0.0_f32 {
            for weight in weights.values_mut() {
                *weight /= norm;
            }
        }
        SparseVector { weights }
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "document counts are small enough to be exact in f32"
)]
fn smoothed_idf(total: usize, df: usize) -> f32 {
    let numerator = 1.0_f32 + total as f32;
    let denominator = 1.0_f32 + df as f32;
    (numerator / denominator).ln() + 1.0_f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("The quick brown fox", vec!["quick", "brown", "fox"])]
    #[case("a I x", Vec::<&str>::new())]
    #[case("family-support, RECOVERY", vec!["family", "support", "recovery"])]
    #[case("healthy_lifestyle 2024", vec!["healthy_lifestyle", "2024"])]
    #[case(
        "Phòng ngừa ma túy cho học sinh",
        vec!["phòng", "ngừa", "ma", "túy", "cho", "học", "sinh"]
    )]
    #[case("Đời sống lành mạnh, ý", vec!["đời", "sống", "lành", "mạnh"])]
    fn tokenizes_words(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(tokenize(text), expected);
    }

    #[rstest]
    #[expect(
        clippy::float_arithmetic,
        reason = "test compares floating point similarities"
    )]
    fn identical_text_has_unit_similarity() {
        let space = TfIdf::fit(&["coping skills workshop", "recovery planning"]);
        let vector = space.transform("coping skills workshop");
        assert!((vector.cosine(&vector) - 1.0_f32).abs() < 0.000_1_f32);
    }

    #[rstest]
    fn disjoint_text_has_zero_similarity() {
        let space = TfIdf::fit(&["coping skills", "recovery planning"]);
        let lhs = space.transform("coping skills");
        let rhs = space.transform("recovery planning");
        assert_eq!(lhs.cosine(&rhs), 0.0_f32);
    }

    #[rstest]
    fn accented_words_stay_whole() {
        let space = TfIdf::fit(&["Phòng ngừa", "Năng lượng"]);
        assert_eq!(space.len(), 4);
        let lhs = space.transform("Phòng ngừa");
        let rhs = space.transform("Năng lượng");
        assert!(!lhs.is_empty());
        assert_eq!(lhs.cosine(&rhs), 0.0_f32);
    }

    #[rstest]
    fn empty_corpus_yields_empty_vectors() {
        let space = TfIdf::fit::<&str>(&[]);
        assert!(space.is_empty());
        let vector = space.transform("anything");
        assert!(vector.is_empty());
        assert_eq!(vector.cosine(&vector), 0.0_f32);
    }

    #[rstest]
    #[expect(
        clippy::float_arithmetic,
        reason = "test compares floating point idf values"
    )]
    fn rare_terms_weigh_more() {
        let space = TfIdf::fit(&["common rare", "common", "common"]);
        let common = space.vocabulary.get("common").and_then(|i| space.idf.get(*i));
        let rare = space.vocabulary.get("rare").and_then(|i| space.idf.get(*i));
        let (Some(common), Some(rare)) = (common, rare) else {
            panic!("both terms should be in the vocabulary");
        };
        assert!((common - 1.0_f32).abs() < 0.000_1_f32);
        assert!(rare > common);
    }

    #[rstest]
    fn vocabulary_is_capped_by_frequency() {
        let mut documents: Vec<String> = (0..MAX_VOCABULARY)
            .map(|index| format!("term{index}"))
            .collect();
        documents.push("popular popular".to_owned());
        let space = TfIdf::fit(&documents);
        assert_eq!(space.len(), MAX_VOCABULARY);
        assert!(space.vocabulary.contains_key("popular"));
        assert!(space.vocabulary.contains_key("term0"));
    }
}
