use std::cmp::Ordering;
use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::models::TopicChip;

/// Normalization and labelling rules for topics.
///
/// Two raw spellings are the same topic iff [`TopicNormalizer::normalize_topic`]
/// maps them to the same string. Labels are derived with
/// [`TopicNormalizer::pretty_label`] from the first spelling seen for a value.
pub struct TopicNormalizer;

impl TopicNormalizer {
    /// Normalizes a raw topic to its identity key.
    ///
    /// Trims surrounding whitespace and lowercases every character. Inner
    /// whitespace and hyphens are kept as they are.
    ///
    /// # Examples
    ///
    /// ```
    /// use prasang::topics::TopicNormalizer;
    ///
    /// assert_eq!(TopicNormalizer::normalize_topic(" DIWALI "), "diwali");
    /// assert_eq!(TopicNormalizer::normalize_topic("Guru Purnima"), "guru purnima");
    /// ```
    #[must_use]
    pub fn normalize_topic(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Renders a raw topic as a title-cased label.
    ///
    /// # Labelling rules
    ///
    /// - Splits on `-`, then splits each segment on runs of whitespace
    /// - Uppercases the first character of every word and lowercases the rest
    /// - Rejoins words with a single space and segments with `-`
    /// - Empty words pass through unchanged
    ///
    /// Acronyms are not preserved: "NASA" becomes "Nasa".
    ///
    /// # Examples
    ///
    /// ```
    /// use prasang::topics::TopicNormalizer;
    ///
    /// assert_eq!(TopicNormalizer::pretty_label("guru-purnima"), "Guru-Purnima");
    /// assert_eq!(TopicNormalizer::pretty_label("guru   purnima"), "Guru Purnima");
    /// assert_eq!(TopicNormalizer::pretty_label("NASA"), "Nasa");
    /// ```
    #[must_use]
    pub fn pretty_label(raw: &str) -> String {
        raw.split('-')
            .map(|segment| {
                split_whitespace_runs(segment)
                    .into_iter()
                    .map(title_case_word)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Builds the selectable chip list from raw topic rows.
    ///
    /// Deduplicates by normalized value, electing the label from the first
    /// spelling encountered, then sorts by label (see [`compare_labels`]).
    /// Blank topics are skipped.
    #[must_use]
    pub fn build_chips<I, S>(raw_topics: I) -> Vec<TopicChip>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chips = Self::first_spellings(raw_topics);
        chips.sort_by(|a, b| {
            compare_labels(&a.label, &b.label).then_with(|| a.value.cmp(&b.value))
        });
        chips
    }

    /// Builds the chips shown on a single record card.
    ///
    /// Same deduplication and labelling as [`TopicNormalizer::build_chips`],
    /// but keeps the record's own topic order instead of sorting.
    #[must_use]
    pub fn record_chips(topics: &[String]) -> Vec<TopicChip> {
        Self::first_spellings(topics)
    }

    /// Returns the set of normalized values for a record's raw topics.
    #[must_use]
    pub fn topic_set(topics: &[String]) -> HashSet<String> {
        topics
            .iter()
            .map(|topic| Self::normalize_topic(topic))
            .filter(|value| !value.is_empty())
            .collect()
    }

    fn first_spellings<I, S>(raw_topics: I) -> Vec<TopicChip>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        raw_topics
            .into_iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                let value = Self::normalize_topic(raw);
                if value.is_empty() || !seen.insert(value.clone()) {
                    return None;
                }
                Some(TopicChip::new(value, Self::pretty_label(raw.trim())))
            })
            .collect()
    }
}

/// Orders labels the way a UI collator would for Latin text.
///
/// Compares labels with accents stripped and case folded first, so "Élan"
/// sorts next to "Eka" rather than after "Zeta". Ties put lowercase before
/// uppercase at the first differing position, then fall back to code points
/// so the order is total.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use prasang::topics::compare_labels;
///
/// assert_eq!(compare_labels("Élan", "Omkar"), Ordering::Less);
/// assert_eq!(compare_labels("seva", "Seva"), Ordering::Less);
/// ```
#[must_use]
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| case_order(a, b))
        .then_with(|| a.cmp(b))
}

/// Decomposes to NFD, drops combining marks and lowercases.
fn primary_key(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn case_order(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        if x.is_lowercase() && y.is_uppercase() {
            return Ordering::Less;
        }
        if x.is_uppercase() && y.is_lowercase() {
            return Ordering::Greater;
        }
    }
    Ordering::Equal
}

/// Splits on runs of whitespace, keeping empty leading and trailing words.
fn split_whitespace_runs(segment: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut in_gap = false;

    for (i, c) in segment.char_indices() {
        if c.is_whitespace() {
            if !in_gap {
                words.push(&segment[start..i]);
                in_gap = true;
            }
        } else if in_gap {
            start = i;
            in_gap = false;
        }
    }

    if in_gap {
        words.push("");
    } else {
        words.push(&segment[start..]);
    }
    words
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(chips: &[TopicChip]) -> Vec<&str> {
        chips.iter().map(|c| c.value.as_str()).collect()
    }

    fn labels(chips: &[TopicChip]) -> Vec<&str> {
        chips.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(TopicNormalizer::normalize_topic("Diwali"), "diwali");
        assert_eq!(TopicNormalizer::normalize_topic("diwali "), "diwali");
        assert_eq!(TopicNormalizer::normalize_topic("\t DIWALI\n"), "diwali");
        assert_eq!(TopicNormalizer::normalize_topic("Guru-Purnima"), "guru-purnima");
    }

    #[test]
    fn test_normalize_keeps_inner_whitespace() {
        assert_eq!(
            TopicNormalizer::normalize_topic("  Guru  Purnima "),
            "guru  purnima"
        );
    }

    #[test]
    fn test_pretty_label_hyphen_and_space() {
        assert_eq!(TopicNormalizer::pretty_label("guru-purnima"), "Guru-Purnima");
        assert_eq!(TopicNormalizer::pretty_label("guru purnima"), "Guru Purnima");
        assert_eq!(
            TopicNormalizer::pretty_label("akshar purushottam-darshan"),
            "Akshar Purushottam-Darshan"
        );
    }

    #[test]
    fn test_pretty_label_lowercases_rest_of_word() {
        assert_eq!(TopicNormalizer::pretty_label("NASA"), "Nasa");
        assert_eq!(TopicNormalizer::pretty_label("mAnDiR"), "Mandir");
    }

    #[test]
    fn test_pretty_label_collapses_whitespace_runs() {
        assert_eq!(TopicNormalizer::pretty_label("bal \t  sabha"), "Bal Sabha");
    }

    #[test]
    fn test_pretty_label_empty_words_pass_through() {
        assert_eq!(TopicNormalizer::pretty_label(""), "");
        assert_eq!(TopicNormalizer::pretty_label("a--b"), "A--B");
        assert_eq!(TopicNormalizer::pretty_label(" seva"), " Seva");
        assert_eq!(TopicNormalizer::pretty_label("seva "), "Seva ");
    }

    #[test]
    fn test_pretty_label_non_ascii() {
        assert_eq!(TopicNormalizer::pretty_label("élan vital"), "Élan Vital");
    }

    #[test]
    fn test_build_chips_first_occurrence_wins() {
        let chips = TopicNormalizer::build_chips(["Diwali", "diwali ", " DIWALI"]);

        assert_eq!(chips, vec![TopicChip::new("diwali", "Diwali")]);
    }

    #[test]
    fn test_build_chips_first_spelling_elects_label() {
        let chips = TopicNormalizer::build_chips(["guru-PURNIMA", "Guru-Purnima"]);

        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].label, "Guru-Purnima");
        assert_eq!(chips[0].value, "guru-purnima");
    }

    #[test]
    fn test_build_chips_sorted_by_label() {
        let chips = TopicNormalizer::build_chips(["seva", "Bal Sabha", "akshar", "Mandir"]);

        assert_eq!(labels(&chips), vec!["Akshar", "Bal Sabha", "Mandir", "Seva"]);
        assert_eq!(values(&chips), vec!["akshar", "bal sabha", "mandir", "seva"]);
    }

    #[test]
    fn test_build_chips_no_duplicate_values() {
        let raw = ["a", "A", "b", " b", "B ", "c-d", "C-D", "c d"];
        let chips = TopicNormalizer::build_chips(raw);

        let mut seen = HashSet::new();
        for chip in &chips {
            assert!(seen.insert(chip.value.clone()), "duplicate {}", chip.value);
        }
        assert_eq!(chips.len(), 4);
    }

    #[test]
    fn test_build_chips_output_is_sorted() {
        let raw = ["zeta", "Alpha", "beta", "Gamma-ray", "gamma", "delta epsilon"];
        let chips = TopicNormalizer::build_chips(raw);

        for pair in chips.windows(2) {
            assert_ne!(
                compare_labels(&pair[0].label, &pair[1].label),
                Ordering::Greater,
                "{} should not sort after {}",
                pair[0].label,
                pair[1].label
            );
        }
    }

    #[test]
    fn test_build_chips_empty_input() {
        let chips = TopicNormalizer::build_chips(Vec::<String>::new());
        assert!(chips.is_empty());
    }

    #[test]
    fn test_build_chips_skips_blank_topics() {
        let chips = TopicNormalizer::build_chips(["", "   ", "seva"]);
        assert_eq!(values(&chips), vec!["seva"]);
    }

    #[test]
    fn test_record_chips_keep_record_order() {
        let topics = vec![
            "Seva".to_string(),
            "akshar".to_string(),
            "SEVA ".to_string(),
        ];
        let chips = TopicNormalizer::record_chips(&topics);

        assert_eq!(labels(&chips), vec!["Seva", "Akshar"]);
    }

    #[test]
    fn test_record_chips_agree_with_chip_list_labels() {
        let topics = vec!["guru-purnima".to_string(), "bal sabha".to_string()];

        let from_record = TopicNormalizer::record_chips(&topics);
        let from_list = TopicNormalizer::build_chips(&topics);

        for chip in &from_record {
            assert!(from_list.contains(chip));
        }
    }

    #[test]
    fn test_topic_set_dedupes_by_value() {
        let topics = vec!["X".to_string(), "x ".to_string(), "y".to_string()];
        let set = TopicNormalizer::topic_set(&topics);

        assert_eq!(set.len(), 2);
        assert!(set.contains("x"));
        assert!(set.contains("y"));
    }

    #[test]
    fn test_compare_labels_case_folded_first() {
        assert_eq!(compare_labels("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_labels("Banana", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_build_chips_sorts_accented_labels_with_base_letters() {
        let chips = TopicNormalizer::build_chips(["zeta", "élan", "eka", "Öl", "omkar"]);

        assert_eq!(labels(&chips), vec!["Eka", "Élan", "Öl", "Omkar", "Zeta"]);
    }

    #[test]
    fn test_compare_labels_ignores_accents_then_breaks_ties() {
        assert_eq!(compare_labels("Élan", "Emu"), Ordering::Less);
        assert_eq!(compare_labels("Öl", "Omkar"), Ordering::Less);
        assert_eq!(compare_labels("Elan", "Élan"), Ordering::Less);
        assert_eq!(compare_labels("Élan", "Elan"), Ordering::Greater);
    }

    #[test]
    fn test_build_chips_label_ignores_surrounding_whitespace_of_first_spelling() {
        let chips = TopicNormalizer::build_chips([" DIWALI", "Diwali"]);
        assert_eq!(chips, vec![TopicChip::new("diwali", "Diwali")]);

        let chips = TopicNormalizer::build_chips(["  guru  purnima ", "Guru Purnima"]);
        assert_eq!(chips[0].label, "Guru Purnima");
        assert_eq!(chips[0].value, "guru  purnima");

        let topics = vec!["\tSeva ".to_string()];
        assert_eq!(TopicNormalizer::record_chips(&topics)[0].label, "Seva");
    }

    #[test]
    fn test_compare_labels_lowercase_before_uppercase_on_tie() {
        assert_eq!(compare_labels("seva", "Seva"), Ordering::Less);
        assert_eq!(compare_labels("Seva", "seva"), Ordering::Greater);
        assert_eq!(compare_labels("Seva", "Seva"), Ordering::Equal);
    }
}
