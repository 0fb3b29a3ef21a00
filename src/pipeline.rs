//! Filtering pipeline
//!
//! [`multi_filter`] validates the corpus and the spec, then runs the eight stages in a
//! fixed order. Every stage reads the previous stage's output and produces a new
//! collection. A stage checks its own parameter right before it runs, so with several
//! bad parameters only the first one in stage order is reported, and the rows narrowed
//! by earlier stages are discarded with the error.

use serde_json::Value;
use std::collections::HashSet;
use std::time::Instant;

use crate::config::{expect_str_list, FilterSpec};
use crate::corpus::{Corpus, WordRecord};
use crate::error::{FilterError, Result};
use crate::filter::{
    anagram_from_param, LengthFilter, LetterSetFilter, NoCompoundFilter, PositionFilter,
    PrefixFilter, SuffixFilter, WordPredicate,
};
use crate::telemetry::{FilterRunStats, RunSummary, Telemetry};

/// Above this many anagram letters the candidate enumeration gets slow
const ANAGRAM_WARN_LETTERS: usize = 10;

/// Successful run: surviving rows plus telemetry
#[derive(Debug, Clone)]
pub struct FilteredCorpus {
    pub corpus: Corpus,
    pub summary: RunSummary,
    pub telemetry: Telemetry,
    column: usize,
}

impl FilteredCorpus {
    /// Surviving words, in corpus order
    pub fn words(&self) -> Vec<&str> {
        self.corpus
            .records()
            .iter()
            .filter_map(|r| r.field(self.column))
            .collect()
    }

    pub fn stages(&self) -> &[FilterRunStats] {
        self.telemetry.stages()
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

/// Check corpus shape, column and the `contains`/`not_contain` conflict.
///
/// All other parameters are checked by their own stage.
pub fn validate(corpus: &Corpus, column: &str, spec: &FilterSpec) -> Result<()> {
    if let Some(defect) = corpus.shape_error() {
        return Err(FilterError::InvalidInputType(defect));
    }

    locate_column(corpus, column)?;

    if let (Some(contains), Some(not_contain)) = (&spec.contains, &spec.not_contain) {
        check_letter_conflict(contains, not_contain)?;
    }

    Ok(())
}

fn locate_column(corpus: &Corpus, column: &str) -> Result<usize> {
    corpus
        .column_index(column)
        .ok_or_else(|| FilterError::MissingColumn {
            column: column.to_string(),
            available: corpus.columns().to_vec(),
        })
}

fn check_letter_conflict(contains: &Value, not_contain: &Value) -> Result<()> {
    let required: HashSet<&str> = expect_str_list("contains", contains)?.into_iter().collect();
    let excluded: HashSet<&str> = expect_str_list("not_contain", not_contain)?.into_iter().collect();

    let mut shared: Vec<String> = required
        .intersection(&excluded)
        .map(|s| s.to_string())
        .collect();

    if shared.is_empty() {
        return Ok(());
    }
    shared.sort();
    Err(FilterError::ConflictingFilters { shared })
}

/// Filter `corpus` on the words of `column` according to `spec`.
///
/// Failures are logged at the critical level and returned; no partial result is kept.
pub fn multi_filter(corpus: &Corpus, column: &str, spec: &FilterSpec) -> Result<FilteredCorpus> {
    let mut telemetry = Telemetry::new(spec.log_level, corpus.len());

    match run(corpus, column, spec, &mut telemetry) {
        Ok((filtered, column_idx)) => {
            let summary = telemetry.summarize(filtered.len());
            Ok(FilteredCorpus {
                corpus: filtered,
                summary,
                telemetry,
                column: column_idx,
            })
        }
        Err(e) => {
            telemetry.critical(format_args!("{}", e));
            Err(e)
        }
    }
}

fn run(
    corpus: &Corpus,
    column: &str,
    spec: &FilterSpec,
    telemetry: &mut Telemetry,
) -> Result<(Corpus, usize)> {
    validate(corpus, column, spec)?;
    let column_idx = locate_column(corpus, column)?;

    telemetry.debug(format_args!(
        "-- INITIAL VALUES -- corpus: {} rows x {} columns, column: {}, no_comp = {}, \
         length = {}, start_with = {}, end_with = {}, nth_letters = {}, contains = {}, \
         not_contain = {}, anagram = {}",
        corpus.len(),
        corpus.columns().len(),
        column,
        spec.no_comp,
        show(&spec.length),
        show(&spec.start_with),
        show(&spec.end_with),
        show(&spec.nth_letters),
        show(&spec.contains),
        show(&spec.not_contain),
        show(&spec.anagram),
    ));

    let mut stage = Stage {
        rows: corpus.records().iter().collect(),
        column: column_idx,
        telemetry,
    };

    if spec.no_comp {
        stage.apply(|| Ok(NoCompoundFilter))?;
    }
    if let Some(value) = &spec.length {
        stage.apply(|| LengthFilter::from_param(value))?;
    }
    if let Some(value) = &spec.not_contain {
        stage.apply(|| LetterSetFilter::not_contain_param(value))?;
    }
    if let Some(value) = &spec.contains {
        stage.apply(|| LetterSetFilter::contains_param(value))?;
    }
    if let Some(value) = &spec.start_with {
        stage.apply(|| PrefixFilter::from_param(value))?;
    }
    if let Some(value) = &spec.nth_letters {
        stage.apply(|| PositionFilter::from_param(value))?;
    }
    if let Some(value) = &spec.end_with {
        stage.apply(|| SuffixFilter::from_param(value))?;
    }
    if let Some(value) = &spec.anagram {
        let letters = value.as_array().map_or(0, Vec::len);
        if letters > ANAGRAM_WARN_LETTERS {
            stage.telemetry.warning(format_args!(
                "anagram over {} letters: candidate generation grows factorially",
                letters
            ));
        }
        stage.apply(|| anagram_from_param(value))?;
    }

    let records: Vec<WordRecord> = stage.rows.into_iter().cloned().collect();
    Ok((Corpus::new(corpus.columns().to_vec(), records), column_idx))
}

/// Rows flowing between stages
struct Stage<'a, 't> {
    rows: Vec<&'a WordRecord>,
    column: usize,
    telemetry: &'t mut Telemetry,
}

impl<'a, 't> Stage<'a, 't> {
    /// Build the stage predicate (type check included) and narrow the rows with it.
    fn apply<P, F>(&mut self, build: F) -> Result<()>
    where
        P: WordPredicate,
        F: FnOnce() -> Result<P>,
    {
        let start = Instant::now();
        let predicate = build()?;
        let rows_before = self.rows.len();

        let column = self.column;
        self.rows = std::mem::take(&mut self.rows)
            .into_iter()
            .filter(|r| r.field(column).is_some_and(|w| predicate.matches(w)))
            .collect();

        self.telemetry
            .record(predicate.name(), start, Instant::now(), rows_before, self.rows.len());
        Ok(())
    }
}

fn show(value: &Option<Value>) -> String {
    value
        .as_ref()
        .map_or_else(|| "None".to_string(), Value::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use serde_json::json;

    fn corpus(words: &[&str]) -> Corpus {
        Corpus::from_words("Mot", words)
    }

    fn quiet() -> FilterSpec {
        FilterSpec::new().with_log_level(LogLevel::None)
    }

    #[test]
    fn test_default_removes_compounds_only() {
        let words = ["Arc-en-ciel", "Chat", "Pomme de terre", "Été", "Tire-bouchon"];
        let result = multi_filter(&corpus(&words), "Mot", &quiet()).unwrap();

        assert_eq!(result.words(), vec!["Chat", "Été"]);
        assert_eq!(result.summary.filters_applied, vec!["no_comp"]);
        assert_eq!(result.summary.total_rows_deleted, 3);
        assert_eq!(result.summary.final_pct_delta, 60.0);
    }

    #[test]
    fn test_compounds_kept_when_disabled() {
        let words = ["Arc-en-ciel", "Chat"];
        let spec = quiet().with_no_comp(false);
        let result = multi_filter(&corpus(&words), "Mot", &spec).unwrap();

        assert_eq!(result.words(), vec!["Arc-en-ciel", "Chat"]);
        assert!(result.summary.filters_applied.is_empty());
    }

    #[test]
    fn test_combined_filters_keep_gratuit() {
        let words = [
            "Gratuit", // every constraint holds
            "Gratuits", // length 8
            "Grabuit",  // contains 'b'
            "Gratait",  // no 'u'
            "Fratuit",  // starts with 'F'
            "Graduit",  // 4th letter 'd'
            "Gratuis",  // ends with "is"
            "Gruatit",  // 4th letter 'a'
        ];
        let spec = quiet()
            .with_start_with("g")
            .with_end_with("it")
            .with_contains(["a", "u"])
            .with_not_contain(["b"])
            .with_nth_letters([(4, 't')])
            .with_length(7);

        let result = multi_filter(&corpus(&words), "Mot", &spec).unwrap();

        assert_eq!(result.words(), vec!["Gratuit"]);
        assert_eq!(
            result.summary.filters_applied,
            vec!["no_comp", "length", "not_contain", "contains", "start_with", "nth_letters", "end_with"]
        );
    }

    #[test]
    fn test_anagram_with_length() {
        let words = ["Cat", "Act", "Tac", "Cart", "Actif"];
        let spec = quiet().with_anagram(["c", "a", "t"]).with_length(3);

        let result = multi_filter(&corpus(&words), "Mot", &spec).unwrap();

        assert_eq!(result.words(), vec!["Cat", "Act", "Tac"]);
        assert_eq!(result.summary.filters_applied, vec!["no_comp", "length", "anagram"]);
    }

    #[test]
    fn test_anagram_subsets_and_accents() {
        let words = ["Été", "Te", "Tête", "E", "Thé"];
        let spec = quiet().with_anagram(["e", "t", "e"]);

        let result = multi_filter(&corpus(&words), "Mot", &spec).unwrap();

        assert_eq!(result.words(), vec!["Été", "Te", "E"]);
    }

    #[test]
    fn test_conflicting_filters_win_over_other_errors() {
        let mut spec = quiet().with_contains(["a"]).with_not_contain(["a", "b"]);
        spec.length = Some(json!("not a number"));

        let err = multi_filter(&corpus(&["Chat"]), "Mot", &spec).unwrap_err();
        assert_eq!(
            err,
            FilterError::ConflictingFilters {
                shared: vec!["a".to_string()]
            }
        );
    }

    #[test]
    fn test_conflict_check_requires_lists() {
        let mut spec = quiet().with_contains(["a"]);
        spec.not_contain = Some(json!("b"));

        let err = multi_filter(&corpus(&["Chat"]), "Mot", &spec).unwrap_err();
        assert!(matches!(
            err,
            FilterError::InvalidParameterType { param: "not_contain", .. }
        ));
    }

    #[test]
    fn test_missing_column() {
        let err = multi_filter(&corpus(&["Chat"]), "Word", &quiet()).unwrap_err();
        assert_eq!(
            err,
            FilterError::MissingColumn {
                column: "Word".to_string(),
                available: vec!["Mot".to_string()],
            }
        );
    }

    #[test]
    fn test_malformed_corpus() {
        let ragged = Corpus::new(
            vec!["Mot".to_string(), "Sens".to_string()],
            vec![WordRecord::from("Chat")],
        );
        let err = multi_filter(&ragged, "Mot", &quiet()).unwrap_err();
        assert!(matches!(err, FilterError::InvalidInputType(_)));
    }

    #[test]
    fn test_first_invalid_stage_is_reported() {
        let mut spec = quiet();
        spec.length = Some(json!("7"));
        spec.end_with = Some(json!(42));

        let err = multi_filter(&corpus(&["Chat"]), "Mot", &spec).unwrap_err();
        assert!(matches!(err, FilterError::InvalidParameterType { param: "length", .. }));
    }

    #[test]
    fn test_end_with_checks_its_own_type() {
        let mut spec = quiet().with_start_with("c");
        spec.end_with = Some(json!(["at"]));

        let err = multi_filter(&corpus(&["Chat"]), "Mot", &spec).unwrap_err();
        assert!(matches!(err, FilterError::InvalidParameterType { param: "end_with", .. }));

        // A valid end_with needs no start_with
        let spec = quiet().with_end_with("at");
        let result = multi_filter(&corpus(&["Chat", "Chien"]), "Mot", &spec).unwrap();
        assert_eq!(result.words(), vec!["Chat"]);
    }

    #[test]
    fn test_nth_letters_shape_error() {
        let mut spec = quiet();
        spec.nth_letters = Some(json!([[2, "ab"]]));

        let err = multi_filter(&corpus(&["Chat"]), "Mot", &spec).unwrap_err();
        assert!(matches!(err, FilterError::InvalidNthLettersShape(_)));
    }

    #[test]
    fn test_nth_letters_property() {
        let words = ["A", "Ba", "Chat", "Ananas", "Maison", "Ta"];
        let spec = quiet().with_nth_letters([(2, 'a')]);

        let result = multi_filter(&corpus(&words), "Mot", &spec).unwrap();

        assert_eq!(result.words(), vec!["Ba", "Maison", "Ta"]);
        for word in result.words() {
            let chars: Vec<char> = word.chars().collect();
            assert!(chars.len() > 1 && chars[1] == 'a');
        }
    }

    #[test]
    fn test_nth_letters_duplicate_rank_last_wins() {
        let words = ["Ba", "Bo"];
        let spec = quiet().with_nth_letters([(2, 'a'), (2, 'o')]);

        let result = multi_filter(&corpus(&words), "Mot", &spec).unwrap();
        assert_eq!(result.words(), vec!["Bo"]);
    }

    #[test]
    fn test_length_property() {
        let words = ["A", "Chat", "Chats", "Été", "Ours"];
        let spec = quiet().with_length(4);

        let result = multi_filter(&corpus(&words), "Mot", &spec).unwrap();

        assert_eq!(result.words(), vec!["Chat", "Ours"]);
        assert!(result.words().iter().all(|w| w.chars().count() == 4));
    }

    #[test]
    fn test_idempotent() {
        let words = ["Gratuit", "Arc-en-ciel", "Cat", "Tac", "Acte", "Ciel", "Bateau"];
        let spec = quiet().with_contains(["a"]).with_not_contain(["b"]);

        let first = multi_filter(&corpus(&words), "Mot", &spec).unwrap();
        let second = multi_filter(&first.corpus, "Mot", &spec).unwrap();

        assert_eq!(first.corpus, second.corpus);
        assert_eq!(second.summary.total_rows_deleted, 0);
    }

    #[test]
    fn test_log_level_does_not_change_result() {
        let words = ["Gratuit", "Arc-en-ciel", "Cat", "Tac", "Acte", "Ciel", "Bateau"];
        let spec = FilterSpec::new()
            .with_contains(["a"])
            .with_not_contain(["b"])
            .with_anagram(["t", "a", "c", "e"]);

        let debug = spec.clone().with_log_level(LogLevel::Debug);
        let verbose = multi_filter(&corpus(&words), "Mot", &debug).unwrap();
        let silent =
            multi_filter(&corpus(&words), "Mot", &spec.with_log_level(LogLevel::None)).unwrap();

        assert_eq!(verbose.corpus, silent.corpus);
        assert_eq!(verbose.summary.filters_applied, silent.summary.filters_applied);
        // "Acte" only holds an uppercase 'A'
        assert_eq!(verbose.words(), vec!["Cat", "Tac"]);
    }

    #[test]
    fn test_validate_only_checks_up_front_errors() {
        let words = corpus(&["Chat"]);

        assert_eq!(validate(&words, "Mot", &quiet().with_length(4)), Ok(()));
        // Stage parameters are checked when their stage runs
        let mut spec = quiet();
        spec.length = Some(serde_json::json!("quatre"));
        assert_eq!(validate(&words, "Mot", &spec), Ok(()));

        assert!(matches!(
            validate(&words, "Word", &spec),
            Err(FilterError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_empty_result_is_success() {
        let spec = quiet().with_length(12);
        let result = multi_filter(&corpus(&["Chat"]), "Mot", &spec).unwrap();

        assert!(result.is_empty());
        assert_eq!(result.summary.final_pct_delta, 100.0);
    }

    #[test]
    fn test_empty_corpus() {
        let result = multi_filter(&corpus(&[]), "Mot", &quiet().with_length(3)).unwrap();

        assert!(result.is_empty());
        assert_eq!(result.summary.final_pct_delta, 0.0);
        assert!(result.stages().iter().all(|s| s.global_delta_pct == 0.0));
    }

    #[test]
    fn test_other_columns_carried_along() {
        let corpus = Corpus::new(
            vec!["Mot".to_string(), "Définitions".to_string()],
            vec![
                WordRecord::new(vec!["Chat".to_string(), "['Félin.']".to_string()]),
                WordRecord::new(vec!["Porte-clé".to_string(), "['Anneau.']".to_string()]),
            ],
        );

        let result = multi_filter(&corpus, "Mot", &quiet()).unwrap();

        assert_eq!(result.corpus.columns(), corpus.columns());
        assert_eq!(result.corpus.records(), &corpus.records()[..1]);
    }

    #[test]
    fn test_stage_stats() {
        let words = ["Chat", "Chien", "Arc-en-ciel", "Rat"];
        let spec = quiet().with_length(4);

        let result = multi_filter(&corpus(&words), "Mot", &spec).unwrap();
        let stages = result.stages();

        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].filter_name, "no_comp");
        assert_eq!((stages[0].rows_before, stages[0].rows_after), (4, 3));
        assert_eq!(stages[0].punctual_delta_pct, 25.0);
        assert_eq!(stages[1].filter_name, "length");
        assert_eq!((stages[1].rows_before, stages[1].rows_after), (3, 1));
        assert_eq!(stages[1].punctual_delta_pct, 66.67);
        assert_eq!(stages[1].global_delta_pct, 75.0);
    }
}
