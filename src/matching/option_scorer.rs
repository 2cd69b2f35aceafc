use crate::dom::dom_model::SelectOption;
use crate::matching::field_mappings::{YesNoAnswer, is_yes_no_question};
use crate::matching::normalize::normalize_text;

pub const PLACEHOLDER_PENALTY: i32 = -5;
pub const YES_NO_BONUS: i32 = 10;
pub const EXACT_BONUS: i32 = 8;
pub const TEXT_CONTAINS_BONUS: i32 = 5;
pub const VALUE_CONTAINS_BONUS: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredOption {
    /// Position in document order.
    pub index: usize,
    pub option: SelectOption,
    pub score: i32,
}

/// Score every option of a selection list against `suggested_value`,
/// best first. Equal scores keep document order.
pub fn rank_options(options: &[SelectOption], suggested_value: &str, label_text: &str) -> Vec<ScoredOption> {
    let wanted = normalize_text(suggested_value);
    let wanted_answer = if is_yes_no_question(label_text) {
        YesNoAnswer::from_normalized(&wanted)
    } else {
        None
    };

    let mut scored: Vec<ScoredOption> = options
        .iter()
        .enumerate()
        .map(|(index, option)| ScoredOption {
            index,
            option: option.clone(),
            score: score_option(option, &wanted, wanted_answer),
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// The option to select, or `None` when nothing scores above zero and the
/// list cannot be set safely.
pub fn choose_option(options: &[SelectOption], suggested_value: &str, label_text: &str) -> Option<SelectOption> {
    rank_options(options, suggested_value, label_text)
        .into_iter()
        .next()
        .filter(|best| best.score > 0)
        .map(|best| best.option)
}

fn score_option(option: &SelectOption, wanted: &str, wanted_answer: Option<YesNoAnswer>) -> i32 {
    let text = normalize_text(&option.text);
    let value = normalize_text(&option.value);
    let mut score = 0;

    if option.value.is_empty() && text.contains("select") {
        score += PLACEHOLDER_PENALTY;
    }

    if let Some(answer) = wanted_answer {
        if answer.patterns().iter().any(|p| matches_answer(&text, p)) {
            score += YES_NO_BONUS;
        }
    }

    if wanted.is_empty() {
        return score;
    }

    if text == wanted || value == wanted {
        score += EXACT_BONUS;
    } else if contains_either(&text, wanted) {
        score += TEXT_CONTAINS_BONUS;
    } else if contains_either(&value, wanted) {
        score += VALUE_CONTAINS_BONUS;
    }

    score
}

/// Whole-word match, so "n" does not fire on every option containing an n.
fn matches_answer(text: &str, pattern: &str) -> bool {
    text == pattern || text.split(' ').any(|word| word == pattern)
}

fn contains_either(candidate: &str, wanted: &str) -> bool {
    !candidate.is_empty() && (candidate.contains(wanted) || wanted.contains(candidate))
}
