use crate::models::Question;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Upvotes plus age in fractional days. The age term is an additive bonus,
/// not a decay: for equal upvotes an older question outscores a newer one.
pub fn trending_score(question: &Question, now_ms: i64) -> f64 {
    question.upvotes as f64 + (now_ms - question.timestamp) as f64 / MILLIS_PER_DAY
}

pub fn trending(questions: &[Question], now_ms: i64) -> Vec<Question> {
    let mut result = questions.to_vec();
    result.sort_by(|a, b| {
        trending_score(b, now_ms).total_cmp(&trending_score(a, now_ms))
    });
    result
}

pub fn recent(questions: &[Question]) -> Vec<Question> {
    let mut result = questions.to_vec();
    result.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    result
}

/// Keeps questions whose tag set intersects the selection (any match
/// qualifies). An empty selection filters nothing.
pub fn filter_by_tags(questions: &[Question], selected: &[String]) -> Vec<Question> {
    if selected.is_empty() {
        return questions.to_vec();
    }
    questions
        .iter()
        .filter(|question| selected.iter().any(|tag| question.tags.contains(tag)))
        .cloned()
        .collect()
}
