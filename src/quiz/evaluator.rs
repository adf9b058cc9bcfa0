use crate::quiz::model::{AnswerValue, QuizQuestion};

/// Grade one answer against one question.
///
/// Returns `Some(true)` for a correct answer, `Some(false)` for an incorrect
/// one, and `None` when no verdict can be given: the question was not
/// answered, its grading key is missing, or the answer shape does not match
/// the question type. `None` is not an error and must be excluded from
/// accuracy denominators by callers.
///
/// Pure function: no side effects, no ordering dependency.
pub fn evaluate(question: &QuizQuestion, answer: Option<&AnswerValue>) -> Option<bool> {
    let answer = answer?;

    match question {
        QuizQuestion::McqSingle { correct_option, .. } => {
            let selected = match answer {
                AnswerValue::McqSingle { value } => (*value)?,
                _ => return None,
            };
            let correct = (*correct_option)?;
            Some(selected == correct)
        }

        QuizQuestion::McqMulti {
            correct_options, ..
        } => {
            let selected = match answer {
                AnswerValue::McqMulti { value } => value,
                _ => return None,
            };
            if selected.is_empty() {
                return None;
            }
            let expected = correct_options.as_ref()?;
            if expected.is_empty() {
                return None;
            }
            // Selection order must not affect the verdict
            let mut selected = selected.clone();
            let mut expected = expected.clone();
            selected.sort_unstable();
            selected.dedup();
            expected.sort_unstable();
            expected.dedup();
            Some(selected == expected)
        }

        QuizQuestion::AssertionReason {
            assertion_reason, ..
        } => {
            let chosen = match answer {
                AnswerValue::AssertionReason { value } => value,
                _ => return None,
            };
            if chosen.is_empty() {
                return None;
            }
            let key = assertion_reason.as_ref()?;
            Some(chosen == &key.correct_option)
        }

        QuizQuestion::FillBlank { fill_blank, .. } => {
            let text = answer_text(answer)?;
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            let key = fill_blank.as_ref()?;
            let expected = key.answer.trim();
            if expected.is_empty() {
                return None;
            }
            Some(text.eq_ignore_ascii_case(expected))
        }

        QuizQuestion::Numerical { numerical, .. } => {
            let text = answer_text(answer)?;
            let value: f64 = text.trim().parse().ok()?;
            let key = numerical.as_ref()?;
            Some((value - key.final_answer).abs() <= key.tolerance)
        }

        QuizQuestion::Short {
            expected_keywords, ..
        } => {
            let text = answer_text(answer)?;
            let normalized = text.trim().to_lowercase();
            if normalized.is_empty() {
                return None;
            }
            let keywords = expected_keywords.as_ref()?;
            if keywords.is_empty() {
                return None;
            }
            let required = keywords.len().min(2);
            let hits = keywords
                .iter()
                .filter(|kw| {
                    let kw = kw.trim().to_lowercase();
                    !kw.is_empty() && normalized.contains(&kw)
                })
                .count();
            Some(hits >= required)
        }
    }
}

fn answer_text(answer: &AnswerValue) -> Option<&str> {
    match answer {
        AnswerValue::Text { value } => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::{AssertionReasonKey, FillBlankKey, NumericalKey};

    fn mcq_single(correct: Option<u32>) -> QuizQuestion {
        QuizQuestion::McqSingle {
            id: "q1".into(),
            question: "pick one".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option: correct,
        }
    }

    fn text(value: &str) -> AnswerValue {
        AnswerValue::Text {
            value: value.into(),
        }
    }

    #[test]
    fn mcq_single_matches_correct_option() {
        let q = mcq_single(Some(2));
        assert_eq!(
            evaluate(&q, Some(&AnswerValue::McqSingle { value: Some(2) })),
            Some(true)
        );
        assert_eq!(
            evaluate(&q, Some(&AnswerValue::McqSingle { value: Some(1) })),
            Some(false)
        );
    }

    #[test]
    fn mcq_single_without_selection_or_key_is_ungradeable() {
        let q = mcq_single(Some(2));
        assert_eq!(evaluate(&q, None), None);
        assert_eq!(
            evaluate(&q, Some(&AnswerValue::McqSingle { value: None })),
            None
        );
        let keyless = mcq_single(None);
        assert_eq!(
            evaluate(&keyless, Some(&AnswerValue::McqSingle { value: Some(0) })),
            None
        );
    }

    #[test]
    fn mcq_multi_order_does_not_matter() {
        let q = QuizQuestion::McqMulti {
            id: "q".into(),
            question: "pick all".into(),
            options: vec![],
            correct_options: Some(vec![0, 2]),
        };
        assert_eq!(
            evaluate(&q, Some(&AnswerValue::McqMulti { value: vec![2, 0] })),
            Some(true)
        );
        assert_eq!(
            evaluate(&q, Some(&AnswerValue::McqMulti { value: vec![0, 1] })),
            Some(false)
        );
        assert_eq!(
            evaluate(&q, Some(&AnswerValue::McqMulti { value: vec![] })),
            None
        );
    }

    #[test]
    fn assertion_reason_compares_choice() {
        let q = QuizQuestion::AssertionReason {
            id: "q".into(),
            question: "A and R".into(),
            assertion_reason: Some(AssertionReasonKey {
                correct_option: "B".into(),
            }),
        };
        assert_eq!(
            evaluate(
                &q,
                Some(&AnswerValue::AssertionReason { value: "B".into() })
            ),
            Some(true)
        );
        assert_eq!(
            evaluate(
                &q,
                Some(&AnswerValue::AssertionReason { value: "".into() })
            ),
            None
        );
    }

    #[test]
    fn fill_blank_is_case_insensitive_and_trimmed() {
        let q = QuizQuestion::FillBlank {
            id: "q".into(),
            question: "___ law".into(),
            fill_blank: Some(FillBlankKey {
                answer: "Ohm".into(),
            }),
        };
        assert_eq!(evaluate(&q, Some(&text("  ohm "))), Some(true));
        assert_eq!(evaluate(&q, Some(&text("ampere"))), Some(false));
        assert_eq!(evaluate(&q, Some(&text("   "))), None);
    }

    #[test]
    fn numerical_within_tolerance() {
        let q = QuizQuestion::Numerical {
            id: "q".into(),
            question: "g?".into(),
            numerical: Some(NumericalKey {
                final_answer: 10.0,
                tolerance: 1.0,
            }),
        };
        assert_eq!(evaluate(&q, Some(&text("10.5"))), Some(true));
        assert_eq!(evaluate(&q, Some(&text("12"))), Some(false));
        assert_eq!(evaluate(&q, Some(&text("not a number"))), None);
    }

    #[test]
    fn short_requires_two_keywords_or_all_if_fewer() {
        let q = QuizQuestion::Short {
            id: "q".into(),
            question: "explain momentum".into(),
            expected_keywords: Some(vec!["mass".into(), "velocity".into(), "vector".into()]),
        };
        assert_eq!(
            evaluate(&q, Some(&text("Momentum is Mass times VELOCITY"))),
            Some(true)
        );
        assert_eq!(evaluate(&q, Some(&text("it has mass only"))), Some(false));

        let single = QuizQuestion::Short {
            id: "q".into(),
            question: "define inertia".into(),
            expected_keywords: Some(vec!["resistance".into()]),
        };
        assert_eq!(
            evaluate(&single, Some(&text("resistance to change"))),
            Some(true)
        );
    }

    #[test]
    fn type_mismatch_is_ungradeable() {
        let q = mcq_single(Some(1));
        assert_eq!(evaluate(&q, Some(&text("1"))), None);
    }
}
