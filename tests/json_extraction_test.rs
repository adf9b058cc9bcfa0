use revos_lib::llm::json_utils::extract_json;
use revos_lib::quiz::model::QuizPayload;

#[test]
fn extracts_quiz_from_fenced_output() {
    let raw = r#"Here is the quiz you asked for:
```json
{
  "questions": [
    {
      "type": "MCQ_SINGLE",
      "id": "q1",
      "question": "What is the SI unit of force?",
      "options": ["newton", "joule", "watt", "pascal"],
      "correctOption": 0
    }
  ]
}
```
Let me know if you need more questions!"#;

    let json = extract_json(raw).unwrap();
    let payload: QuizPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(payload.questions.len(), 1);
    assert_eq!(payload.questions[0].id(), "q1");
}

#[test]
fn extracts_quiz_despite_trailing_commas_and_smart_quotes() {
    let raw = "{\u{201C}questions\u{201D}: [{\u{201C}type\u{201D}: \u{201C}SHORT\u{201D}, \u{201C}id\u{201D}: \u{201C}q1\u{201D}, \u{201C}question\u{201D}: \u{201C}Define work\u{201D},},],}";
    let json = extract_json(raw).unwrap();
    let payload: QuizPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(payload.questions.len(), 1);
}

#[test]
fn refusal_text_is_an_error_not_a_panic() {
    let raw = "I'm sorry, I can't produce a quiz about that topic.";
    assert!(extract_json(raw).is_err());
}

#[test]
fn json_embedded_mid_sentence_is_found() {
    let raw = r#"Sure thing: {"questions": []} ... enjoy."#;
    let json = extract_json(raw).unwrap();
    assert_eq!(json, r#"{"questions": []}"#);
}
