use serde::{Deserialize, Serialize};

/// A single topic parsed out of a chapter description.
/// Derived on every read, never persisted; order matches source line order
/// and duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub text: String,
    pub completed: bool,
}

/// A display grouping of topics under a header line. Used only for
/// presentation; statistics always go through `extract_topics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub topics: Vec<Topic>,
}

/// Parse checkbox-style topic lines out of a free-text chapter description.
///
/// A line qualifies iff, after trimming, it starts with a `-`, `*` or `•`
/// bullet followed by a `[ ]` / `[x]` marker (case-insensitive). Everything
/// else (prose, headers, malformed lines) is skipped. Never fails: malformed
/// input degrades to fewer or zero topics.
pub fn extract_topics(description: &str) -> Vec<Topic> {
    description.lines().filter_map(parse_topic_line).collect()
}

/// Split a description into display sections. A header is a line wrapped in
/// `**bold**` (optionally with a trailing colon) or a plain line ending in a
/// colon. Topics before the first header land in an untitled section.
pub fn split_sections(description: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current = Section {
        title: String::new(),
        topics: Vec::new(),
    };

    for line in description.lines() {
        if let Some(title) = parse_header_line(line) {
            if !current.topics.is_empty() || !current.title.is_empty() {
                sections.push(current);
            }
            current = Section {
                title,
                topics: Vec::new(),
            };
        } else if let Some(topic) = parse_topic_line(line) {
            current.topics.push(topic);
        }
    }

    if !current.topics.is_empty() || !current.title.is_empty() {
        sections.push(current);
    }

    sections
}

fn parse_topic_line(line: &str) -> Option<Topic> {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();

    match chars.next() {
        Some('-') | Some('*') | Some('•') => {}
        _ => return None,
    }

    let rest = chars.as_str().trim_start();
    let mut rest_chars = rest.chars();
    if rest_chars.next() != Some('[') {
        return None;
    }
    let marker = rest_chars.next()?;
    let completed = match marker {
        ' ' => false,
        'x' | 'X' => true,
        _ => return None,
    };
    if rest_chars.next() != Some(']') {
        return None;
    }

    Some(Topic {
        text: rest_chars.as_str().trim().to_string(),
        completed,
    })
}

fn parse_header_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || parse_topic_line(trimmed).is_some() {
        return None;
    }

    // **Bold header** or **Bold header**:
    if trimmed.starts_with("**") {
        let body = trimmed.trim_end_matches(':').trim();
        if body.len() > 4 && body.ends_with("**") {
            return Some(body[2..body.len() - 2].trim().to_string());
        }
    }

    // Plain header ending in a colon
    if trimmed.ends_with(':') && trimmed.len() > 1 {
        return Some(trimmed[..trimmed.len() - 1].trim().to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_checkbox_lines_and_ignores_prose() {
        let description = "- [x] Newton's Laws\n- [ ] Work Energy\nSome prose line";
        let topics = extract_topics(description);
        assert_eq!(
            topics,
            vec![
                Topic {
                    text: "Newton's Laws".to_string(),
                    completed: true
                },
                Topic {
                    text: "Work Energy".to_string(),
                    completed: false
                },
            ]
        );
    }

    #[test]
    fn empty_description_yields_empty_list() {
        assert!(extract_topics("").is_empty());
        assert!(extract_topics("just prose\nno checkboxes here").is_empty());
    }

    #[test]
    fn accepts_all_bullet_markers_and_uppercase_x() {
        let topics = extract_topics("* [X] Optics\n• [ ] Waves\n-[x] Thermodynamics");
        assert_eq!(topics.len(), 3);
        assert!(topics[0].completed);
        assert!(!topics[1].completed);
        assert!(topics[2].completed);
        assert_eq!(topics[2].text, "Thermodynamics");
    }

    #[test]
    fn malformed_markers_are_skipped() {
        let topics = extract_topics("- [y] bad marker\n- [] no space\n- [ ] good");
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].text, "good");
    }

    #[test]
    fn parsing_is_idempotent() {
        let description = "- [x] A\n- [ ] B\n- [ ] B";
        assert_eq!(extract_topics(description), extract_topics(description));
        // duplicates are allowed
        assert_eq!(extract_topics(description).len(), 3);
    }

    #[test]
    fn sections_group_by_headers() {
        let description =
            "**Mechanics**:\n- [ ] Kinematics\nElectrostatics:\n- [x] Coulomb's Law\n- [ ] Gauss";
        let sections = split_sections(description);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Mechanics");
        assert_eq!(sections[0].topics.len(), 1);
        assert_eq!(sections[1].title, "Electrostatics");
        assert_eq!(sections[1].topics.len(), 2);
    }

    #[test]
    fn topics_before_first_header_get_untitled_section() {
        let sections = split_sections("- [ ] Intro\n**Unit 1**\n- [ ] Vectors");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "");
        assert_eq!(sections[1].title, "Unit 1");
    }
}
