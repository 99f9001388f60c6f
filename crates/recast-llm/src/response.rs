//! Tagged response grammar for code-producing completions
//!
//! A completion is either free-text guidance for the operator (marked with
//! [`INSTRUCTION_MARKER`]) or a batch of generated files. File batches use a
//! fenced-block grammar: sections separated by a literal `---` line, each
//! section a caption line followed by a language-tagged fence. Sections that
//! do not match the shape are dropped and counted, never fatal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prefix marking a completion as human-readable guidance rather than code.
pub const INSTRUCTION_MARKER: &str = "INSTRUCTIONS:";

/// Caption line, opening fence with language tag, body, closing fence.
static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A(.+?)\n```([^\n`]+)\n(.*?)\n?```").expect("section regex")
});

/// One generated file from a code completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Target-relative filename from the section caption
    pub filename: String,
    /// Language tag on the opening fence
    pub language: String,
    /// Fence body, outer whitespace trimmed
    pub content: String,
}

/// Parsed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmResponse {
    /// Guidance for the operator; nothing to persist.
    Instruction(String),
    /// Zero or more generated files.
    Files {
        /// Sections that matched the grammar
        files: Vec<GeneratedFile>,
        /// Sections that did not (unterminated fence, missing caption, ...)
        dropped_sections: usize,
    },
}

impl LlmResponse {
    /// Parse a raw completion into the tagged form.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix(INSTRUCTION_MARKER) {
            return Self::Instruction(rest.trim().to_string());
        }

        let mut files = Vec::new();
        let mut dropped = 0;
        for section in split_sections(raw) {
            match parse_section(&section) {
                Some(file) => files.push(file),
                None if section.trim().is_empty() => {}
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::warn!(dropped, "completion sections did not match the fenced-block grammar");
        }

        Self::Files {
            files,
            dropped_sections: dropped,
        }
    }

    /// True when the completion produced nothing usable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Instruction(text) => text.is_empty(),
            Self::Files { files, .. } => files.is_empty(),
        }
    }
}

/// Split on separator lines consisting of `---`.
fn split_sections(raw: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    for line in raw.lines() {
        if line.trim() == "---" {
            sections.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    sections.push(current);
    sections
}

fn parse_section(section: &str) -> Option<GeneratedFile> {
    let trimmed = section.trim_start_matches('\n');
    let caps = SECTION_RE.captures(trimmed)?;
    let filename = caps.get(1)?.as_str().trim().to_string();
    if filename.is_empty() {
        return None;
    }
    Some(GeneratedFile {
        filename,
        language: caps.get(2)?.as_str().trim().to_string(),
        content: caps.get(3)?.as_str().trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn response_single_section() {
        let raw = "foo.py\n```python\nprint(1)\n```";
        let response = LlmResponse::parse(raw);

        match response {
            LlmResponse::Files {
                files,
                dropped_sections,
            } => {
                assert_eq!(dropped_sections, 0);
                assert_eq!(
                    files,
                    vec![GeneratedFile {
                        filename: "foo.py".to_string(),
                        language: "python".to_string(),
                        content: "print(1)".to_string(),
                    }]
                );
            }
            other => panic!("expected files, got {other:?}"),
        }
    }

    #[test]
    fn response_unterminated_fence_drops_section() {
        let raw = "foo.py\n```python\nprint(1)";
        let response = LlmResponse::parse(raw);

        match response {
            LlmResponse::Files {
                files,
                dropped_sections,
            } => {
                assert!(files.is_empty());
                assert_eq!(dropped_sections, 1);
            }
            other => panic!("expected files, got {other:?}"),
        }
    }

    #[test]
    fn response_multiple_sections() {
        let raw = "app.js\n```javascript\nconst x = 1;\n```\n---\nutils.js\n```javascript\nmodule.exports = {};\n```";
        let response = LlmResponse::parse(raw);

        match response {
            LlmResponse::Files { files, .. } => {
                assert_eq!(files.len(), 2);
                assert_eq!(files[0].filename, "app.js");
                assert_eq!(files[1].filename, "utils.js");
                assert_eq!(files[1].content, "module.exports = {};");
            }
            other => panic!("expected files, got {other:?}"),
        }
    }

    #[test]
    fn response_instruction_marker() {
        let raw = "INSTRUCTIONS: skip this file, it is a compiled asset";
        let response = LlmResponse::parse(raw);

        assert_eq!(
            response,
            LlmResponse::Instruction("skip this file, it is a compiled asset".to_string())
        );
    }

    #[test]
    fn response_mixed_good_and_bad_sections() {
        let raw = "a.js\n```javascript\n1\n```\n---\nnot a section at all\n---\nb.js\n```javascript\n2\n```";
        let response = LlmResponse::parse(raw);

        match response {
            LlmResponse::Files {
                files,
                dropped_sections,
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(dropped_sections, 1);
            }
            other => panic!("expected files, got {other:?}"),
        }
    }

    #[test]
    fn response_empty_input() {
        let response = LlmResponse::parse("");
        assert!(response.is_empty());
        assert!(matches!(
            response,
            LlmResponse::Files {
                dropped_sections: 0,
                ..
            }
        ));
    }

    #[test]
    fn response_code_starting_with_marker_text_inside_fence() {
        // The marker only counts at the very start of the completion.
        let raw = "readme.md\n```markdown\nINSTRUCTIONS: are described below\n```";
        let response = LlmResponse::parse(raw);

        match response {
            LlmResponse::Files { files, .. } => {
                assert_eq!(files.len(), 1);
                assert!(files[0].content.starts_with("INSTRUCTIONS:"));
            }
            other => panic!("expected files, got {other:?}"),
        }
    }
}
