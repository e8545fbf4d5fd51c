//! Prompt builder for code editing and inline suggestions.
//!
//! [`PromptBuilder`] constructs two kinds of chat prompts:
//! * **Edit** (`build_edit`): the whole document with numbered lines, the
//!   drawn/text selections and the user's instruction.  The model must reply
//!   with `{"codeCompletion": …, "explanation": …}`.
//! * **Inline** (`build_inline`): the text before and after the cursor.  The
//!   model must reply with `{"snippets": [ … ]}`.

use std::fmt::Write as _;
use std::path::Path;

use crate::llm::model::ChatPrompt;
use crate::selection::SelectionInformation;

// ---------------------------------------------------------------------------
// System instructions
// ---------------------------------------------------------------------------

const SYSTEM_INSTRUCTION_EDIT: &str = "\
You are a code editing assistant embedded in a text editor.
Task: Apply the user's instruction to the document and return the complete new document.

Rules:
1. Reply with ONE JSON object and nothing else:
   {\"codeCompletion\": \"<full new document>\", \"explanation\": \"<one or two sentences>\"}
2. codeCompletion is the WHOLE document after the edit, not a fragment or a diff.
3. Do not include line numbers in codeCompletion.
4. Leave every line the instruction does not concern exactly as it is.
5. Selections point at the lines the user marked; the note next to a selection
   is what the user wrote or drew on it. A range bound shown as ? could not be resolved.
6. The explanation is read aloud, so keep it short and avoid code.";

const SYSTEM_INSTRUCTION_INLINE: &str = "\
You are an inline code completion engine.
Task: Suggest what the user is most likely to type next at the cursor.

Rules:
1. Reply with ONE JSON object and nothing else: {\"snippets\": [\"...\", \"...\"]}
2. Each snippet is text inserted at the cursor; do not repeat text before or after it.
3. Give at most three snippets, best first. Give an empty list when nothing fits.";

/// Marker placed between prefix and suffix in inline prompts.
pub const CURSOR_MARKER: &str = "<CURSOR>";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds editor prompts in chat-message format.
///
/// # Example
/// ```rust
/// use std::path::Path;
/// use voice_code_editor::llm::PromptBuilder;
///
/// let lines = vec!["fn main() {}".to_string()];
/// let prompt = PromptBuilder::new().build_edit(Path::new("main.rs"), &lines, &[], "add a doc comment");
/// assert!(prompt.user.contains("1 | fn main() {}"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    _private: (),
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the **(system, user)** pair for a whole-document edit.
    ///
    /// User message structure (in order):
    /// 1. File path
    /// 2. Document, one `N | text` row per line
    /// 3. Selections (omitted when there are none)
    /// 4. Instruction
    pub fn build_edit(
        &self,
        path: &Path,
        lines: &[String],
        selections: &[SelectionInformation],
        instruction: &str,
    ) -> ChatPrompt {
        let mut user = String::with_capacity(64 + lines.iter().map(|l| l.len() + 8).sum::<usize>());

        let _ = writeln!(user, "File: {}", path.display());
        let _ = writeln!(user, "Document ({} lines):", lines.len());
        let width = lines.len().max(1).to_string().len();
        for (i, line) in lines.iter().enumerate() {
            let _ = writeln!(user, "{:>width$} | {}", i + 1, line);
        }

        if !selections.is_empty() {
            user.push_str("\nSelections:\n");
            for sel in selections {
                let _ = writeln!(user, "- lines {}: {}", sel.range_label(), sel.text.trim());
            }
        }

        let _ = write!(user, "\nInstruction:\n{}\n", instruction.trim());

        ChatPrompt {
            system: SYSTEM_INSTRUCTION_EDIT.to_string(),
            user,
        }
    }

    /// Build the **(system, user)** pair for an inline suggestion at the
    /// cursor between `prefix` and `suffix`.
    pub fn build_inline(&self, prefix: &str, suffix: &str) -> ChatPrompt {
        let mut user = String::with_capacity(prefix.len() + suffix.len() + 32);
        user.push_str("Code:\n");
        user.push_str(prefix);
        user.push_str(CURSOR_MARKER);
        user.push_str(suffix);

        ChatPrompt {
            system: SYSTEM_INSTRUCTION_INLINE.to_string(),
            user,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn edit_system_instruction_demands_json_shape() {
        let prompt = PromptBuilder::new().build_edit(Path::new("a.rs"), &[], &[], "x");
        assert!(prompt.system.contains("codeCompletion"));
        assert!(prompt.system.contains("explanation"));
        assert!(prompt.system.contains("WHOLE document"));
    }

    #[test]
    fn edit_prompt_numbers_every_line() {
        let doc = lines(&["fn main() {", "    run();", "}"]);
        let prompt = PromptBuilder::new().build_edit(Path::new("src/main.rs"), &doc, &[], "x");

        assert!(prompt.user.contains("File: src/main.rs"));
        assert!(prompt.user.contains("Document (3 lines):"));
        assert!(prompt.user.contains("1 | fn main() {"));
        assert!(prompt.user.contains("2 |     run();"));
        assert!(prompt.user.contains("3 | }"));
    }

    #[test]
    fn line_numbers_are_right_aligned() {
        let doc: Vec<String> = (1..=10).map(|i| format!("l{i}")).collect();
        let prompt = PromptBuilder::new().build_edit(Path::new("a"), &doc, &[], "x");
        assert!(prompt.user.contains(" 1 | l1\n"));
        assert!(prompt.user.contains("10 | l10\n"));
    }

    #[test]
    fn edit_prompt_lists_selections_with_unresolved_bounds() {
        let selections = vec![
            SelectionInformation {
                line_start: Some(2),
                line_end: Some(4),
                text: "make async".into(),
            },
            SelectionInformation {
                line_start: Some(7),
                line_end: None,
                text: " delete ".into(),
            },
        ];
        let prompt =
            PromptBuilder::new().build_edit(Path::new("a"), &lines(&["x"]), &selections, "go");

        assert!(prompt.user.contains("Selections:"));
        assert!(prompt.user.contains("- lines 2-4: make async"));
        assert!(prompt.user.contains("- lines 7-?: delete"));
    }

    #[test]
    fn edit_prompt_omits_empty_selection_section() {
        let prompt = PromptBuilder::new().build_edit(Path::new("a"), &lines(&["x"]), &[], "go");
        assert!(!prompt.user.contains("Selections:"));
    }

    #[test]
    fn instruction_comes_last() {
        let prompt = PromptBuilder::new().build_edit(
            Path::new("a"),
            &lines(&["x"]),
            &[],
            "  rename x to y  ",
        );
        assert!(prompt.user.ends_with("Instruction:\nrename x to y\n"));
    }

    #[test]
    fn inline_prompt_marks_the_cursor() {
        let prompt = PromptBuilder::new().build_inline("let x = ", ";\n");
        assert!(prompt.system.contains("snippets"));
        assert!(prompt.user.ends_with("let x = <CURSOR>;\n"));
    }
}
