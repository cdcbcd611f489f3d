//! Fixed instruction prompts sent with every model request

/// System instruction for answer requests
///
/// Constrains the model to the attached document and to the four-field
/// answer schema enforced by the request's response schema.
pub const ANSWER_SYSTEM_PROMPT: &str = "You are an expert tutor. \
The user has provided a textbook chapter as an attached document. \
Answer the student's question based STRICTLY on the provided document content. \
Format the response exactly according to the schema: \
1. A 1-line summary. \
2. A 2-line explanation. \
3. A 5-line detailed answer. \
4. A description of a diagram that helps explain the answer.";

/// Build the diagram-generation prompt for an answer's diagram description
pub fn diagram_prompt(description: &str) -> String {
    format!(
        "Create a simple, educational diagram line drawing explaining: {}. White background.",
        description
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_prompt_includes_description() {
        let prompt = diagram_prompt("the water cycle");
        assert!(prompt.contains("the water cycle"));
        assert!(prompt.contains("White background"));
    }
}
