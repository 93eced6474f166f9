// Shared prompt fragments. Operation-specific prompts live in
// analysis/prompts.rs alongside the code that sends them.

/// Instruction that pins the language of every free-text field.
pub fn output_language_instruction(language: &str) -> String {
    format!(
        "CRITICAL: Write every free-text value of your answer in {language}, \
        regardless of the language of the résumé or the job description. \
        Enumerated values (such as HIRE, MAYBE, REJECT) stay exactly as specified."
    )
}

/// Fragment that forbids the model from guessing beyond the document.
pub const EVIDENCE_INSTRUCTION: &str = "\
    Base every statement on evidence present in the candidate document. \
    Do NOT invent employers, dates, degrees, or skills. \
    If the document does not mention something, treat it as missing.";
