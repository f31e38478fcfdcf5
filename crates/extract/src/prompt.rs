use crate::normalizer::SENTINEL;

/// System instruction sent with every tier query.
pub fn extraction_system_instruction() -> String {
    format!(
        "You are a document analyzer that ONLY provides exact quotes from documents with precise citations. \
CRITICAL INSTRUCTION: If no relevant quotes are found, your ENTIRE response must be ONLY the characters '{sentinel}' \
- no explanations, no reasoning, no other text whatsoever. NEVER explain why you're providing {sentinel}.",
        sentinel = SENTINEL
    )
}

pub fn build_extraction_prompt(topic: &str, document_content: &str) -> String {
    format!(
        r#"You are a document analyzer that ONLY provides exact quotes from documents with precise citations.

RULES:
- ONLY return direct quotes from the document. DO NOT explain, summarize, interpret, or provide reasoning.
- Do not say "Based on my review", "There was nothing", "The document does not contain", etc.
- If NO quotes are found for this topic, respond ONLY with:
{sentinel}
(Just the letters {sentinel} and nothing else.)

EXTRACTION INSTRUCTIONS:
- Provide ONLY exact quotes from the document that are directly related to the topic below.
- Include quotes that are relevant even if they use different wording.
- After each quote, include the page number in this format: (Page X)
- If no quotes are found, respond ONLY with "{sentinel}".

TOPIC:
{topic}

DOCUMENT CONTENT:
{document_content}"#,
        sentinel = SENTINEL,
        topic = topic,
        document_content = document_content,
    )
}

pub const RESET_SYSTEM_INSTRUCTION: &str = "You are starting a new document analysis session. \
Any information from previous sessions is irrelevant.";

pub const RESET_PROMPT: &str = "This is a new document analysis session.
Any information from previous documents or analyses should be disregarded.
Respond with only 'Session reset confirmed' to acknowledge.";
