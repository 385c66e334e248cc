//! Tone prompt templates.

use twintone_core::Tone;

const CASUAL_TEMPLATE: &str = "\
You are a friendly, knowledgeable buddy explaining complex topics in a simple, fun way.
Explain {query} like you're chatting with a curious friend over coffee.
Use analogies, keep it light, and avoid jargon. Aim for 100-150 words.";

const CASUAL_REFINE_TEMPLATE: &str = "\
Take this response: \"{initial_response}\" and make it more concise, lively, and engaging.
Keep the casual, friendly tone, use an analogy if possible, and aim for 80-120 words.
Avoid overly technical terms.";

const FORMAL_TEMPLATE: &str = "\
You are an academic expert writing for a scholarly audience.
Provide a clear, precise, and structured explanation of {query}.
Use formal language, include key technical details, and organize the response with an introduction, explanation, and conclusion.
Aim for 150-200 words.";

const FORMAL_REFINE_TEMPLATE: &str = "\
Take this response: \"{initial_response}\" and summarize it to 100-150 words while maintaining a formal, academic tone.
Ensure clarity, precision, and logical structure, retaining key technical details.";

/// First-pass prompt asking for an answer to `query` in `tone`.
pub fn initial_prompt(tone: Tone, query: &str) -> String {
    let template = match tone {
        Tone::Casual => CASUAL_TEMPLATE,
        Tone::Formal => FORMAL_TEMPLATE,
    };
    template.replace("{query}", query.trim())
}

/// Second-pass prompt that tightens `initial_response` while keeping `tone`.
pub fn refine_prompt(tone: Tone, initial_response: &str) -> String {
    let template = match tone {
        Tone::Casual => CASUAL_REFINE_TEMPLATE,
        Tone::Formal => FORMAL_REFINE_TEMPLATE,
    };
    template.replace("{initial_response}", initial_response.trim())
}
