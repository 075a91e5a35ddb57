// Prompt constants for question bank generation.
// Reuses cross-cutting fragments from llm_client::prompts.

pub const QUESTION_PERSONA: &str =
    "You are an experienced hiring manager preparing questions for a job interview.";

/// Question generation prompt template.
/// Replace: {role}, {level}, {focus}, {techstack}, {amount}, {voice_rules}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Prepare questions for a job interview.
The job role is {role}.
The job experience level is {level}.
The tech stack used in the job is: {techstack}.
The focus between behavioural and technical questions should lean towards: {focus}.
The amount of questions required is: {amount}.

{voice_rules}

Return a JSON array of strings and nothing else, formatted like this:
["Question 1", "Question 2", "Question 3"]"#;
