// Prompt text for relevance scoring.
// The system prompt lives in llm_client::prompts; backends attach it themselves.

/// Builds the per-item relevance prompt. The reply must be a bare number in [0, 1].
pub fn relevance_prompt(job_description: &str, resume_item: &str) -> String {
    format!(
        "You are an expert career advisor. Given the following job description and resume item, \
rate how relevant the resume item is to the job description on a scale from 0 to 1, \
where 1 means highly relevant and 0 means not relevant at all.

Job Description:
{job_description}

Resume Item:
{resume_item}

Please provide only the numeric score between 0 and 1."
    )
}
