// Shared system prompts for every backend.
// Task prompts live next to the code that builds them (see tailoring::prompts).

/// System prompt attached to every relevance call.
pub const RESUME_EXPERT_SYSTEM: &str = "You are a concise assistant who is an expert in resumes.";
