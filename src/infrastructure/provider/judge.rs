//! Equivalence judge prompt and verdict parsing shared by all providers

/// Instruction sent as the system prompt of every verification call
pub const JUDGE_SYSTEM_PROMPT: &str = "You are a semantic judge. Determine if the two user prompts \
have the exact same intent and meaning. Answer only with 'YES' or 'NO'.";

/// Maximum tokens requested from judges that require a limit
pub const JUDGE_MAX_TOKENS: u32 = 10;

pub fn judge_user_message(first: &str, second: &str) -> String {
    format!("Prompt 1: {}\nPrompt 2: {}", first, second)
}

/// Only an exact `YES` is affirmative; anything else, including `yes` or
/// `YES.`, is a negative verdict.
pub fn parse_verdict(answer: &str) -> bool {
    answer.trim() == "YES"
}
