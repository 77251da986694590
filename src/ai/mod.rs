// AI module for Claude API integration
//
// This module provides:
// - Claude API client with streaming support
// - Narration context built from an assembled playlist
// - System prompt for the playlist narrator

pub mod claude_client;
pub mod narration;
pub mod system_prompt;

// Re-export commonly used types
pub use claude_client::{ClaudeClient, Message};
pub use narration::{fallback_narration, NarrationContext};
pub use system_prompt::SYSTEM_PROMPT;
