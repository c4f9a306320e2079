//! Terminal interface for bedrag
//!
//! Thin callers of the RAG pipeline and the Bedrock client: the banner, the
//! six-option interactive menu and the model-selection chat.

mod chat;
mod interactive;
mod ui;


pub use chat::{format_model_list, is_exit_command, parse_selection, select_model, ChatSession, ChatTurn};
pub use interactive::InteractiveSession;
pub use ui::{
    display_banner, format_documents, format_generation_stats, format_sources, read_input_with_history,
};

// Re-export core types
pub use bedrag_core::{Error, Result};
