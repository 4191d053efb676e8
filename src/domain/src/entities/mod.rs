pub mod command;
pub mod conversation;
pub mod structure;

pub use command::{
    ExecutionRecord, ExecutionReport, ExecutionStatus, GeneratedCommand, GenerationResult,
    Validation,
};
pub use conversation::{ConversationHistory, ConversationTurn, PromptMessage, Role};
pub use structure::MolecularStructure;
