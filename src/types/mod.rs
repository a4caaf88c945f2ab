// Topicmarks shared type definitions
// Each submodule defines types used across the engine.

pub mod bookmark;
pub mod errors;
pub mod import;
pub mod settings;
pub mod topic;
