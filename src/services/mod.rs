// Topicmarks services
// Stateless or file-backed services around the store: format parsers, the exporter and settings.

pub mod exporter;
pub mod parsers;
pub mod settings_engine;
