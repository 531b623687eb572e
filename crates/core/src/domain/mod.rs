pub mod export;
pub mod mail;
pub mod outgoing_mail;
pub mod routine_outcome;
pub mod sheets;
pub mod table;

// Re-export commonly used types
pub use routine_outcome::*;
pub use table::*;
