pub mod config;
pub mod gmail;
pub mod google;
pub mod mantis;
pub mod memory;
pub mod sheets;
