pub mod allocation;
pub mod health;
pub mod projection;
pub mod scoring;
