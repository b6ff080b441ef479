pub mod advice;
pub mod allocation;
pub mod contract;
pub mod health;
pub mod profile;
pub mod projection;
pub mod quote;
pub mod recommendation;
