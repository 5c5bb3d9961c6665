// Social post generation (ranked model fallback) and publishing.

pub mod handlers;
pub mod service;
