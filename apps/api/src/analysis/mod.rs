// Profile and résumé analysis: scrape or PDF in, schema-complete scoring out.
// All model calls go through the resilience Orchestrator.

pub mod handlers;
pub mod service;
