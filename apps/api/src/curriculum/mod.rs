// Curriculum generation: request resolution, prompts, backends,
// output repair/defaulting and the HTTP handlers that expose them.
// All hosted-provider calls go through llm_client.

pub mod defaults;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod repair;
pub mod schema;
