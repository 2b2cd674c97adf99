// Resume ingestion: extract text from an upload, structure it with the language
// model (or heuristics), and hand the result back to the upload handler.
// Nothing here persists resumes.

pub mod extractor;
pub mod fallback;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod structuring;
