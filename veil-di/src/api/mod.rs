//! HTTP API handlers for veil-di
//!
//! JSON endpoints plus SSE streams consumed by the browser dashboard.

pub mod findings;
pub mod health;
pub mod masking;
pub mod qa;
pub mod sse;
pub mod upload;
pub mod workflow;

pub use findings::findings_routes;
pub use health::health_routes;
pub use masking::masking_routes;
pub use qa::qa_routes;
pub use sse::{event_stream, workflow_event_stream};
pub use upload::upload_routes;
pub use workflow::workflow_routes;
