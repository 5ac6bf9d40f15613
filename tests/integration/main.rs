//! Integration tests: full pipeline runs against in-memory collaborators.

mod mock_store;
mod pipeline_flow;
