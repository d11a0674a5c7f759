pub mod handlers;
mod router;

pub use router::{router, start_server, AppState, ServerSettings};
