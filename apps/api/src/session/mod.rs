// Session context: per-user history and learned insights.
// Nothing here is global; every session lives in the SessionRegistry under its own id.

pub mod handlers;
pub mod history;
pub mod learning;
pub mod registry;
