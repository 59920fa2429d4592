pub mod protocol;
pub mod server;
pub mod state;
pub mod tools;

pub use state::AppState;
