pub mod controller;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod persistence;
pub mod router;
pub mod widget;

pub use controller::*;
pub use persistence::*;
pub use router::*;
pub use widget::*;

/// Container the server renders the config table into
pub use shared_types::CONFIG_TABLE_ID;
