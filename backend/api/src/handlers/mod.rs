pub mod classify;
pub mod discover;
pub mod health;
pub mod intents;
pub mod state;

pub use classify::classify_intent;
pub use discover::discover_emerging_intents;
pub use health::health_check;
pub use intents::{list_intents, root_handler};
pub use state::AppState;
