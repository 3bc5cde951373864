pub mod commands;

pub use commands::{handle_classify, handle_discover};
