pub mod handler;

pub use handler::{DriveKey, HeldKeys, InputHandler, KeyAction};
