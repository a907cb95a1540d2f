pub mod memory;

pub use memory::{SecureBytes, SecureString};
