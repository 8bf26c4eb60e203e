//! Shared utilities: host address parsing, binary resolution, interrupt handling.

pub mod address;
pub mod binary;
pub mod interrupt;

pub use address::{AddressError, HostAddress};
pub use binary::{resolve_binary_path, validate_binary, validate_binary_spec, BinaryError};
pub use interrupt::InterruptGuard;
