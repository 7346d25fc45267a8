pub mod credentials;
pub mod diagnostics;
pub mod item;
pub mod key_material;
pub mod vault;
pub mod vm;

pub use credentials::{DbCredentials, VmCredentials};
