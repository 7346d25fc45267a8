pub mod invocation;

pub use invocation::{invocation_id_middleware, INVOCATION_ID_HEADER};
