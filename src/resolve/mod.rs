pub mod enforcer;
pub mod runtime;

pub use enforcer::{detect_enforcer, resolve_enforcer, Enforcer};
pub use runtime::resolve_runtime;
