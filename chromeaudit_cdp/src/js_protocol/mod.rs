pub mod debugger;
pub mod runtime;
