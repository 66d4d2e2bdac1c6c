//! Code generation module

pub mod backend;
mod batch;
pub mod client;
mod code_generator;
mod emitter;
mod model;
mod naming;
mod sql;
mod type_resolver;
mod writer;

pub use batch::*;
pub use code_generator::*;
pub use emitter::*;
pub use model::*;
pub use naming::*;
pub use sql::*;
pub use type_resolver::*;
pub use writer::*;
