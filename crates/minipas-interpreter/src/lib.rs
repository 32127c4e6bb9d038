//! minipas interpreter: runs an analyzed program by walking its AST.
//!
//! Every program, procedure and function invocation gets its own [`Frame`].
//! A frame's static link points at the frame of the lexically enclosing
//! scope, so name lookup follows declarations rather than the call chain.
//! Output and input go through a [`Console`].

pub mod console;
pub mod frame;
pub mod interpreter;
pub mod value;

pub use console::{BufferConsole, Console, StdConsole};
pub use frame::{ArrayStorage, Frame};
pub use interpreter::{ExecStats, Interpreter, MAX_CALL_DEPTH, RUN_STACK_SIZE};
pub use value::Value;
