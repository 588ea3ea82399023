//! Backends consuming the optimized IR
//!
//! Both read the same instruction list and never mutate it:
//!
//! ```text
//!   optimized IR
//!        |
//!   +----+-----+
//!   |          |
//! Interpreter  Emitter
//!   |          |
//! output     Python source
//! ```

pub mod emitter;
pub mod interpreter;
