//! Application-level configuration.
//!
//! - [`ReactParams`] — ReAct loop control (turn budget, tool timeout, result size)

pub mod react_params;

pub use react_params::ReactParams;
