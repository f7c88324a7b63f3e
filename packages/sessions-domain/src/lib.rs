//! Session and element model plus the pure transformations between the flat store shape and the
//! reconstructed execution tree.

pub mod aggregate;
pub mod batch;
pub mod element;
pub mod flatten;
pub mod import_check;
pub mod timestamp;
pub mod tree;

pub use element::{Element, ElementRecord, ExceptionInfo, ExecutionStatus, Session};
pub use tree::{Forest, TreeIssue};
