//! Method routing
//!
//! Maps intercepted screen-method invocations to controller handlers
//! through per-controller-type routing tables.

pub mod signature;
pub mod table;

pub use signature::SignatureMatcher;
pub use table::{
    table_for, MethodRoutingTable, RouteBuilder, RouteDescriptor, RouteHandler,
    RoutingTableBuilder,
};
