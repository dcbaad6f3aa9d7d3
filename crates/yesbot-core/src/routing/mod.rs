//! Key paths and the routing tree.
//!
//! A [`KeyPath`] addresses a position in a [`RoutingTree`]. Handlers are
//! inserted under the path derived from their options; events are looked up
//! under the path produced by their key extractor. The empty string
//! ([`WILDCARD`]) marks "no segment" on both sides.

mod key_path;
mod tree;

pub use key_path::{KeyPath, WILDCARD};
pub use tree::RoutingTree;
