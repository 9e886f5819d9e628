//! Chart of accounts hierarchy.

mod tree;

#[cfg(test)]
mod tests;

pub use tree::{AccountNode, ChartTree, Node, build_tree};
