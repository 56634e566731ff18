mod arena;
mod handle;
mod node;
mod raw_two_three_tree;

pub(crate) use handle::Handle;
pub(crate) use raw_two_three_tree::RawTwoThreeTree;
