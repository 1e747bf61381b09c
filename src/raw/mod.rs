mod arena;
mod container;
mod handle;
mod node;
mod payload;
mod raw_buf_tree;

pub(crate) use raw_buf_tree::RawBufTree;
