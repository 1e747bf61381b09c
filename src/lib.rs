//! A buffered-tree ordered key-value index.
//!
//! This crate provides [`BufTreeMap`], an in-memory ordered index that
//! amortizes the cost of maintaining a multi-level structure by *buffering*
//! writes: every update — an insertion ([`put`](BufTreeMap::put)) or a
//! tombstone ([`del`](BufTreeMap::del)) — is absorbed into the first
//! container along its search path and only migrated toward the leaves in
//! batches, once per-container and per-node thresholds are exceeded.
//!
//! # Example
//!
//! ```
//! use buf_tree::BufTreeMap;
//!
//! let mut index = BufTreeMap::new();
//! index.put("apple", 3);
//! index.put("banana", 5);
//!
//! assert_eq!(index.get("apple"), Some(&3));
//!
//! // Overwrites replace in place; the displaced value is dropped.
//! index.put("apple", 7);
//! assert_eq!(index.get("apple"), Some(&7));
//!
//! // Deletes insert a tombstone that shadows anything below it.
//! index.del("banana");
//! assert_eq!(index.get("banana"), None);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Write-optimized** - An update touches a single container; structural
//!   work (container splits, downward migration, node splits) is batched
//! - **Tombstone deletes** - A delete never searches below its insertion
//!   point, and tombstones are elided opportunistically once they dominate
//!
//! # Implementation
//!
//! The index is a tree of nodes, each holding an ordered array of
//! *containers*; a container owns a key-sorted singly-linked run of Put/Del
//! payloads and, optionally, a child subtree covering the key range up to
//! the next container's first key. All nodes, containers, and payloads live
//! in arenas and reference each other through compact non-owning handles.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod buf_tree_map;

pub use buf_tree_map::BufTreeMap;
