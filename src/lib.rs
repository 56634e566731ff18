//! An order-statistic 2-3 search tree, and a price-indexed stock ledger
//! built on top of it.
//!
//! This crate provides [`TwoThreeTree`], a perfectly balanced search tree in
//! which every internal node has two or three children and every leaf sits at
//! the same depth. Each leaf holds one key-value pair and participates in a
//! doubly linked chain bounded by two permanent sentinel leaves, so ordered
//! enumeration is O(1) per step after an O(log n) positioning search. Every
//! internal node caches the maximum key and the leaf count of its subtree,
//! which makes [`rank`](TwoThreeTree::rank) queries O(log n).
//!
//! # Example
//!
//! ```
//! use terntree::TwoThreeTree;
//!
//! let mut tree = TwoThreeTree::new();
//! tree.insert(5, "five");
//! tree.insert(1, "one");
//! tree.insert(9, "nine");
//! tree.insert(3, "three");
//!
//! // Exact search, O(log n).
//! assert_eq!(tree.get(&3), Some(&"three"));
//!
//! // Ordered enumeration over the leaf chain.
//! let keys: Vec<i32> = tree.iter().map(|(&k, _)| k).collect();
//! assert_eq!(keys, [1, 3, 5, 9]);
//!
//! // Rank differences count keys between two leaves.
//! let lo = tree.search(&1).unwrap();
//! let hi = tree.search(&9).unwrap();
//! assert_eq!(tree.rank(hi).0 - tree.rank(lo).0, 3);
//! ```
//!
//! # Key bounds
//!
//! The sentinel leaves need a key strictly below and a key strictly above
//! every real key, so tree keys implement [`BoundedOrd`]. Implementations are
//! provided for the integer primitives, [`String`], and the [`OrderedF32`] /
//! [`OrderedF64`] total-order float newtypes.
//!
//! # The ledger
//!
//! The [`ledger`] module is a worked application of the tree: a [`Ledger`]
//! tracks listed securities in two tree instances at once, keyed by ticker
//! and by a composite [`PriceKey`], and answers price-range queries with two
//! rank lookups and a successor walk, never mutating the tree mid-query.

#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

mod bounded;
mod rank;
mod raw;

pub mod ledger;
pub mod two_three_tree;

pub use bounded::{BoundedOrd, OrderedF32, OrderedF64};
pub use ledger::{Ledger, LedgerError, PriceKey};
pub use rank::Rank;
pub use two_three_tree::{LeafRef, TwoThreeTree};
