//! Trie engine: lookup, insertion planning, deletion planning, and the two
//! ways of applying a planned edit.

pub mod edit;
pub mod get;
pub mod insert;
pub mod remove;
