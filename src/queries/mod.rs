//! Plain-SQL query layer over the SQLite pool
//!
//! Multi-statement writes go through one transaction; uniqueness
//! constraints arbitrate concurrent double-adds.

pub mod ingredients;
pub mod recipes;
pub mod relations;
pub mod shopping_list;
pub mod users;
