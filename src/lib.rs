//! Relgraph - traversal pushdown compiler for relational graph storage
//!
//! This crate provides the query-compilation core of a property-graph adapter
//! that maps graph traversals onto a relational backend:
//! - Strategy-driven folding of traversal prefixes into a replaced-step tree
//! - Predicate classification for SQL-eligible filter shapes
//! - SQL construction against a topology catalog, with alias bookkeeping
//! - Path-preserving result emission from flat rows

pub mod config;
pub mod emit;
pub mod plan;
pub mod predicate;
pub mod sql;
pub mod strategy;
pub mod topology;
pub mod traversal;
pub mod types;
