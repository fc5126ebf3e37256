//! Core types and trait definitions for the Folio view indexer.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the access-grant model, the normalizer that collapses grants into an
//! [`access::AccessDescriptor`], and the assembler that turns a view into an
//! [`document::IndexDocument`].

pub mod access;
pub mod document;
pub mod error;
pub mod mapping;
pub mod pipeline;
pub mod store;
pub mod view;

pub use error::{Error, Result};
