//! Stanza Core Types
//!
//! This crate provides the document model shared by the Stanza parser, the
//! YAML serializer and the `.poem` writer. It includes:
//!
//! - **Document**: The parsed poem record ([`document::Document`]) with its
//!   versions, segments, audio links, postscript notes and analysis
//! - **Slugs**: URL slug derivation from poem titles ([`slug::slugify`])
//!
//! Every type in [`document`] implements `serde::Serialize` and
//! `serde::Deserialize`, so a document survives a YAML round trip unchanged.

pub mod document;
pub mod slug;
