#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![cfg_attr(feature = "document-features", doc = document_features::document_features!())]

extern crate alloc;

pub mod bits;
pub mod header;
pub mod seq;
pub mod status;

pub use {bytes, rlc_io as io};
