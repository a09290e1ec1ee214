//! Link-to-text ingestion: resolve a Drive reference, download it into a private
//! working area, unpack archives and extract document text.

pub mod archive;
pub mod extract;
pub mod fetch;
pub mod format;
pub mod handlers;
pub mod link;
pub mod pipeline;
pub mod workspace;
