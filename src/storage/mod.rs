//! File collaborators: series documents in and out, CSV exports.

pub mod csv;
pub mod json;
