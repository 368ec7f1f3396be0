// Analysis pipeline: fetch, keyword filter, classify — plus the result cache
// that lets repeated identical requests skip the fetch.

pub mod analysis;
pub mod cache;
