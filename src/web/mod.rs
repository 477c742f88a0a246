//! HTTP query API.
//!
//! Serves overlap queries from a read snapshot of a store:
//!
//! ```text
//! GET /api/query?chrom=chr1&start=6500&end=9000&limit=25   regions + accessions
//! GET /api/files?chrom=chr1&start=6500&end=9000            distinct accessions
//! GET /api/registry                                        registry summary
//! ```
//!
//! Requests are rate limited per IP, time out after 30 seconds, and `limit` is
//! clamped to [`server::MAX_QUERY_LIMIT`].

pub mod server;
