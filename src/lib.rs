//! # Axis
//!
//! `axis` is the web front of the Axis service. It handles account signup and
//! login, keeps the current user in a signed session cookie, records feedback
//! submissions, and serves a few informational pages.
//!
//! ## Storage
//!
//! State lives in two flat files under the data directory:
//!
//! - **`users.json`:** a single JSON object keyed by lower-cased email. The
//!   whole mapping is read and rewritten on every signup, behind an
//!   in-process lock.
//! - **`feedback.json`:** newline-delimited JSON, append only.
//!
//! ## Sessions
//!
//! Sessions are client-held. The cookie carries the user's email, role and
//! expiry, signed with `HMAC-SHA256` under the `AXIS_SECRET` key. The server
//! keeps no session table, so a session stays valid until it expires or the
//! user logs out.

pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
