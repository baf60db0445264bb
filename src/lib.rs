//! # Frontdesk
//!
//! `frontdesk` is a small server-rendered web application: visitors can leave a
//! message through a contact form, register an account and log in with it.
//!
//! ## Components
//!
//! - [`db`]: the persistence gateway. A MySQL connection pool behind the
//!   [`db::Store`] trait, or an explicit [`db::Database::Unavailable`] state when
//!   the database could not be reached at startup. The process keeps serving in
//!   that state; data routes answer with a "database unavailable" notice.
//! - [`credentials`]: Argon2id password hashing and verification. Plaintext
//!   passwords are never stored or logged.
//! - [`api::session`]: an HMAC-signed cookie carrying the logged-in username and
//!   the flash messages queued for the next rendered page.
//! - [`api::handlers`]: one handler per route, validating the form at the
//!   boundary and answering with either a rendered page or a redirect.
//! - [`api::views`]: HTML templates.
//!
//! ## Error reporting
//!
//! User-visible failures are reported through flash messages with fixed text;
//! database errors and other internals are only ever logged.

pub mod api;
pub mod cli;
pub mod credentials;
pub mod db;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
