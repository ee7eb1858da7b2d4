use std::path::PathBuf;

use thiserror::Error;

/// Errors callers need to tell apart.
///
/// Parse failures are deliberately absent: a malformed client-list
/// body degrades to an empty record list inside [`crate::parser`] and
/// never surfaces as an error. Notification failures are logged by the
/// monitor and likewise never propagate.
#[derive(Debug, Error)]
pub enum Error {
    /// The router answered but rejected the supplied credentials.
    /// Fatal at startup; the monitor must not run blind.
    #[error("router rejected the supplied credentials")]
    LoginRejected,

    #[error("no config file found at {path}")]
    ConfigMissing { path: PathBuf },

    #[error("failed to read config file {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
