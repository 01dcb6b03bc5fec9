//! Web server error types.

use std::io;

/// Errors raised while assembling or running the web server.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// The host page has no element with the configured placeholder id.
    #[error("mount point not found in host page: element id \"{id}\"")]
    MountPointMissing { id: String },

    /// The host page has no `<body>` element to replace.
    #[error("host page has no <body> element")]
    MissingBody,

    /// The host page could not be parsed or rewritten.
    #[error("failed to rewrite host page: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),

    /// The TCP listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the web crate.
pub type Result<T> = std::result::Result<T, WebError>;
