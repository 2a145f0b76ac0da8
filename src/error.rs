//! Infrastructure error type.

use std::net::AddrParseError;

use thiserror::Error;

/// The error type returned by apollo's fallible operations.
///
/// Handler failures are not `Error`s: they are [`BoxError`](crate::BoxError)
/// values travelling through the chain. This type surfaces infrastructure
/// failures: parsing the bind address, binding a port, accepting a
/// connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
