//! Unified error type.

/// The error type returned by the relay's fallible startup operations.
///
/// Per-request failures (an unreachable upstream, an upstream 404) never show
/// up here. They are turned into HTTP [`Response`](crate::Response) values by
/// the relay handlers. This type surfaces the failures that stop the process
/// before it serves anything: binding the listener or setting up TLS for the
/// upstream client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("upstream tls: {0}")]
    Tls(#[from] rustls::Error),
}
