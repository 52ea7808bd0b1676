//! Classify collaborator errors (io, sqlx, curl) into retry policy error kinds.

use std::io;

use super::error::RemoteError;
use super::policy::ErrorKind;

/// Classify an io error for retry decisions.
pub fn classify_io_error(e: &io::Error) -> ErrorKind {
    match e.kind() {
        io::ErrorKind::TimedOut => ErrorKind::Timeout,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrNotAvailable => ErrorKind::UnreachableHost,
        _ => ErrorKind::Other,
    }
}

/// Classify a database error. Pool exhaustion counts as a timeout.
pub fn classify_sqlx_error(e: &sqlx::Error) -> ErrorKind {
    match e {
        sqlx::Error::PoolTimedOut => ErrorKind::Timeout,
        sqlx::Error::Io(io) => classify_io_error(io),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() || e.is_couldnt_connect() {
        return ErrorKind::UnreachableHost;
    }
    ErrorKind::Other
}

/// Classify a remote error into an [`ErrorKind`].
///
/// `RemoteError::Cancelled` is handled by the retry loop before classification
/// and maps to `Other` here.
pub fn classify(e: &RemoteError) -> ErrorKind {
    match e {
        RemoteError::Timeout => ErrorKind::Timeout,
        RemoteError::UnreachableHost(_) => ErrorKind::UnreachableHost,
        RemoteError::UserCancelled(_) => ErrorKind::UserCancelled,
        RemoteError::Io(io) => classify_io_error(io),
        RemoteError::Database(db) => classify_sqlx_error(db),
        RemoteError::Http(ce) => classify_curl_error(ce),
        RemoteError::Cancelled
        | RemoteError::NotFound { .. }
        | RemoteError::PermissionDenied(_)
        | RemoteError::Decode(_)
        | RemoteError::Other(_) => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // libcurl error codes (CURLcode is unsigned on unix)
    const CURLE_COULDNT_RESOLVE_HOST: u32 = 6;
    const CURLE_COULDNT_CONNECT: u32 = 7;
    const CURLE_OPERATION_TIMEDOUT: u32 = 28;
    const CURLE_SSL_CONNECT_ERROR: u32 = 35;

    #[test]
    fn curl_timeout_and_dns() {
        assert_eq!(
            classify_curl_error(&curl::Error::new(CURLE_OPERATION_TIMEDOUT)),
            ErrorKind::Timeout
        );
        assert_eq!(
            classify_curl_error(&curl::Error::new(CURLE_COULDNT_RESOLVE_HOST)),
            ErrorKind::UnreachableHost
        );
        assert_eq!(
            classify_curl_error(&curl::Error::new(CURLE_COULDNT_CONNECT)),
            ErrorKind::UnreachableHost
        );
        assert_eq!(
            classify_curl_error(&curl::Error::new(CURLE_SSL_CONNECT_ERROR)),
            ErrorKind::Other
        );
    }

    #[test]
    fn io_kinds() {
        let timed_out = io::Error::new(io::ErrorKind::TimedOut, "slow");
        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(classify_io_error(&timed_out), ErrorKind::Timeout);
        assert_eq!(classify_io_error(&refused), ErrorKind::UnreachableHost);
        assert_eq!(classify_io_error(&denied), ErrorKind::Other);
    }

    #[test]
    fn sqlx_pool_timeout() {
        assert_eq!(classify_sqlx_error(&sqlx::Error::PoolTimedOut), ErrorKind::Timeout);
        assert_eq!(classify_sqlx_error(&sqlx::Error::RowNotFound), ErrorKind::Other);
    }

    #[test]
    fn remote_errors() {
        assert_eq!(classify(&RemoteError::Timeout), ErrorKind::Timeout);
        assert_eq!(
            classify(&RemoteError::UnreachableHost("db.example".into())),
            ErrorKind::UnreachableHost
        );
        assert_eq!(
            classify(&RemoteError::UserCancelled("picker closed".into())),
            ErrorKind::UserCancelled
        );
        assert_eq!(
            classify(&RemoteError::PermissionDenied("rules".into())),
            ErrorKind::Other
        );
        let wrapped = RemoteError::from(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert_eq!(classify(&wrapped), ErrorKind::Timeout);
    }
}
