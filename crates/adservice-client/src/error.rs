use tonic::{Code, Status};

/// Errors surfaced to callers of the client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid ad service address {address}")]
    ConnectionSetup {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("failed to start transport runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// A failure that is neither a setup problem nor an RPC status
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Failure of a single dispatched call
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// The server (or the channel) answered with a non-OK gRPC status
    #[error("rpc failed: {}", describe_status(.0))]
    Status(#[from] Status),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Canonical upper-case name of a gRPC status code
pub fn status_code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "CANCELLED",
        Code::Unknown => "UNKNOWN",
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        Code::FailedPrecondition => "FAILED_PRECONDITION",
        Code::Aborted => "ABORTED",
        Code::OutOfRange => "OUT_OF_RANGE",
        Code::Unimplemented => "UNIMPLEMENTED",
        Code::Internal => "INTERNAL",
        Code::Unavailable => "UNAVAILABLE",
        Code::DataLoss => "DATA_LOSS",
        Code::Unauthenticated => "UNAUTHENTICATED",
    }
}

/// `CODE` or `CODE: message`
pub fn describe_status(status: &Status) -> String {
    let code = status_code_name(status.code());
    if status.message().is_empty() {
        code.to_string()
    } else {
        format!("{code}: {}", status.message())
    }
}
