use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while talking to an external reference resolver.
#[derive(Debug, Error)]
pub enum ExternalResolverError {
    #[error("no resolver executable exists at {path:?}")]
    MissingResolver { path: PathBuf },
    #[error("the file at {path:?} is not an executable resolver")]
    ResolverNotExecutable { path: PathBuf },
    #[error("failed to spawn resolver (path={path:?}): {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("expected a bundle identifier as the resolver's first output, got a {reply} reply")]
    InvalidBundleIdentifierHandshake { reply: String },
    #[error("the resolver process has exited (exit code {exit_code:?})")]
    ProcessDidExit { exit_code: Option<i32> },
    #[error("the resolver sent its bundle identifier again after the handshake")]
    SentBundleIdentifierAgain,
    #[error("{0}")]
    ForwardedErrorMessage(String),
    #[error("the resolver replied with an unknown response kind: {raw}")]
    InvalidResponseKind { raw: String },
    #[error("unable to decode resolver response `{raw}`: {source}")]
    UnableToDecodeResponse {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to encode request ({description}): {source}")]
    UnableToEncodeRequest {
        description: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("received a request of unknown type: {raw}")]
    UnknownRequest { raw: String },
    #[error("the resolver answered {request} with an unexpected {response} reply")]
    UnexpectedResponse {
        response: &'static str,
        request: String,
    },
    #[error("failed writing to the resolver's stdin: {0}")]
    StdinWrite(#[source] std::io::Error),
    #[error("failed reading from the resolver's stdout: {0}")]
    StdoutRead(#[source] std::io::Error),
    #[error("internal error: resolver stdin pipe unavailable")]
    MissingStdin,
    #[error("internal error: resolver stdout pipe unavailable")]
    MissingStdout,
    #[error("internal error: resolver stderr pipe unavailable")]
    MissingStderr,
    #[error("a service transport performs no handshake and requires a request")]
    MissingRequestForService,
    #[error("documentation service request failed: {0}")]
    ServiceClient(String),
}
