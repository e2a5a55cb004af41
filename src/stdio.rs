//! Newline-delimited stdio transport.
//!
//! [`Server::serve`] reads one frame at a time, dispatches it, and writes the
//! reply before reading the next frame, so at most one request is ever in
//! flight. Only replies are written to the output stream; diagnostics go to
//! stderr through logwise.
//!
//! ```
//! use weather_server::registry::ServerInfo;
//! use weather_server::stdio::Server;
//! use weather_server::weather::{self, WeatherConfig};
//!
//! let registry = weather::registry(ServerInfo::default(), &WeatherConfig::default()).unwrap();
//! let input = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n";
//! let mut output = Vec::new();
//! Server::new(&registry).serve(&input[..], &mut output).unwrap();
//! assert_eq!(output, b"{\"jsonrpc\":\"2.0\",\"result\":{},\"id\":1}\n");
//! ```

use crate::jrpc::{Error as RpcError, Response};
use crate::mcp;
use crate::messages::{self, Message};
use crate::registry::Registry;
use logwise::privacy::LogIt;
use serde::Serialize;
use std::io::{BufRead, Write};

/// Errors that end the transport loop.
///
/// A malformed frame is not one of them: it is logged and skipped. Neither
/// is a reply that fails to encode.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input stream failed for a reason other than end of file.
    #[error("failed to read from input: {0}")]
    Read(#[source] std::io::Error),
    /// The output stream rejected a reply or a flush.
    #[error("failed to write to output: {0}")]
    Write(#[source] std::io::Error),
}

/// Serves one client over a pair of byte streams.
pub struct Server<'r> {
    registry: &'r Registry,
}

impl<'r> Server<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Server { registry }
    }

    /// Serves the process's stdin and stdout until stdin closes.
    pub fn run(&self) -> Result<(), Error> {
        let stdin = std::io::stdin().lock();
        let stdout = std::io::stdout().lock();
        self.serve(stdin, stdout)
    }

    /// Serves `input` and `output` until `input` reaches end of file.
    ///
    /// Returns `Ok(())` on end of file. Read and write failures are returned
    /// as errors; the caller decides whether they are fatal.
    pub fn serve<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<(), Error> {
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            let read = input.read_until(b'\n', &mut buffer).map_err(Error::Read)?;
            if read == 0 {
                logwise::info_sync!("input closed, shutting down");
                return Ok(());
            }
            if buffer.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            if let Some(reply) = self.process_frame(&buffer) {
                output.write_all(&reply).map_err(Error::Write)?;
                output.flush().map_err(Error::Write)?;
            }
        }
    }

    /// Decodes, dispatches and encodes a single frame.
    ///
    /// Returns `None` when there is nothing to send back: the frame was
    /// malformed, or it was a notification.
    pub fn process_frame(&self, frame: &[u8]) -> Option<Vec<u8>> {
        match messages::decode(frame) {
            Err(e) => {
                logwise::warn_sync!("dropping malformed frame: {error}", error = LogIt(&e));
                None
            }
            Ok(Message::Notification(notification)) => {
                mcp::notify(&notification);
                None
            }
            Ok(Message::Request(request)) => {
                logwise::info_sync!(
                    "request {id} {method}",
                    id = LogIt(&request.id),
                    method = LogIt(&request.method)
                );
                let response = mcp::dispatch(self.registry, request);
                encode_reply(&response)
            }
        }
    }
}

/// Encodes `response`, replacing it with an internal error for the same id
/// if it cannot be encoded.
fn encode_reply<R: Serialize>(response: &Response<R>) -> Option<Vec<u8>> {
    let e = match messages::encode(response) {
        Ok(bytes) => return Some(bytes),
        Err(e) => e,
    };
    logwise::error_sync!(
        "reply to {id} could not be encoded: {error}",
        id = LogIt(&response.id),
        error = LogIt(&e)
    );
    let fallback: Response<()> = Response::err(RpcError::from_error(e), response.id.clone());
    match messages::encode(&fallback) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            logwise::error_sync!("dropping reply: {error}", error = LogIt(&e));
            None
        }
    }
}
