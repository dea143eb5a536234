// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket transport: accepts client connections and turns each one
//! into a request reader task plus a response writer task, both feeding
//! and fed by the single-threaded reactor.

use amcore::EndpointToken;
use amwire::{ProtocolError, Request};
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::reactor::LoopMsg;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Runs the accept loop until the listener itself errors out (the process
/// is shutting down). Each accepted connection gets its own endpoint token
/// and a dedicated reader/writer task pair.
pub async fn run(listener: UnixListener, loop_tx: mpsc::UnboundedSender<LoopMsg>) {
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let endpoint = EndpointToken::new();
                let (reader, writer) = stream.into_split();
                let (response_tx, response_rx) = mpsc::unbounded_channel();

                if loop_tx.send(LoopMsg::Connected { endpoint, response_tx }).is_err() {
                    debug!("reactor channel closed, dropping new connection");
                    return;
                }

                tokio::spawn(run_writer(writer, response_rx));
                tokio::spawn(run_reader(reader, endpoint, loop_tx.clone()));
            }
            Err(e) => error!(error = %e, "accept failed"),
        }
    }
}

async fn run_reader(mut reader: tokio::net::unix::OwnedReadHalf, endpoint: EndpointToken, loop_tx: mpsc::UnboundedSender<LoopMsg>) {
    loop {
        match amwire::read_request(&mut reader).await {
            Ok(request) => {
                if matches!(request, Request::Hello { .. }) {
                    debug!(?endpoint, "hello handshake");
                } else {
                    debug!(?endpoint, ?request, "received request");
                }
                if loop_tx.send(LoopMsg::Request { endpoint, request }).is_err() {
                    return;
                }
            }
            Err(ProtocolError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!(?endpoint, "client disconnected");
                let _ = loop_tx.send(LoopMsg::Disconnected { endpoint });
                return;
            }
            Err(e) => {
                error!(?endpoint, error = %e, "connection error");
                let _ = loop_tx.send(LoopMsg::Disconnected { endpoint });
                return;
            }
        }
    }
}

async fn run_writer(mut writer: tokio::net::unix::OwnedWriteHalf, mut response_rx: mpsc::UnboundedReceiver<amwire::Response>) {
    while let Some(response) = response_rx.recv().await {
        if let Err(e) = amwire::write_response(&mut writer, &response).await {
            error!(error = %e, "failed to write response");
            return;
        }
    }
}
