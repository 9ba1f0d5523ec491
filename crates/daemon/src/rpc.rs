//! The Unix-socket RPC server: accepts connections, reads one
//! length-prefixed [`fleet_wire::Request`] per round trip, and writes back
//! the matching [`fleet_wire::Response`].

use crate::lifecycle::DaemonState;
use fleet_core::Ctx;
use fleet_wire::{ContainerSummary, ProtocolError, Request, Response};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tracing::{error, warn};

pub async fn serve(listener: UnixListener, daemon: Arc<DaemonState>, shutdown: Ctx) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("rpc server shutting down");
                return;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let daemon = Arc::clone(&daemon);
                        tokio::spawn(async move {
                            let (mut reader, mut writer) = stream.into_split();
                            if let Err(err) = handle_connection(&mut reader, &mut writer, &daemon).await {
                                warn!(%err, "rpc connection ended with an error");
                            }
                        });
                    }
                    Err(err) => error!(%err, "accept failed"),
                }
            }
        }
    }
}

async fn handle_connection<R, W>(reader: &mut R, writer: &mut W, daemon: &DaemonState) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let request = match fleet_wire::read_request(reader).await {
            Ok(request) => request,
            Err(ProtocolError::Io(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(err) => return Err(err),
        };
        let response = handle_request(request, daemon).await;
        fleet_wire::write_response(writer, &response).await?;
    }
}

async fn handle_request(request: Request, daemon: &DaemonState) -> Response {
    let ctx = Ctx::root();
    match request {
        Request::CreateContainer { kind, player_id } => match daemon.runtime.create(kind, player_id).await {
            Ok(id) => Response::ContainerCreated { id },
            Err(err) => Response::Error { message: err.to_string() },
        },

        Request::StartContainer { id, await_completion } => {
            if !await_completion {
                return match daemon.runtime.start(id, None).await {
                    Ok(()) => Response::Ok,
                    Err(err) => Response::Error { message: err.to_string() },
                };
            }
            let (tx, mut rx) = tokio::sync::mpsc::channel(1);
            match daemon.runtime.start(id, Some(tx)).await {
                Ok(()) => {
                    let _ = rx.recv().await;
                    Response::Ok
                }
                Err(err) => Response::Error { message: err.to_string() },
            }
        }

        Request::StopContainer { id } => match daemon.runtime.stop(id).await {
            Ok(()) => Response::Ok,
            Err(err) => Response::Error { message: err.to_string() },
        },

        Request::RestartContainer { id } => match daemon.runtime.restart(id).await {
            Ok(()) => Response::Ok,
            Err(err) => Response::Error { message: err.to_string() },
        },

        Request::GetContainer { id } => match daemon.runtime.get(id).await {
            Ok(container) => Response::Container { container: container.as_ref().map(ContainerSummary::from) },
            Err(err) => Response::Error { message: err.to_string() },
        },

        Request::ListContainers { player_id } => match daemon.runtime.list(&player_id).await {
            Ok(containers) => Response::Containers { containers: containers.iter().map(ContainerSummary::from).collect() },
            Err(err) => Response::Error { message: err.to_string() },
        },

        Request::Send { request_type, payload: _, player_id } => {
            // No domain request types are registered on the mediator in this
            // supervisor: every dispatchable command/query here is one of the
            // container-CRUD variants above. A future domain crate registers
            // handlers on `daemon.mediator` and extends this match.
            let _ = player_id;
            let _ = ctx;
            Response::Error { message: format!("no handler registered for request type {request_type:?}") }
        }

        Request::Status => Response::Status { daemon: status(daemon).await },
    }
}

async fn status(daemon: &DaemonState) -> fleet_wire::DaemonStatus {
    let containers_active = match daemon.runtime.list(&daemon.config.player).await {
        Ok(containers) => containers.iter().filter(|c| c.status() == fleet_core::ContainerStatus::Running).count(),
        Err(err) => {
            warn!(%err, "status query failed to list containers");
            0
        }
    };
    fleet_wire::DaemonStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: daemon.start_time.elapsed().as_secs(),
        containers_active,
    }
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
