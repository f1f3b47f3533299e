//! Live capture on the configured TAK and OMNI ports.
//!
//! Every routed port gets a TCP listener and a UDP socket (each can be
//! switched off in `listen`). TCP connections are reassembled with
//! [`TakFrameCodec`] and each frame is dissected as stream data; every UDP
//! datagram is dissected on its own. Outcomes are sent to a channel as
//! [`Report`]s so the caller decides how to print them.

use anyhow::Result;
use futures::StreamExt;
use std::net::SocketAddr;
use std::time::Duration;
use takshark_core::{AppConfig, ListenError, PortRole};
use takshark_dissect::{Dissection, Dissector, Format, TakFrameCodec, Transport};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

use crate::render::{render, OutputFormat};

/// Largest UDP payload
const MAX_DATAGRAM_LEN: usize = 65_535;

/// Pause after a failed `accept` so a persistent error does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// One outcome observed on a socket.
#[derive(Debug, Clone)]
pub struct Report {
    /// `tcp://peer` or `udp://peer`
    pub source: String,
    /// Local port the bytes arrived on
    pub port: u16,
    pub dissection: Dissection,
}

/// Sockets bound for every routed port, not yet serving.
pub struct Listeners {
    tcp: Vec<(TcpListener, PortRole)>,
    udp: Vec<(UdpSocket, PortRole)>,
    dissector: Dissector,
    max_frame_len: usize,
}

impl Listeners {
    /// Bind every port in `config.ports` on `config.listen.bind_address`.
    pub async fn bind(config: &AppConfig, dissector: Dissector) -> takshark_core::Result<Self> {
        let host = config.listen.bind_address.as_str();
        let mut tcp = Vec::new();
        let mut udp = Vec::new();

        for (port, role) in config.ports.all() {
            if config.listen.tcp {
                let listener = TcpListener::bind((host, port))
                    .await
                    .map_err(|e| ListenError::bind_failed("tcp", format!("{host}:{port}"), e.to_string()))?;
                tcp.push((listener, role));
            }
            if config.listen.udp {
                let socket = UdpSocket::bind((host, port))
                    .await
                    .map_err(|e| ListenError::bind_failed("udp", format!("{host}:{port}"), e.to_string()))?;
                udp.push((socket, role));
            }
        }

        if tcp.is_empty() && udp.is_empty() {
            return Err(ListenError::NoPorts.into());
        }

        Ok(Self {
            tcp,
            udp,
            dissector,
            max_frame_len: config.dissect.max_frame_len,
        })
    }

    pub fn tcp_addrs(&self) -> Vec<SocketAddr> {
        self.tcp.iter().filter_map(|(l, _)| l.local_addr().ok()).collect()
    }

    pub fn udp_addrs(&self) -> Vec<SocketAddr> {
        self.udp.iter().filter_map(|(s, _)| s.local_addr().ok()).collect()
    }

    /// Start serving. Tasks stop once `reports` is closed.
    pub fn spawn(self, reports: mpsc::Sender<Report>) -> JoinSet<()> {
        let mut tasks = JoinSet::new();

        for (listener, role) in self.tcp {
            let port = listener.local_addr().map(|a| a.port()).unwrap_or_default();
            info!(port, ?role, "listening on tcp");
            tasks.spawn(accept_loop(
                listener,
                Session {
                    dissector: self.dissector.clone(),
                    role,
                    port,
                    reports: reports.clone(),
                },
                self.max_frame_len,
            ));
        }

        for (socket, role) in self.udp {
            let port = socket.local_addr().map(|a| a.port()).unwrap_or_default();
            info!(port, ?role, "listening on udp");
            tasks.spawn(datagram_loop(
                socket,
                Session {
                    dissector: self.dissector.clone(),
                    role,
                    port,
                    reports: reports.clone(),
                },
            ));
        }
        tasks
    }
}

/// Serve until Ctrl-C, printing one line per outcome to stdout.
pub async fn run(config: &AppConfig, dissector: Dissector, output: OutputFormat) -> Result<()> {
    let listeners = Listeners::bind(config, dissector).await?;
    let (tx, mut rx) = mpsc::channel(1024);
    let mut tasks = listeners.spawn(tx);

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            report = rx.recv() => match report {
                Some(report) => println!("{}", render(&report.source, &report.dissection, output)),
                None => break,
            },
            _ = &mut shutdown => {
                info!("received shutdown signal");
                break;
            }
        }
    }

    tasks.abort_all();
    Ok(())
}

#[derive(Clone)]
struct Session {
    dissector: Dissector,
    role: PortRole,
    port: u16,
    reports: mpsc::Sender<Report>,
}

impl Session {
    /// Returns false once nobody is listening for reports.
    async fn report(&self, source: &str, dissection: Dissection) -> bool {
        if let Dissection::Malformed { reason, offset, .. } = &dissection {
            warn!(source, offset, reason = %reason, "malformed frame");
        }
        if let Some(format) = dissection.format() {
            let expected = match format {
                Format::Omni => PortRole::Omni,
                Format::Xml | Format::TakStream | Format::TakMesh { .. } => PortRole::Tak,
            };
            if expected != self.role {
                debug!(port = self.port, role = ?self.role, %format, "traffic does not match port role");
            }
        }

        self.reports
            .send(Report {
                source: source.to_string(),
                port: self.port,
                dissection,
            })
            .await
            .is_ok()
    }
}

/// Connection tasks belong to this loop and are aborted when it stops.
async fn accept_loop(listener: TcpListener, session: Session, max_frame_len: usize) {
    let mut connections = JoinSet::new();
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(port = session.port, %peer, "accepted connection");
                connections.spawn(read_connection(stream, peer, session.clone(), max_frame_len));
            }
            Err(e) => {
                warn!(port = session.port, error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
        while connections.try_join_next().is_some() {}
        if session.reports.is_closed() {
            return;
        }
    }
}

async fn read_connection(stream: TcpStream, peer: SocketAddr, session: Session, max_frame_len: usize) {
    let source = format!("tcp://{peer}");
    let mut frames = FramedRead::new(stream, TakFrameCodec::new(max_frame_len));

    while let Some(frame) = frames.next().await {
        match frame {
            Ok(frame) => {
                for outcome in session.dissector.dissect_stream(&frame) {
                    if !session.report(&source, outcome).await {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!(%peer, error = %e, "dropping connection");
                return;
            }
        }
    }
    debug!(%peer, "connection closed");
}

async fn datagram_loop(socket: UdpSocket, session: Session) {
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
    loop {
        match socket.recv_from(&mut buf).await {
            Ok((len, peer)) => {
                let outcome = session.dissector.dissect(&buf[..len], Transport::Datagram);
                if !session.report(&format!("udp://{peer}"), outcome).await {
                    return;
                }
            }
            Err(e) => warn!(port = session.port, error = %e, "receive failed"),
        }
    }
}
