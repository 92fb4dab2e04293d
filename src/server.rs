use log::{debug, info};
use std::env;
use std::io::{self, BufReader};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Instant;

use crate::file_serving::{GzipHandler, Served};
use crate::request::{Incoming, Request};
use crate::response::Response;
use crate::{log_error, log_request, log_response};

pub const BIND_HOST: &str = "localhost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Document root.
    pub root: PathBuf,
}

impl ServerConfig {
    /// Serves the process working directory.
    pub fn from_port(port: u16) -> io::Result<Self> {
        Ok(Self {
            port,
            root: env::current_dir()?,
        })
    }
}

/// IPv4 addresses `localhost` resolves to.
pub fn loopback_addrs(port: u16) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (BIND_HOST, port)
        .to_socket_addrs()?
        .filter(SocketAddr::is_ipv4)
        .collect();
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{} has no IPv4 address", BIND_HOST),
        ));
    }
    Ok(addrs)
}

/// One listening socket, handled one connection at a time.
pub struct Server {
    listener: TcpListener,
    handler: GzipHandler,
}

impl Server {
    pub fn bind(config: &ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(loopback_addrs(config.port)?.as_slice())?;
        info!(
            "Listening on {} with document root {}",
            listener.local_addr()?,
            config.root.display()
        );
        Ok(Self {
            listener,
            handler: GzipHandler::new(config.root.clone()),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts and answers connections until the process is killed.
    pub fn serve_forever(&self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.handle_connection(stream),
                Err(e) => log_error!(e, "Failed to accept connection"),
            }
        }
        Ok(())
    }

    /// Errors stay with the connection: it is logged and shut down unanswered.
    pub fn handle_connection(&self, stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        debug!("New connection from {}", peer);

        if let Err(e) = self.process(&stream, &peer) {
            log_error!(e, format!("Aborting connection from {}", peer));
        }
        let _ = stream.shutdown(Shutdown::Both);
    }

    fn process(&self, stream: &TcpStream, peer: &str) -> io::Result<()> {
        let start_time = Instant::now();
        let mut reader = BufReader::new(stream);

        let served = match Request::read_from(&mut reader)? {
            Incoming::Closed => {
                debug!("{} closed without a request", peer);
                return Ok(());
            }
            Incoming::Rejected { status, message } => {
                log::warn!("{} sent a malformed request: {}", peer, message);
                Served {
                    response: Response::error(status, &message),
                    hook_path: String::new(),
                }
            }
            Incoming::Request(request) => {
                log_request!(peer, request.method, request.target);
                self.handler.handle(&request)?
            }
        };

        let mut writer = stream;
        served.response.write_to(&mut writer, &served.hook_path)?;
        log_response!(
            peer,
            served.response.status,
            start_time.elapsed(),
            served.response.body.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_resolves_to_ipv4_loopback() {
        let addrs = loopback_addrs(8000).unwrap();
        assert!(addrs.iter().all(|a| a.is_ipv4() && a.ip().is_loopback()));
        assert!(addrs.iter().all(|a| a.port() == 8000));
    }

    #[test]
    fn busy_port_fails_to_bind() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ServerConfig {
            port: taken.local_addr().unwrap().port(),
            root: env::temp_dir(),
        };
        let err = Server::bind(&config).err().expect("bind should fail");
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }
}
