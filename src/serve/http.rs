//! `tiny_http` server loop.

use super::{Handler, Reply, ServeRequest};
use crate::{debug, log};
use anyhow::{Context, Result, anyhow};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bound server ready to accept requests.
pub struct HttpServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

/// Stops a running [`HttpServer`] from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<Server>,
}

impl ShutdownHandle {
    /// Unblock the request loop; `run` returns once in-flight accepts end.
    pub fn shutdown(&self) {
        self.server.unblock();
    }
}

impl HttpServer {
    /// Bind to the interface and port, trying successive ports if taken.
    pub fn bind(interface: IpAddr, base_port: u16) -> Result<Self> {
        let mut last_error = None;
        let bound = (0..MAX_PORT_RETRIES)
            .map(|offset| SocketAddr::new(interface, base_port.saturating_add(offset)))
            .find_map(|addr| match Server::http(addr) {
                Ok(server) => Some((server, addr)),
                Err(e) => {
                    last_error = Some(e);
                    None
                }
            });

        let Some((server, addr)) = bound else {
            return Err(anyhow!(
                "Failed to bind after {} attempts (ports {}-{}): {}",
                MAX_PORT_RETRIES,
                base_port,
                base_port.saturating_add(MAX_PORT_RETRIES - 1),
                last_error.map(|e| e.to_string()).unwrap_or_default()
            ));
        };

        if addr.port() != base_port {
            log!("serve"; "port {} in use, using {} instead", base_port, addr.port());
        }
        Ok(Self {
            server: Arc::new(server),
            addr,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::clone(&self.server),
        }
    }

    /// Serve requests on `threads` workers until shut down (blocking).
    pub fn run<H: Handler + 'static>(self, handler: Arc<H>, threads: usize) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hashfs-http-{i}"))
            .build()
            .context("failed to create request thread pool")?;

        for request in self.server.incoming_requests() {
            let handler = Arc::clone(&handler);
            pool.spawn(move || {
                if let Err(e) = handle_request(request, handler.as_ref()) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
        Ok(())
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, handler: &impl Handler) -> Result<()> {
    let req = ServeRequest::from_http(&request);
    let reply = handler.respond(&req);
    debug!("serve"; "{} {} -> {}", req.method, request.url(), reply.status);
    send(request, reply)
}

/// Write a [`Reply`] to the client.
fn send(request: Request, reply: Reply) -> Result<()> {
    let Reply {
        status,
        headers,
        body,
    } = reply;

    let mut response = Response::from_data(body).with_status_code(StatusCode(status));
    for (name, value) in headers {
        let header = Header::from_bytes(name.as_bytes(), value.as_bytes())
            .map_err(|()| anyhow!("invalid header {name}: {value}"))?;
        response.add_header(header);
    }

    request.respond(response)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileset::{FileSetHandle, MemFileSet};
    use crate::hash::HashFs;
    use crate::serve::{StaticOptions, build_handler};
    use std::io::{Read, Write};
    use std::net::{Ipv4Addr, TcpListener, TcpStream};

    const MAIN_JS: &str = "console.log(\"hello from main.js\");\n";

    fn free_port() -> u16 {
        TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    fn send_raw(addr: SocketAddr, method: &str, path: &str, headers: &[&str]) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "{method} {path} HTTP/1.1\r\nHost: localhost\r\n").unwrap();
        for header in headers {
            write!(stream, "{header}\r\n").unwrap();
        }
        write!(stream, "Connection: close\r\n\r\n").unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    fn get(addr: SocketAddr, path: &str) -> String {
        send_raw(addr, "GET", path, &[])
    }

    fn content_length(response: &str) -> Option<usize> {
        response
            .lines()
            .take_while(|line| !line.is_empty())
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse().ok())?
            })
    }

    fn body(response: &str) -> &str {
        response.split_once("\r\n\r\n").map_or("", |(_, body)| body)
    }

    fn start() -> (SocketAddr, ShutdownHandle, std::thread::JoinHandle<Result<()>>) {
        let fs = HashFs::new(FileSetHandle::new(
            MemFileSet::new().with_file("assets/main.js", MAIN_JS),
        ));
        let handler = Arc::new(build_handler(fs, StaticOptions::default()));

        let server = HttpServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), free_port()).unwrap();
        let addr = server.addr();
        let shutdown = server.shutdown_handle();
        let worker = std::thread::spawn(move || server.run(handler, 2));
        (addr, shutdown, worker)
    }

    #[test]
    fn test_serves_over_socket() {
        let (addr, shutdown, worker) = start();

        let ok = get(addr, "/assets/main.9f7c608eae51.js");
        assert!(ok.starts_with("HTTP/1.1 200"), "{ok}");
        assert_eq!(body(&ok), MAIN_JS);
        assert_eq!(content_length(&ok), Some(MAIN_JS.len()));

        let bad = get(addr, "/assets/main.000000000000.js");
        assert!(bad.starts_with("HTTP/1.1 400"), "{bad}");
        assert!(bad.contains("path mismatch"), "{bad}");

        shutdown.shutdown();
        worker.join().unwrap().unwrap();
    }

    #[test]
    fn test_head_reports_get_length() {
        let (addr, shutdown, worker) = start();

        let head = send_raw(addr, "HEAD", "/assets/main.9f7c608eae51.js", &[]);
        assert!(head.starts_with("HTTP/1.1 200"), "{head}");
        assert_eq!(content_length(&head), Some(MAIN_JS.len()), "{head}");
        assert_eq!(body(&head), "");

        shutdown.shutdown();
        worker.join().unwrap().unwrap();
    }

    #[test]
    fn test_not_modified_over_socket() {
        let (addr, shutdown, worker) = start();

        let cached = send_raw(
            addr,
            "GET",
            "/assets/main.9f7c608eae51.js",
            &["If-None-Match: \"9f7c608eae51\""],
        );
        assert!(cached.starts_with("HTTP/1.1 304"), "{cached}");
        assert_eq!(body(&cached), "");

        let stale = send_raw(
            addr,
            "GET",
            "/assets/main.9f7c608eae51.js",
            &["If-None-Match: \"000000000000\""],
        );
        assert!(stale.starts_with("HTTP/1.1 200"), "{stale}");
        assert_eq!(body(&stale), MAIN_JS);

        shutdown.shutdown();
        worker.join().unwrap().unwrap();
    }

    #[test]
    fn test_bind_skips_taken_port() {
        let taken = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = taken.local_addr().unwrap().port();

        let server = HttpServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), port).unwrap();
        assert_ne!(server.addr().port(), port);
    }
}
