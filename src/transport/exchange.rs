//! Connection setup and request dispatch.

use crate::error::{Error, Result};
use crate::infra::tls::SecureChannelFactory;
use crate::shared::PhaseObserver;
use http_body_util::{BodyExt, Empty};
use hyper::{
    body::{Bytes, Incoming},
    client::conn::http1::SendRequest,
    header::{HeaderName, HOST, USER_AGENT},
    HeaderMap, Method, Request, Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use std::{future::Future, io, net::SocketAddr, time::Duration};
use tokio::{net::TcpStream, task::JoinHandle, time::timeout};

const AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Task driving a hyper connection. Aborting it closes the socket.
struct ConnectionTask(JoinHandle<()>);

impl Drop for ConnectionTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A response whose headers have arrived, bound to its connection.
pub(crate) struct Exchange {
    response: Response<Incoming>,
    _sender: SendRequest<Empty<Bytes>>,
    _connection: ConnectionTask,
}

impl Exchange {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Reads the whole body, then releases the connection.
    pub async fn into_body(self) -> Result<(HeaderMap, Bytes)> {
        let Exchange {
            response,
            _sender,
            _connection,
        } = self;
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await?.to_bytes();
        Ok((parts.headers, bytes))
    }
}

/// Builds a GET request with an explicit `Host` header.
pub(crate) fn build_get_request(
    path: &str,
    host: &str,
    headers: &[(HeaderName, &str)],
) -> Result<Request<Empty<Bytes>>> {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(HOST, host)
        .header(USER_AGENT, AGENT);

    for (name, value) in headers {
        builder = builder.header(name.clone(), *value);
    }

    builder
        .body(Empty::new())
        .map_err(|e| Error::Request(e.to_string()))
}

/// Opens a TCP connection to the first address in `addrs` that accepts one,
/// trying them in order. The last connect error is returned when all fail.
async fn connect_any(addrs: &[SocketAddr]) -> Result<TcpStream> {
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!(%addr, "Connect failed: {}", e);
                last_error = Some(e);
            }
        }
    }

    Err(Error::Connect(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, "no addresses to connect to")
    })))
}

/// Connects to one of `addrs`, performs the TLS handshake when a channel is
/// given, and sends `request`. Returns once response headers are received.
pub(crate) async fn send<O: PhaseObserver>(
    addrs: &[SocketAddr],
    channel: Option<&SecureChannelFactory>,
    request: Request<Empty<Bytes>>,
    observer: &mut O,
) -> Result<Exchange> {
    let tcp_stream = connect_any(addrs).await?;
    observer.connected();

    let (mut sender, connection) = match channel {
        Some(channel) => {
            observer.tls_started();
            let tls_stream = channel.connect(tcp_stream).await?;
            observer.tls_finished();
            handshake(TokioIo::new(tls_stream)).await?
        }
        None => handshake(TokioIo::new(tcp_stream)).await?,
    };

    let response = sender.send_request(request).await?;
    observer.headers_received();

    Ok(Exchange {
        response,
        _sender: sender,
        _connection: connection,
    })
}

async fn handshake<I>(io: I) -> Result<(SendRequest<Empty<Bytes>>, ConnectionTask)>
where
    I: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let (sender, conn) = hyper::client::conn::http1::handshake(io).await?;

    let task = tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::warn!("Connection error: {}", e);
        }
    });

    Ok((sender, ConnectionTask(task)))
}

pub(crate) fn ensure_success(status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::Status(status.as_u16()))
    }
}

/// Bounds a whole operation. On expiry the future is dropped, which
/// releases any connection it holds.
pub(crate) async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    timeout(limit, fut).await.map_err(|_| Error::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::ACCEPT_ENCODING;

    #[test]
    fn test_build_get_request_headers() {
        let request =
            build_get_request("/list?x=1", "mirror.example", &[(ACCEPT_ENCODING, "gzip")]).unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri(), "/list?x=1");
        assert_eq!(request.headers()[HOST], "mirror.example");
        assert_eq!(request.headers()[ACCEPT_ENCODING], "gzip");
        assert!(request.headers()[USER_AGENT]
            .to_str()
            .unwrap()
            .starts_with("endpoint-scout/"));
    }

    #[test]
    fn test_ensure_success() {
        assert!(ensure_success(StatusCode::OK).is_ok());
        assert!(ensure_success(StatusCode::NO_CONTENT).is_ok());
        assert!(matches!(
            ensure_success(StatusCode::FOUND),
            Err(Error::Status(302))
        ));
    }

    #[tokio::test]
    async fn test_with_timeout_fires() {
        let limit = Duration::from_millis(20);
        let result: Result<()> = with_timeout(limit, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(Error::Timeout(d)) if d == limit));
    }

    #[tokio::test]
    async fn test_connect_refused_is_connect_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = build_get_request("/", "localhost", &[]).unwrap();
        let err = send(&[addr], None, request, &mut ()).await.err().unwrap();
        assert_eq!(err.code(), "CONNECTION_FAILED");
    }

    #[tokio::test]
    async fn test_connect_any_moves_past_refused_address() {
        let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let refused = closed.local_addr().unwrap();
        drop(closed);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap();

        let stream = connect_any(&[refused, open]).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap(), open);
    }

    #[tokio::test]
    async fn test_connect_any_without_addresses() {
        let err = connect_any(&[]).await.err().unwrap();
        assert_eq!(err.code(), "CONNECTION_FAILED");
    }
}
