//! Loopback mock servers and certificates for tests.

use crate::infra::tls::{CustomRootsTlsProvider, TlsProvider};
use rcgen::CertifiedKey;
use rustls::crypto::ring;
use rustls_pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_rustls::TlsAcceptor;

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Self-signed certificate valid for the given names.
pub(crate) struct TestCert {
    der: CertificateDer<'static>,
    key: Vec<u8>,
}

impl TestCert {
    pub fn for_names(names: &[&str]) -> Self {
        let CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(
            names.iter().map(|n| n.to_string()).collect::<Vec<_>>(),
        )
        .unwrap();
        Self {
            der: cert.der().clone(),
            key: key_pair.serialize_der(),
        }
    }

    /// Client-side provider trusting only this certificate.
    pub fn provider(&self) -> Arc<dyn TlsProvider> {
        let mut roots = rustls::RootCertStore::empty();
        roots.add(self.der.clone()).unwrap();
        Arc::new(CustomRootsTlsProvider::new(roots))
    }

    fn acceptor(&self) -> TlsAcceptor {
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key.clone()));
        let config = rustls::ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![self.der.clone()], key)
            .unwrap();
        TlsAcceptor::from(Arc::new(config))
    }
}

/// One request head as seen by a mock server.
#[derive(Debug, Clone)]
pub(crate) struct SeenRequest {
    pub head: String,
    pub sni: Option<String>,
}

impl SeenRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

/// A loopback server answering every connection with a canned response.
pub(crate) struct MockServer {
    pub addr: SocketAddr,
    requests: mpsc::UnboundedReceiver<SeenRequest>,
}

impl MockServer {
    pub async fn plain(response: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, requests) = mpsc::unbounded_channel();
        let response = Arc::new(response);

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                let response = Arc::clone(&response);
                tokio::spawn(async move {
                    answer(stream, &response, None, &tx).await;
                });
            }
        });

        Self { addr, requests }
    }

    pub async fn tls(cert: &TestCert, response: Vec<u8>) -> Self {
        Self::tls_on("127.0.0.1:0", cert, response).await.unwrap()
    }

    /// TLS server on a chosen local address; `None` when it cannot be bound,
    /// e.g. `[::1]:0` on a host without IPv6.
    pub async fn tls_on(bind: &str, cert: &TestCert, response: Vec<u8>) -> Option<Self> {
        let listener = TcpListener::bind(bind).await.ok()?;
        let addr = listener.local_addr().unwrap();
        let (tx, requests) = mpsc::unbounded_channel();
        let response = Arc::new(response);
        let acceptor = cert.acceptor();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                let response = Arc::clone(&response);
                let acceptor = acceptor.clone();
                tokio::spawn(async move {
                    let Ok(tls) = acceptor.accept(stream).await else {
                        return;
                    };
                    let sni = tls.get_ref().1.server_name().map(str::to_string);
                    answer(tls, &response, sni, &tx).await;
                });
            }
        });

        Some(Self { addr, requests })
    }

    /// Accepts connections and never writes a byte.
    pub async fn silent() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (_tx, requests) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        Self { addr, requests }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn next_request(&mut self) -> SeenRequest {
        tokio::time::timeout(Duration::from_secs(5), self.requests.recv())
            .await
            .expect("no request within 5s")
            .expect("server stopped")
    }
}

async fn answer<S>(
    mut stream: S,
    response: &[u8],
    sni: Option<String>,
    tx: &mpsc::UnboundedSender<SeenRequest>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let _ = tx.send(SeenRequest {
        head: String::from_utf8_lossy(&buf).into_owned(),
        sni,
    });
    let _ = stream.write_all(response).await;
    let _ = stream.shutdown().await;
}

/// Serializes an HTTP/1.1 response with a `Content-Length` body.
pub(crate) fn http_response(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (name, value) in headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");

    let mut bytes = head.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}

pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
