#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// How the mock answers on one protocol.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// One TXT record per string, answer names compressed to the question.
    Txt(Vec<String>),
    /// Echo the question with this RCODE and no answers.
    Rcode(u8),
    /// Read the query and never answer.
    Silent,
}

impl MockReply {
    pub fn txt(records: &[&str]) -> Self {
        MockReply::Txt(records.iter().map(|s| s.to_string()).collect())
    }
}

/// TXT-only DNS server on 127.0.0.1, UDP and TCP on the same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<Mutex<Vec<Vec<u8>>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(udp: MockReply, tcp: MockReply) -> Result<Self, std::io::Error> {
        let (socket, listener) = Self::bind_pair().await?;
        let addr = socket.local_addr()?;
        let queries = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let udp_queries = Arc::clone(&queries);
        let tcp_queries = Arc::clone(&queries);

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            udp_queries.lock().unwrap().push(buf[..len].to_vec());
                            if let Some(response) = build_response(&buf[..len], &udp) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                    accepted = listener.accept() => {
                        if let Ok((mut stream, _)) = accepted {
                            let tcp = tcp.clone();
                            let tcp_queries = Arc::clone(&tcp_queries);
                            tokio::spawn(async move {
                                let mut len_buf = [0u8; 2];
                                if stream.read_exact(&mut len_buf).await.is_err() {
                                    return;
                                }
                                let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                                if stream.read_exact(&mut query).await.is_err() {
                                    return;
                                }
                                tcp_queries.lock().unwrap().push(query.clone());
                                match build_response(&query, &tcp) {
                                    Some(response) => {
                                        let _ = stream
                                            .write_all(&(response.len() as u16).to_be_bytes())
                                            .await;
                                        let _ = stream.write_all(&response).await;
                                    }
                                    None => {
                                        // Keep the connection open until the client gives up.
                                        let mut sink = [0u8; 1];
                                        let _ = stream.read(&mut sink).await;
                                    }
                                }
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// UDP socket and TCP listener sharing an ephemeral port.
    async fn bind_pair() -> Result<(UdpSocket, TcpListener), std::io::Error> {
        let mut last_err = None;
        for _ in 0..16 {
            let socket = UdpSocket::bind("127.0.0.1:0").await?;
            let addr = socket.local_addr()?;
            match TcpListener::bind(addr).await {
                Ok(listener) => return Ok((socket, listener)),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| std::io::Error::other("no shared port available")))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Raw query messages received so far, both protocols.
    pub fn queries(&self) -> Vec<Vec<u8>> {
        self.queries.lock().unwrap().clone()
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// End offset of the single question in `query`.
fn question_end(query: &[u8]) -> Option<usize> {
    let mut pos = 12;
    loop {
        let len = *query.get(pos)? as usize;
        pos += 1;
        if len == 0 {
            break;
        }
        pos += len;
    }
    let end = pos + 4;
    (end <= query.len()).then_some(end)
}

pub fn build_response(query: &[u8], reply: &MockReply) -> Option<Vec<u8>> {
    let end = question_end(query)?;

    let (rcode, records): (u8, &[String]) = match reply {
        MockReply::Silent => return None,
        MockReply::Rcode(rcode) => (*rcode, &[]),
        MockReply::Txt(records) => (0, records),
    };

    let mut response = Vec::with_capacity(512);
    response.extend_from_slice(&query[0..2]);
    response.push(0x81);
    response.push(0x80 | (rcode & 0x0F));
    response.extend_from_slice(&[0x00, 0x01]);
    response.extend_from_slice(&(records.len() as u16).to_be_bytes());
    response.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    response.extend_from_slice(&query[12..end]);

    for record in records {
        let text = record.as_bytes();
        response.extend_from_slice(&[
            0xc0, 0x0c, // pointer to question name
            0x00, 0x10, // TXT
            0x00, 0x01, // IN
            0x00, 0x00, 0x00, 0x3c, // TTL 60
        ]);
        response.extend_from_slice(&((text.len() + 1) as u16).to_be_bytes());
        response.push(text.len() as u8);
        response.extend_from_slice(text);
    }

    Some(response)
}
