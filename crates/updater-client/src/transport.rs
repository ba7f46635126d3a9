use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::client::conn::http1;
use hyper::header::{HOST, USER_AGENT};
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error};
use updater_types::{ObjectPath, Operation, ReplicaNode, SYNTHETIC_FAILURE_STATUS};

use crate::error::{ClientError, ClientResult};
use crate::traits::ReplicaClient;

/// Request target on a container server:
/// `/<device>/<partition>/<account>/<container>/<object>`, percent-encoded
/// per segment. Slashes inside the object name are kept.
pub fn request_path(node: &ReplicaNode, partition: u32, path: &ObjectPath) -> String {
    let mut out = format!("/{}/{}", quote(&node.device), partition);
    for segment in path.segments() {
        out.push('/');
        out.push_str(&quote(segment));
    }
    out
}

fn quote(s: &str) -> String {
    s.split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// HTTP/1.1 delivery client.
///
/// Each delivery opens a fresh connection. The connect phase (TCP connect and
/// handshake) runs under `conn_timeout`; sending the request, reading the
/// status and draining the body runs under `node_timeout`.
#[derive(Clone, Debug)]
pub struct HttpReplicaClient {
    conn_timeout: Duration,
    node_timeout: Duration,
    user_agent: String,
}

impl HttpReplicaClient {
    pub fn new(conn_timeout: Duration, node_timeout: Duration) -> Self {
        Self {
            conn_timeout,
            node_timeout,
            user_agent: format!("object-updater {}", std::process::id()),
        }
    }

    async fn attempt(
        &self,
        node: &ReplicaNode,
        partition: u32,
        op: Operation,
        path: &ObjectPath,
        headers: &BTreeMap<String, String>,
    ) -> ClientResult<u16> {
        let connect = async {
            let stream = TcpStream::connect(node.addr).await?;
            let parts = http1::handshake::<_, Empty<Bytes>>(TokioIo::new(stream)).await?;
            Ok::<_, ClientError>(parts)
        };
        let (mut sender, conn) = timeout(self.conn_timeout, connect)
            .await
            .map_err(|_| ClientError::ConnectTimeout(self.conn_timeout))??;

        let peer = node.to_string();
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(node = %peer, error = %e, "replica connection closed with error");
            }
        });

        let mut request = Request::builder()
            .method(op.method())
            .uri(request_path(node, partition, path))
            .header(HOST, node.addr.to_string())
            .header(USER_AGENT, self.user_agent.as_str());
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = request.body(Empty::<Bytes>::new())?;

        let exchange = async {
            let response = sender.send_request(request).await?;
            let status = response.status().as_u16();
            response.into_body().collect().await?;
            Ok::<_, ClientError>(status)
        };
        timeout(self.node_timeout, exchange)
            .await
            .map_err(|_| ClientError::ResponseTimeout(self.node_timeout))?
    }
}

#[async_trait]
impl ReplicaClient for HttpReplicaClient {
    async fn deliver(
        &self,
        node: &ReplicaNode,
        partition: u32,
        op: Operation,
        path: &ObjectPath,
        headers: &BTreeMap<String, String>,
    ) -> u16 {
        match self.attempt(node, partition, op, path, headers).await {
            Ok(status) => status,
            Err(e) => {
                error!(
                    node = %node,
                    object = %path,
                    error = %e,
                    "ERROR with remote server"
                );
                SYNTHETIC_FAILURE_STATUS
            }
        }
    }
}
