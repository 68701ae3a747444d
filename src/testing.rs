//! In-memory source and store used by the unit tests.

use crate::destination::DocumentStore;
use crate::error::SyncError;
use crate::source::SubmissionSource;
use crate::transform::IndexedDocument;
use crate::types::{Submission, SubmissionPage};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub(crate) fn submission(instance_id: &str, answer: &str) -> Submission {
    serde_json::from_value(json!({
        "id": 1,
        "created": "2018-05-01T10:00:00Z",
        "payload": {
            "@id": "household_survey",
            "@version": "2",
            "@xmlns:h": "http://www.w3.org/1999/xhtml",
            "@xmlns:jr": "http://openrosa.org/javarosa",
            "answer": answer,
            "meta": { "instanceID": instance_id }
        },
        "meta": { "instanceID": instance_id }
    }))
    .unwrap()
}

pub(crate) fn page(results: Vec<Submission>, next: Option<&str>) -> SubmissionPage {
    SubmissionPage {
        results,
        next: next.map(str::to_string),
    }
}

/// Serves pages from a map keyed by URL; unknown URLs fail like a 404.
#[derive(Default)]
pub(crate) struct FakeSource {
    pages: HashMap<String, SubmissionPage>,
    fetched: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_page(mut self, url: &str, page: SubmissionPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionSource for FakeSource {
    fn page_url(&self, page: u64) -> String {
        format!("fake://gather/submissions/?page={}", page)
    }

    async fn fetch_page(&self, url: &str) -> Result<SubmissionPage, SyncError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| SyncError::fetch(url, "HTTP 404 Not Found"))
    }
}

/// Records every write; ids in `rejected` get a 400.
#[derive(Default)]
pub(crate) struct FakeStore {
    pub count: Option<u64>,
    pub rejected: HashSet<String>,
    attempts: Mutex<Vec<IndexedDocument>>,
}

impl FakeStore {
    pub fn with_count(count: u64) -> Self {
        Self {
            count: Some(count),
            ..Self::default()
        }
    }

    pub fn rejecting(mut self, id: &str) -> Self {
        self.rejected.insert(id.to_string());
        self
    }

    pub fn attempts(&self) -> Vec<IndexedDocument> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn document_count(&self) -> Result<u64, SyncError> {
        self.count
            .ok_or_else(|| SyncError::fetch("fake://es/submissions/_search", "HTTP 503"))
    }

    async fn upsert(&self, doc: &IndexedDocument) -> Result<u16, SyncError> {
        self.attempts.lock().unwrap().push(doc.clone());
        if self.rejected.contains(&doc.id) {
            return Err(SyncError::Upsert {
                id: doc.id.clone(),
                status: Some(400),
                reason: "HTTP 400 Bad Request".to_string(),
            });
        }
        Ok(201)
    }
}

/// An HTTP/1.1 request as received on the wire.
#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub request_line: String,
    headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// Value of the first header named `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn parse(raw: &str) -> Self {
        let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw, ""));
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();
        Self {
            request_line,
            headers,
            body: body.to_string(),
        }
    }
}

/// Binds a local port that answers a single request with `status` and `body`.
///
/// Returns the base URL and a handle resolving to the captured request.
pub(crate) async fn serve_once(
    status: &str,
    body: &str,
) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let raw = read_request(&mut stream).await;
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
        CapturedRequest::parse(&raw)
    });
    (base, handle)
}

/// Reads until the headers and a `content-length` sized body have arrived.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&raw);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .split("\r\n")
                .filter_map(|line| line.split_once(':'))
                .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}
