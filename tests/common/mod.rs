#![allow(dead_code)]

use foprep::{FilesystemStylesheetSource, Transformer};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A temporary style directory populated with stylesheets.
pub struct StyleDir {
    dir: TempDir,
}

impl StyleDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp style dir"),
        }
    }

    /// Writes `css` to `name` (which may contain subdirectories).
    pub fn with_sheet(self, name: &str, css: &str) -> Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create stylesheet dir");
        }
        fs::write(path, css).expect("write stylesheet");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn transformer(&self) -> Transformer {
        Transformer::builder()
            .with_source(Arc::new(FilesystemStylesheetSource::new(self.path())))
            .build()
            .expect("build transformer")
    }
}

/// One element of a parsed output document: the prefixed tag name and the
/// attributes other than namespace declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSnapshot {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
}

/// Splits serialized output into its declaration line and the markup.
pub fn split_output(bytes: &[u8]) -> (String, String) {
    let text = String::from_utf8(bytes.to_vec()).expect("utf-8 output");
    match text.split_once('\n') {
        Some((declaration, body)) => (declaration.to_string(), body.to_string()),
        None => (String::new(), text),
    }
}

/// Parses serialized markup with roxmltree and lists every element in
/// document order.
pub fn snapshot_output(body: &str) -> Vec<ElementSnapshot> {
    let doc = roxmltree::Document::parse(body).expect("output is well-formed");
    doc.descendants()
        .filter(|n| n.is_element())
        .map(|node| {
            let tag = node.tag_name();
            let name = match tag.namespace().and_then(|uri| node.lookup_prefix(uri)) {
                Some(prefix) => format!("{}:{}", prefix, tag.name()),
                None => tag.name().to_string(),
            };
            let attributes = node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect();
            ElementSnapshot { name, attributes }
        })
        .collect()
}

/// Lists the elements of an in-memory document the same way, leaving out
/// `xmlns` declarations.
pub fn snapshot_document(doc: &foprep::Document) -> Vec<ElementSnapshot> {
    doc.elements()
        .filter_map(|id| doc.element(id))
        .map(|element| ElementSnapshot {
            name: element.name().to_string(),
            attributes: element
                .attributes()
                .filter(|(name, _)| *name != "xmlns" && !name.starts_with("xmlns:"))
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        })
        .collect()
}

/// An HTTP request as received by [`serve_once`]. Header names are
/// lower-cased.
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Accepts one HTTP/1.1 request on a local port and answers it with
/// `status` (e.g. `"200 OK"`) and `body`.
pub fn serve_once(status: &str, body: &'static [u8]) -> (u16, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let port = listener.local_addr().expect("listener address").port();
    let status = status.to_string();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("read request line");
        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header line");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
            }
        }
        let length = headers
            .iter()
            .find(|(name, _)| name == "content-length")
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or(0);
        let mut request_body = vec![0; length];
        reader.read_exact(&mut request_body).expect("read request body");

        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        )
        .expect("write response head");
        stream.write_all(body).expect("write response body");

        CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: request_body,
        }
    });
    (port, handle)
}
