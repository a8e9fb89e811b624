use super::{BuilderError, DocumentBuilder, keep, output_file};
use crate::format::OutputFormat;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use std::fmt;
use std::path::PathBuf;

/// Formats documents on a [fops](https://github.com/cyraxjoe/fops) server,
/// which keeps a formatter JVM running between requests.
///
/// Each document is posted form-encoded as `document=<xsl-fo>` to
/// `<protocol>://<host>:<port>/<format>`; a `200 OK` body is written to a
/// file in the temp directory.
#[derive(Clone)]
pub struct FopsBuilder {
    client: Client,
    protocol: String,
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    charset: String,
    temp_dir: PathBuf,
}

impl FopsBuilder {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, BuilderError> {
        let client = Client::builder().build().map_err(BuilderError::Client)?;
        Ok(Self {
            client,
            protocol: "http".to_string(),
            host: host.into(),
            port,
            credentials: None,
            charset: "utf-8".to_string(),
            temp_dir: std::env::temp_dir(),
        })
    }

    /// `http` unless changed.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Sends HTTP basic credentials with every request.
    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), password.into()));
        self
    }

    /// Charset announced for the form body; it should name the encoding the
    /// XSL-FO was serialized in.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// The endpoint that formats documents as `format`.
    pub fn server_url(&self, format: OutputFormat) -> Result<Url, BuilderError> {
        let base = format!("{}://{}:{}/", self.protocol, self.host, self.port);
        Url::parse(&base)
            .and_then(|url| url.join(format.as_str()))
            .map_err(|e| BuilderError::InvalidUrl {
                url: base.clone(),
                message: e.to_string(),
            })
    }
}

impl fmt::Debug for FopsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FopsBuilder")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.credentials.as_ref().map(|(user, _)| user))
            .field("charset", &self.charset)
            .field("temp_dir", &self.temp_dir)
            .finish_non_exhaustive()
    }
}

impl DocumentBuilder for FopsBuilder {
    fn build(&self, xslfo: &[u8], format: OutputFormat) -> Result<PathBuf, BuilderError> {
        let url = self.server_url(format)?;
        let request_error = |source: reqwest::Error| BuilderError::Request {
            url: url.to_string(),
            source,
        };
        let body = format!(
            "document={}",
            form_urlencoded::byte_serialize(xslfo).collect::<String>()
        );
        log::debug!("POST {} ({} bytes of XSL-FO)", url, xslfo.len());

        let mut request = self
            .client
            .post(url.clone())
            .header(
                CONTENT_TYPE,
                format!("application/x-www-form-urlencoded; charset={}", self.charset),
            )
            .body(body);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }
        let mut response = request.send().map_err(request_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            return Err(BuilderError::ServerResponse {
                status: status.as_u16(),
                body,
            });
        }

        let mut output = output_file(&self.temp_dir, format)?;
        let written = response
            .copy_to(output.as_file_mut())
            .map_err(request_error)?;
        log::debug!("Received {} bytes from {}", written, url);
        keep(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_server_url_per_format() {
        let builder = FopsBuilder::new("localhost", 3000).unwrap();
        assert_eq!(
            builder.server_url(OutputFormat::Pdf).unwrap().as_str(),
            "http://localhost:3000/pdf"
        );
        let builder = builder.with_protocol("https");
        assert_eq!(
            builder.server_url(OutputFormat::Tiff).unwrap().as_str(),
            "https://localhost:3000/tiff"
        );
    }

    #[test]
    fn test_invalid_host_is_reported() {
        let builder = FopsBuilder::new("bad host", 3000).unwrap();
        assert!(matches!(
            builder.server_url(OutputFormat::Pdf),
            Err(BuilderError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_unreachable_server_is_a_request_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let dir = tempfile::tempdir().unwrap();
        let builder = FopsBuilder::new("127.0.0.1", port)
            .unwrap()
            .with_temp_dir(dir.path());
        assert!(matches!(
            builder.build(b"<fo:root/>", OutputFormat::Pdf),
            Err(BuilderError::Request { .. })
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_debug_hides_the_password() {
        let builder = FopsBuilder::new("localhost", 3000)
            .unwrap()
            .with_basic_auth("user", "s3cret");
        let debug = format!("{:?}", builder);
        assert!(debug.contains("user"));
        assert!(!debug.contains("s3cret"));
    }
}
