use std::fs;
use std::io::Read;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use camino::Utf8PathBuf;
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

use crate::config::SourceSpec;
use crate::domain::StudyMetadata;
use crate::error::KiraError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub trait StudySource: Send + Sync {
    fn fetch_study(&self) -> Result<StudyMetadata, KiraError>;
    fn describe(&self) -> String;
}

impl StudySource for Box<dyn StudySource> {
    fn fetch_study(&self) -> Result<StudyMetadata, KiraError> {
        (**self).fetch_study()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[derive(Clone)]
pub struct StudyHttpClient {
    client: Client,
    url: String,
}

impl StudyHttpClient {
    pub fn new(url: impl Into<String>) -> Result<Self, KiraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-sv/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| KiraError::StudyHttp(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        // No client-side timeout: the request waits on the network layer.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(None::<Duration>)
            .build()
            .map_err(|err| KiraError::StudyHttp(err.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StudySource for StudyHttpClient {
    fn fetch_study(&self) -> Result<StudyMetadata, KiraError> {
        tracing::debug!(url = %self.url, "study.request");
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|err| KiraError::StudyHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "study metadata request failed".to_string());
            return Err(KiraError::StudyStatus { status, message });
        }
        let bytes = response
            .bytes()
            .map_err(|err| KiraError::StudyHttp(err.to_string()))?;
        tracing::debug!(url = %self.url, bytes = bytes.len(), "study.response");
        decode_study(&bytes)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[derive(Debug, Clone)]
pub struct StudyFileSource {
    path: Utf8PathBuf,
}

impl StudyFileSource {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StudySource for StudyFileSource {
    fn fetch_study(&self) -> Result<StudyMetadata, KiraError> {
        tracing::debug!(path = %self.path, "study.read");
        let bytes = fs::read(self.path.as_std_path())
            .map_err(|_| KiraError::SourceRead(self.path.clone().into_std_path_buf()))?;
        decode_study(&bytes)
    }

    fn describe(&self) -> String {
        self.path.to_string()
    }
}

pub fn source_for(spec: &SourceSpec) -> Result<Box<dyn StudySource>, KiraError> {
    Ok(match spec {
        SourceSpec::Url(url) => Box::new(StudyHttpClient::new(url.clone())?),
        SourceSpec::File(path) => Box::new(StudyFileSource::new(path.clone())),
    })
}

/// Decodes a study document, gunzipping it first when it carries the gzip magic.
pub fn decode_study(bytes: &[u8]) -> Result<StudyMetadata, KiraError> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(bytes);
        let mut raw = Vec::new();
        decoder
            .read_to_end(&mut raw)
            .map_err(|err| KiraError::StudyDecode(err.to_string()))?;
        return serde_json::from_slice(&raw).map_err(|err| KiraError::StudyDecode(err.to_string()));
    }
    serde_json::from_slice(bytes).map_err(|err| KiraError::StudyDecode(err.to_string()))
}

/// A single fetch-and-decode running off the UI thread.
///
/// Dropping the task abandons the result; nothing aborts the request itself.
pub struct LoadTask {
    rx: Receiver<Result<StudyMetadata, KiraError>>,
    finished: bool,
}

impl LoadTask {
    pub fn spawn<S: StudySource + 'static>(source: S) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // The receiver may already be gone if the viewer was torn down.
            let _ = tx.send(source.fetch_study());
        });
        Self {
            rx,
            finished: false,
        }
    }

    /// Returns the outcome once; afterwards always `None`.
    pub fn poll(&mut self) -> Option<Result<StudyMetadata, KiraError>> {
        if self.finished {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.finished = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                Some(Err(KiraError::StudyHttp(
                    "load task exited without a result".to_string(),
                )))
            }
        }
    }

    pub fn wait(&mut self) -> Option<Result<StudyMetadata, KiraError>> {
        if self.finished {
            return None;
        }
        self.finished = true;
        Some(self.rx.recv().unwrap_or_else(|_| {
            Err(KiraError::StudyHttp(
                "load task exited without a result".to_string(),
            ))
        }))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
