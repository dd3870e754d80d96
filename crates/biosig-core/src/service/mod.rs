//! Client for the external prediction and generation services
//!
//! The HTTP layer is injected through [`Transport`]; this module builds the
//! requests, bounds every call with a timeout, decodes the typed replies and
//! drops superseded responses. Each endpoint keeps its own
//! [`RequestTracker`], so a slow reply to an old request can never overwrite
//! the result of a newer one: it comes back as [`Reply::Stale`].
//!
//! The client never retries. Callers decide what to do with a
//! [`BiosigError::Transport`] or [`BiosigError::Timeout`].

pub mod tracker;
pub mod types;

pub use tracker::{Reply, RequestTracker, Ticket};
pub use types::{
    condition_name, DopplerPlotData, DroneClassification, EcgPrediction, EegUpload,
    RemoteDopplerStats, SarImage,
};

use crate::config::ServiceConfig;
use crate::doppler::DopplerParams;
use crate::ingest::{parse_recording_with, IngestOptions, MatrixLayout};
use crate::recording::Recording;
use crate::wav::{self, DecodedWav};
use crate::{BiosigError, Result};
use log::debug;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use types::{ensure_success, EcgEnvelope};

/// Sampling rate assumed for EEG documents that omit `samplingRate`.
pub const EEG_FALLBACK_SAMPLING_RATE: u32 = 256;

// ============================================================================
// Transport seam
// ============================================================================

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body
    Empty,
    /// JSON document
    Json(serde_json::Value),
    /// Single-file multipart upload
    File {
        /// Form field name
        field: String,
        /// Uploaded file name
        file_name: String,
        /// File contents
        bytes: Vec<u8>,
    },
}

/// Fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL without query string
    pub url: String,
    /// Query parameters in order
    pub query: Vec<(String, String)>,
    /// Payload
    pub body: RequestBody,
}

impl ServiceRequest {
    fn get(url: String) -> Self {
        Self {
            method: Method::Get,
            url,
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    fn post(url: String, body: RequestBody) -> Self {
        Self {
            method: Method::Post,
            url,
            query: Vec::new(),
            body,
        }
    }

    fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Raw transport reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl ServiceResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests over whatever HTTP stack the host provides.
///
/// Connection failures are reported as [`BiosigError::Transport`] with no
/// status. Non-2xx replies are returned as responses, not errors.
pub trait Transport: Send + Sync {
    /// Perform one request.
    fn send(&self, request: ServiceRequest) -> impl Future<Output = Result<ServiceResponse>> + Send;
}

// ============================================================================
// Endpoints
// ============================================================================

/// Service endpoints, each with its own request tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /ecg/predict`
    EcgPredict,
    /// `POST /predictDrone`
    DroneClassify,
    /// `POST /eeg/preprocess-edf`
    EegPreprocess,
    /// `GET <access_url>`
    EegData,
    /// `GET /image`
    SarImage,
    /// `GET /doppler`
    DopplerPlot,
    /// `GET /doppler/audio`
    DopplerAudio,
}

impl Endpoint {
    const COUNT: usize = 7;

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::EcgPredict => "ecg/predict",
            Endpoint::DroneClassify => "predictDrone",
            Endpoint::EegPreprocess => "eeg/preprocess-edf",
            Endpoint::EegData => "eeg data",
            Endpoint::SarImage => "image",
            Endpoint::DopplerPlot => "doppler",
            Endpoint::DopplerAudio => "doppler/audio",
        })
    }
}

// ============================================================================
// Client
// ============================================================================

/// Typed client over an injected [`Transport`].
pub struct ServiceClient<T> {
    transport: T,
    base_url: String,
    timeout: Duration,
    trackers: [RequestTracker; Endpoint::COUNT],
}

impl<T: Transport> ServiceClient<T> {
    /// Client for `base_url` (e.g. `http://127.0.0.1:8000/api`).
    pub fn new(transport: T, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            trackers: std::array::from_fn(|_| RequestTracker::new()),
        }
    }

    /// Client configured from a [`ServiceConfig`].
    pub fn from_config(transport: T, config: &ServiceConfig) -> Self {
        Self::new(transport, config.base_url.clone(), config.timeout())
    }

    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Tracker for an endpoint.
    pub fn tracker(&self, endpoint: Endpoint) -> &RequestTracker {
        &self.trackers[endpoint.index()]
    }

    /// Run ECG prediction for a record stored on the server.
    pub async fn predict_ecg(&self, json_path: &str) -> Result<Reply<EcgPrediction>> {
        let body = RequestBody::Json(serde_json::json!({ "json_path": json_path }));
        let request = ServiceRequest::post(self.url("ecg/predict"), body);
        self.call(Endpoint::EcgPredict, request, |bytes| {
            let envelope: EcgEnvelope = decode_json(bytes)?;
            ensure_success(envelope.status.as_deref(), envelope.message.as_deref())?;
            envelope
                .data
                .ok_or_else(|| BiosigError::Decode("prediction reply has no data".into()))
        })
        .await
    }

    /// Classify a drone audio clip.
    pub async fn classify_drone(
        &self,
        file_name: &str,
        audio: Vec<u8>,
    ) -> Result<Reply<DroneClassification>> {
        let request = ServiceRequest::post(self.url("predictDrone"), upload("audio", file_name, audio));
        self.call(Endpoint::DroneClassify, request, |bytes| {
            let reply: DroneClassification = decode_json(bytes)?;
            ensure_success(reply.status.as_deref(), None)?;
            Ok(reply)
        })
        .await
    }

    /// Upload an EDF file for preprocessing.
    pub async fn preprocess_eeg(&self, file_name: &str, edf: Vec<u8>) -> Result<Reply<EegUpload>> {
        let request = ServiceRequest::post(self.url("eeg/preprocess-edf"), upload("file", file_name, edf));
        self.call(Endpoint::EegPreprocess, request, decode_json).await
    }

    /// Fetch preprocessed EEG data as a recording.
    ///
    /// The document is channel-major; a missing sampling rate falls back to
    /// [`EEG_FALLBACK_SAMPLING_RATE`].
    pub async fn fetch_eeg_data(&self, access_url: &str) -> Result<Reply<Recording>> {
        let request = ServiceRequest::get(self.url(access_url));
        self.call(Endpoint::EegData, request, |bytes| {
            let options = IngestOptions::default()
                .layout(MatrixLayout::ChannelMajor)
                .fallback_sampling_rate(EEG_FALLBACK_SAMPLING_RATE);
            parse_recording_with(bytes, options).map_err(|e| match e {
                BiosigError::Validation(msg) => BiosigError::Decode(msg),
                other => other,
            })
        })
        .await
    }

    /// Request a generated SAR image.
    pub async fn fetch_sar_image(&self) -> Result<Reply<SarImage>> {
        let request = ServiceRequest::get(self.url("image"));
        self.call(Endpoint::SarImage, request, |bytes| {
            let reply: SarImage = decode_json(bytes)?;
            ensure_success(reply.status.as_deref(), reply.message.as_deref())?;
            Ok(reply)
        })
        .await
    }

    /// Fetch remotely synthesized Doppler plot data.
    pub async fn doppler_plot(&self, params: &DopplerParams) -> Result<Reply<DopplerPlotData>> {
        params.validate()?;
        let request = doppler_query(ServiceRequest::get(self.url("doppler")), params);
        self.call(Endpoint::DopplerPlot, request, decode_json).await
    }

    /// Fetch and decode remotely synthesized Doppler audio.
    pub async fn doppler_audio(&self, params: &DopplerParams) -> Result<Reply<DecodedWav>> {
        params.validate()?;
        let request = doppler_query(ServiceRequest::get(self.url("doppler/audio")), params);
        self.call(Endpoint::DopplerAudio, request, wav::decode).await
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    async fn call<R>(
        &self,
        endpoint: Endpoint,
        request: ServiceRequest,
        parse: impl FnOnce(&[u8]) -> Result<R>,
    ) -> Result<Reply<R>> {
        let tracker = self.tracker(endpoint);
        let ticket = tracker.issue();
        debug!("{endpoint}: {:?} {}", request.method, request.url);

        let outcome = tokio::time::timeout(self.timeout, self.transport.send(request)).await;

        if !tracker.is_current(ticket) {
            debug!("{endpoint}: discarding superseded reply");
            return Ok(Reply::Stale);
        }

        let response = outcome.map_err(|_| BiosigError::Timeout(self.timeout))??;
        if !response.is_success() {
            return Err(BiosigError::Transport {
                status: Some(response.status),
                message: body_excerpt(&response.body),
            });
        }
        parse(&response.body).map(Reply::Fresh)
    }
}

fn upload(field: &str, file_name: &str, bytes: Vec<u8>) -> RequestBody {
    RequestBody::File {
        field: field.to_string(),
        file_name: file_name.to_string(),
        bytes,
    }
}

fn doppler_query(request: ServiceRequest, params: &DopplerParams) -> ServiceRequest {
    request
        .query("frequency", params.frequency_hz)
        .query("velocity", params.velocity_mps)
        .query("duration", params.duration_secs)
}

fn decode_json<R: DeserializeOwned>(bytes: &[u8]) -> Result<R> {
    serde_json::from_slice(bytes).map_err(|e| BiosigError::Decode(format!("malformed reply: {e}")))
}

fn body_excerpt(body: &[u8]) -> String {
    const LIMIT: usize = 200;
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return "request failed".to_string();
    }
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
