use crate::core::error::PlaybackError;
use crate::core::traits::{AudioOutput, OutputSignal};
use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::collections::VecDeque;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// How a source is fetched and what pausing it means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Finite recording, downloaded whole; pause keeps the position
    Clip,
    /// Endless stream; pause drops the connection
    Live,
}

/// Owns the process-wide output stream. Sinks created from it go silent once it drops.
pub struct AudioDevice {
    stream: OutputStream,
}

impl AudioDevice {
    pub fn open() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .context("Could not open the default audio output device")?;
        // Dropping the stream would otherwise print over the restored terminal.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }

    pub fn output(&self, kind: SourceKind, http: Client) -> RodioOutput {
        RodioOutput::new(Sink::connect_new(self.stream.mixer()), kind, http)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputState {
    Idle,
    Loading,
    Playing,
    Paused,
}

struct Loaded {
    source: Decoder<MediaReader>,
    bytes: Option<Arc<[u8]>>,
}

struct LoadResult {
    generation: u64,
    url: String,
    outcome: Result<Loaded, PlaybackError>,
}

/// Rodio sink fed by background loader threads.
///
/// Every play/pause bumps a generation counter; a load that completes under
/// an older generation is reported as `Interrupted` and discarded.
pub struct RodioOutput {
    kind: SourceKind,
    sink: Sink,
    http: Client,
    state: OutputState,
    generation: u64,
    loaded_url: Option<String>,
    clip_cache: Option<(String, Arc<[u8]>)>,
    load_tx: Sender<LoadResult>,
    load_rx: Receiver<LoadResult>,
    signals: VecDeque<OutputSignal>,
}

impl RodioOutput {
    pub fn new(sink: Sink, kind: SourceKind, http: Client) -> Self {
        let (load_tx, load_rx) = unbounded();
        Self {
            kind,
            sink,
            http,
            state: OutputState::Idle,
            generation: 0,
            loaded_url: None,
            clip_cache: None,
            load_tx,
            load_rx,
            signals: VecDeque::new(),
        }
    }

    fn spawn_load(&self, url: String) {
        let generation = self.generation;
        let kind = self.kind;
        let http = self.http.clone();
        let tx = self.load_tx.clone();
        let cached = match (&self.clip_cache, kind) {
            (Some((cached_url, bytes)), SourceKind::Clip) if *cached_url == url => {
                Some(Arc::clone(bytes))
            }
            _ => None,
        };

        std::thread::spawn(move || {
            let outcome = load_source(kind, &http, &url, cached);
            // Receiver only disappears with the output itself.
            let _ = tx.send(LoadResult {
                generation,
                url,
                outcome,
            });
        });
    }

    fn settle_loads(&mut self) {
        while let Ok(result) = self.load_rx.try_recv() {
            if result.generation != self.generation || self.state != OutputState::Loading {
                debug!(url = %result.url, "Discarding superseded audio load");
                self.signals.push_back(OutputSignal::Failed(PlaybackError::Interrupted));
                continue;
            }

            match result.outcome {
                Ok(loaded) => {
                    if let Some(bytes) = loaded.bytes {
                        self.clip_cache = Some((result.url.clone(), bytes));
                    }
                    self.sink.clear();
                    self.sink.append(loaded.source);
                    self.sink.play();
                    self.state = OutputState::Playing;
                    info!(url = %result.url, "Playback started");
                    self.signals.push_back(OutputSignal::Started);
                }
                Err(err) => {
                    self.state = OutputState::Idle;
                    self.signals.push_back(OutputSignal::Failed(err));
                }
            }
        }
    }
}

impl AudioOutput for RodioOutput {
    fn play(&mut self, url: &str, restart: bool) {
        if !restart
            && self.state == OutputState::Paused
            && self.loaded_url.as_deref() == Some(url)
        {
            self.sink.play();
            self.state = OutputState::Playing;
            self.signals.push_back(OutputSignal::Started);
            return;
        }

        self.generation += 1;
        self.sink.clear();
        self.state = OutputState::Loading;
        self.loaded_url = Some(url.to_string());
        self.spawn_load(url.to_string());
    }

    fn pause(&mut self) {
        self.generation += 1;
        match (self.state, self.kind) {
            (OutputState::Playing, SourceKind::Clip) => {
                self.sink.pause();
                self.state = OutputState::Paused;
            }
            (OutputState::Playing, SourceKind::Live) | (OutputState::Loading, _) => {
                self.sink.clear();
                self.state = OutputState::Idle;
            }
            _ => {}
        }
    }

    fn poll_signal(&mut self) -> Option<OutputSignal> {
        self.settle_loads();

        if self.state == OutputState::Playing && self.sink.empty() {
            self.state = OutputState::Idle;
            self.signals.push_back(OutputSignal::Ended);
        }

        self.signals.pop_front()
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_speed(&mut self, speed: f32) {
        self.sink.set_speed(speed);
    }
}

// To avoid leaks
impl Drop for RodioOutput {
    fn drop(&mut self) {
        self.sink.stop();
    }
}

fn load_source(
    kind: SourceKind,
    http: &Client,
    url: &str,
    cached: Option<Arc<[u8]>>,
) -> Result<Loaded, PlaybackError> {
    match kind {
        SourceKind::Clip => {
            let bytes = match cached {
                Some(bytes) => bytes,
                None => fetch_bytes(http, url)?,
            };
            let source = Decoder::new(MediaReader::Clip(Cursor::new(Arc::clone(&bytes))))
                .map_err(|e| decode_error(url, e))?;
            Ok(Loaded {
                source,
                bytes: Some(bytes),
            })
        }
        SourceKind::Live => {
            let response = http
                .get(url)
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|e| fetch_error(url, e))?;
            let source = Decoder::new(MediaReader::Live(LiveStream::new(Box::new(response))))
                .map_err(|e| decode_error(url, e))?;
            Ok(Loaded {
                source,
                bytes: None,
            })
        }
    }
}

fn fetch_bytes(http: &Client, url: &str) -> Result<Arc<[u8]>, PlaybackError> {
    let bytes = http
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| fetch_error(url, e))?;
    Ok(Arc::from(bytes.as_ref()))
}

fn fetch_error(url: &str, err: impl std::fmt::Display) -> PlaybackError {
    PlaybackError::Fetch {
        url: url.to_string(),
        message: err.to_string(),
    }
}

fn decode_error(url: &str, err: impl std::fmt::Display) -> PlaybackError {
    PlaybackError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    }
}

/// Byte source handed to the decoder.
enum MediaReader {
    Clip(Cursor<Arc<[u8]>>),
    Live(LiveStream),
}

impl Read for MediaReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            MediaReader::Clip(c) => c.read(buf),
            MediaReader::Live(s) => s.read(buf),
        }
    }
}

impl Seek for MediaReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            MediaReader::Clip(c) => c.seek(pos),
            MediaReader::Live(s) => s.seek(pos),
        }
    }
}

/// Forward-only network stream. Only position queries succeed as seeks.
struct LiveStream {
    inner: Mutex<Box<dyn Read + Send>>,
    position: u64,
}

impl LiveStream {
    fn new(inner: Box<dyn Read + Send>) -> Self {
        Self {
            inner: Mutex::new(inner),
            position: 0,
        }
    }
}

impl Read for LiveStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        let n = inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for LiveStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Current(0) => Ok(self.position),
            SeekFrom::Start(n) if n == self.position => Ok(n),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "live stream is not seekable",
            )),
        }
    }
}
