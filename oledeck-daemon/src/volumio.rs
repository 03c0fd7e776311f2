//! Volumio REST client and its worker threads
//!
//! Requests block, so they never run on the executor. Each worker thread
//! owns a client, takes [`Request`]s from a bounded crossbeam channel and
//! hands every outcome to a reply sink. Two workers run side by side: one
//! for state, queue and playlist lookups, one for commands, so a slow
//! command never delays a state poll.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, info, trace, warn};
use oledeck_protocol::{
    parse_playlists, parse_queue_format, parse_state, AudioFormat, PlayerCommand, PlayerSnapshot,
    PlaylistList, ProtocolError,
};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;

use crate::error::DaemonError;

/// Requests waiting per worker
const REQUEST_CHANNEL_CAP: usize = 4;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("player answered {0}")]
    Status(StatusCode),

    #[error("undecodable response: {0:?}")]
    Decode(ProtocolError),
}

/// Operations the panel needs from the player
pub trait PlayerApi {
    fn state(&self) -> Result<PlayerSnapshot, ClientError>;
    fn queue_format(&self) -> Result<Option<AudioFormat>, ClientError>;
    fn playlists(&self) -> Result<PlaylistList, ClientError>;
    fn command(&self, command: &PlayerCommand) -> Result<(), ClientError>;
}

pub struct VolumioClient {
    http: Client,
    base_url: String,
}

impl VolumioClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("oledeck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, ClientError> {
        let response = self.http.get(self.url(path)).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        Ok(response.bytes()?.to_vec())
    }
}

impl PlayerApi for VolumioClient {
    fn state(&self) -> Result<PlayerSnapshot, ClientError> {
        let body = self.get("getState", &[])?;
        parse_state(&body).map_err(ClientError::Decode)
    }

    fn queue_format(&self) -> Result<Option<AudioFormat>, ClientError> {
        let body = self.get("getQueue", &[])?;
        parse_queue_format(&body).map_err(ClientError::Decode)
    }

    fn playlists(&self) -> Result<PlaylistList, ClientError> {
        let body = self.get("browse", &[("uri", "playlists")])?;
        Ok(parse_playlists(&body))
    }

    fn command(&self, command: &PlayerCommand) -> Result<(), ClientError> {
        let query = command.query();
        self.get("commands/", query.as_slice()).map(|_| ())
    }
}

/// Work for a player worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    State,
    Queue,
    Playlists,
    Command(PlayerCommand),
}

/// Outcome of one [`Request`]; `None`/`false` when it failed
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    State(Option<PlayerSnapshot>),
    Queue(Option<AudioFormat>),
    Playlists(Option<PlaylistList>),
    Command(bool),
}

/// Run requests until every sender is gone
pub fn serve<A: PlayerApi>(api: &A, requests: &Receiver<Request>, mut reply: impl FnMut(Reply)) {
    for request in requests.iter() {
        trace!("player request {:?}", request);
        let outcome = match request {
            Request::State => Reply::State(api.state().map_err(|e| log_failure("state", e)).ok()),
            Request::Queue => Reply::Queue(
                api.queue_format()
                    .map_err(|e| log_failure("queue", e))
                    .ok()
                    .flatten(),
            ),
            Request::Playlists => Reply::Playlists(
                api.playlists()
                    .map_err(|e| log_failure("playlists", e))
                    .ok(),
            ),
            Request::Command(command) => {
                debug!("player command {}", command.name());
                Reply::Command(
                    api.command(&command)
                        .map_err(|e| log_failure(command.name(), e))
                        .is_ok(),
                )
            }
        };
        reply(outcome);
    }
    debug!("player worker exiting");
}

fn log_failure(what: &str, error: ClientError) {
    warn!("{} request failed: {}", what, error);
}

/// Start a worker thread; requests go through the returned sender
pub fn spawn_worker<A, F>(name: &str, api: A, reply: F) -> Result<Sender<Request>, DaemonError>
where
    A: PlayerApi + Send + 'static,
    F: FnMut(Reply) + Send + 'static,
{
    let (tx, rx) = bounded::<Request>(REQUEST_CHANNEL_CAP);
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || serve(&api, &rx, reply))
        .map_err(|source| DaemonError::Thread {
            name: name.to_string(),
            source,
        })?;
    info!("{} worker started", name);
    Ok(tx)
}
