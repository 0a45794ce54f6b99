//! Request plumbing between a session and the remote rules/AI engine.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use shared::domain::GameKind;
use url::Url;

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    NewGame,
    LoadGame,
    HumanMove,
    AiMove,
}

impl RequestKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::NewGame => "new_game",
            Self::LoadGame => "load_game",
            Self::HumanMove => "human_move",
            Self::AiMove => "ai_move",
        }
    }

    /// New and loaded games establish the side the user plays.
    pub fn starts_game(self) -> bool {
        matches!(self, Self::NewGame | Self::LoadGame)
    }

    fn endpoint(self) -> &'static str {
        match self {
            Self::NewGame => "newGame",
            Self::LoadGame => "loadGame",
            Self::HumanMove => "makeMove",
            Self::AiMove => "makeMoveAi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One request to the engine. A request without a body is sent as GET.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    pub kind: RequestKind,
    pub game: GameKind,
    pub body: Option<serde_json::Value>,
}

impl EngineRequest {
    pub fn post<B: Serialize>(
        game: GameKind,
        kind: RequestKind,
        body: &B,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind,
            game,
            body: Some(serde_json::to_value(body)?),
        })
    }

    pub fn get(game: GameKind, kind: RequestKind) -> Self {
        Self {
            kind,
            game,
            body: None,
        }
    }

    pub fn method(&self) -> Method {
        if self.body.is_some() {
            Method::Post
        } else {
            Method::Get
        }
    }

    /// Route relative to the engine base url, e.g. `chess/makeMove`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.game.route_prefix(), self.kind.endpoint())
    }
}

#[async_trait]
pub trait GameTransport: Send + Sync {
    async fn send(&self, request: &EngineRequest) -> Result<serde_json::Value, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, TransportError> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl GameTransport for HttpTransport {
    async fn send(&self, request: &EngineRequest) -> Result<serde_json::Value, TransportError> {
        let url = self.base_url.join(&request.path())?;
        let builder = match &request.body {
            Some(body) => self.http.post(url).json(body),
            None => self.http.get(url),
        };
        let res = builder.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        Ok(res.json().await?)
    }
}
