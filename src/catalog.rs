//! Read-only views of server-rendered data: transcripts, players, notes

use crate::api::{ApiClient, PlayerDetails, Player, Transcript};
use crate::error::Result;
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::info;

pub struct Catalog {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
}

impl Catalog {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self { api, store }
    }

    pub async fn transcripts(&self) -> Result<Vec<Transcript>> {
        let user_id = self.store.user_id().await?;
        let transcripts = self.api.list_transcripts(&user_id).await?;
        info!("Fetched {} transcripts", transcripts.len());
        Ok(transcripts)
    }

    pub async fn transcript(&self, transcript_id: &str) -> Result<Transcript> {
        let user_id = self.store.user_id().await?;
        self.api.get_transcript(&user_id, transcript_id).await
    }

    pub async fn players(&self) -> Result<Vec<Player>> {
        let user_id = self.store.user_id().await?;
        let players = self.api.list_players(&user_id).await?;
        info!("Fetched {} players", players.len());
        Ok(players)
    }

    pub async fn hands_notes(&self, player_id: &str) -> Result<PlayerDetails> {
        self.api.player_hands_notes(player_id).await
    }

    /// Run server-side analysis, then return the refreshed hands and notes
    pub async fn analyze(&self, player_id: &str) -> Result<PlayerDetails> {
        self.api.analyze_player(player_id).await?;
        self.hands_notes(player_id).await
    }
}
