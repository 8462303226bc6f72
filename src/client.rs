use std::sync::RwLock;

use anyhow::{Result, anyhow};
use serde::de::DeserializeOwned;
use serde_json::json;
use ureq::{Agent, Response};
use urlencoding::encode;

use crate::config::Config;
use crate::intent::RecommendationParams;
use crate::models::{
    Artist, AudioFeatures, AudioFeaturesResponse, CreatedPlaylist, GenreSeedsResponse, Paging,
    PlayHistory, RecommendationsResponse, SearchKind, SearchResponse, SearchResults, TimeRange,
    TokenResponse, Track, UserProfile,
};
use crate::provider::{AUDIO_FEATURES_BATCH_SIZE, MusicProvider};

const MAX_SEARCH_LIMIT: u32 = 50;
/// Search rejects pages reaching past this many results
const MAX_SEARCH_OFFSET: u32 = 1000;
const ADD_TRACKS_BATCH_SIZE: usize = 100;

#[derive(Debug)]
struct Tokens {
    access: String,
    refresh: Option<String>,
}

/// A blocking Web API client authenticated with a bearer token
pub struct SpotifyClient {
    agent: Agent,
    api_base_url: String,
    accounts_url: String,
    client_id: Option<String>,
    tokens: RwLock<Tokens>,
}

impl SpotifyClient {
    pub fn new(config: Config) -> Self {
        SpotifyClient {
            agent: Agent::new(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            accounts_url: config.accounts_url.trim_end_matches('/').to_string(),
            client_id: config.client_id,
            tokens: RwLock::new(Tokens {
                access: config.access_token,
                refresh: config.refresh_token,
            }),
        }
    }

    fn access_token(&self) -> Result<String> {
        let tokens = self
            .tokens
            .read()
            .map_err(|_| anyhow!("token store poisoned"))?;
        Ok(tokens.access.clone())
    }

    fn can_refresh(&self) -> bool {
        let has_refresh_token = self
            .tokens
            .read()
            .map(|tokens| tokens.refresh.is_some())
            .unwrap_or(false);
        has_refresh_token && self.client_id.is_some()
    }

    /// Exchange the refresh token for a new access token and store it
    fn refresh_access_token(&self) -> Result<String> {
        let refresh_token = self
            .tokens
            .read()
            .map_err(|_| anyhow!("token store poisoned"))?
            .refresh
            .clone()
            .ok_or_else(|| anyhow!("no refresh token configured"))?;
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| anyhow!("no client id configured"))?;

        let url = format!("{}/api/token", self.accounts_url);
        let response: TokenResponse = self
            .agent
            .post(&url)
            .send_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", client_id),
            ])
            .map_err(|e| request_error("token refresh", e))?
            .into_json()?;

        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| anyhow!("token store poisoned"))?;
        tokens.access = response.access_token.clone();
        if let Some(rotated) = response.refresh_token {
            tokens.refresh = Some(rotated);
        }
        log::info!("access token refreshed");
        Ok(response.access_token)
    }

    /// Run a request with the current token, refreshing and retrying once on 401
    fn send<F>(&self, what: &str, request: F) -> Result<Response>
    where
        F: Fn(&str) -> Result<Response, ureq::Error>,
    {
        let token = self.access_token()?;
        match request(&token) {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(401, _)) if self.can_refresh() => {
                log::warn!("{what}: access token rejected, refreshing");
                let token = self.refresh_access_token()?;
                request(&token).map_err(|e| request_error(what, e))
            }
            Err(e) => Err(request_error(what, e)),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = build_url(&self.api_base_url, path, query);
        log::debug!("GET {url}");
        let response = self.send(path, |token| {
            self.agent
                .get(&url)
                .set("Authorization", &format!("Bearer {token}"))
                .call()
        })?;
        Ok(response.into_json()?)
    }

    fn post_json(&self, path: &str, body: serde_json::Value) -> Result<Response> {
        let url = build_url(&self.api_base_url, path, &[]);
        log::debug!("POST {url}");
        self.send(path, |token| {
            self.agent
                .post(&url)
                .set("Authorization", &format!("Bearer {token}"))
                .send_json(body.clone())
        })
    }

    fn search_page(&self, query: &str, kind: SearchKind, limit: u32, offset: u32) -> Result<SearchResults> {
        let response: SearchResponse = self.get_json(
            "/search",
            &[
                ("q", query.to_string()),
                ("type", kind.as_str().to_string()),
                ("limit", limit.clamp(1, MAX_SEARCH_LIMIT).to_string()),
                ("offset", offset.to_string()),
            ],
        )?;

        Ok(SearchResults {
            artists: response.artists.map(|page| page.items).unwrap_or_default(),
            tracks: response.tracks.map(|page| page.items).unwrap_or_default(),
        })
    }
}

impl MusicProvider for SpotifyClient {
    fn top_tracks(&self, range: TimeRange, limit: u32) -> Result<Vec<Track>> {
        let page: Paging<Track> = self.get_json(
            "/me/top/tracks",
            &[
                ("time_range", range.as_str().to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        Ok(page.items)
    }

    fn top_artists(&self, range: TimeRange, limit: u32) -> Result<Vec<Artist>> {
        let page: Paging<Artist> = self.get_json(
            "/me/top/artists",
            &[
                ("time_range", range.as_str().to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        Ok(page.items)
    }

    fn recently_played(&self, limit: u32) -> Result<Vec<PlayHistory>> {
        let page: Paging<PlayHistory> = self.get_json(
            "/me/player/recently-played",
            &[("limit", limit.to_string())],
        )?;
        Ok(page.items)
    }

    fn audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>> {
        let mut features = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(AUDIO_FEATURES_BATCH_SIZE) {
            let response: AudioFeaturesResponse =
                self.get_json("/audio-features", &[("ids", chunk.join(","))])?;
            features.extend(response.audio_features);
        }
        Ok(features)
    }

    fn search(&self, query: &str, kind: SearchKind, limit: u32) -> Result<SearchResults> {
        self.search_page(query, kind, limit, 0)
    }

    fn recommendations(&self, params: &RecommendationParams) -> Result<Vec<Track>> {
        let response: RecommendationsResponse =
            self.get_json("/recommendations", &params.query_pairs())?;
        Ok(response.tracks)
    }

    fn available_genre_seeds(&self) -> Result<Vec<String>> {
        let response: GenreSeedsResponse =
            self.get_json("/recommendations/available-genre-seeds", &[])?;
        Ok(response.genres)
    }

    fn tracks_by_year(&self, year: u32, limit: u32) -> Result<Vec<Track>> {
        let query = format!("year:{year}");
        let mut tracks = Vec::new();

        while let Some(page_size) = next_page_size(tracks.len() as u32, limit) {
            let page = self
                .search_page(&query, SearchKind::Track, page_size, tracks.len() as u32)?
                .tracks;
            let exhausted = (page.len() as u32) < page_size;
            tracks.extend(page);
            if exhausted {
                break;
            }
        }
        Ok(tracks)
    }

    fn current_user_id(&self) -> Result<String> {
        let user: UserProfile = self.get_json("/me", &[])?;
        Ok(user.id)
    }

    fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist> {
        let path = format!("/users/{}/playlists", encode(owner_id));
        let response = self.post_json(
            &path,
            json!({
                "name": name,
                "description": description,
                "public": public,
            }),
        )?;
        Ok(response.into_json()?)
    }

    fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let path = format!("/playlists/{}/tracks", encode(playlist_id));
        for batch in uris.chunks(ADD_TRACKS_BATCH_SIZE) {
            self.post_json(&path, json!({ "uris": batch }))?;
            log::debug!("added {} tracks to {playlist_id}", batch.len());
        }
        Ok(())
    }
}

/// Size of the next search page, `None` once `limit` or the offset ceiling is reached
fn next_page_size(offset: u32, limit: u32) -> Option<u32> {
    let reachable = limit.min(MAX_SEARCH_OFFSET);
    (offset < reachable).then(|| (reachable - offset).min(MAX_SEARCH_LIMIT))
}

fn build_url(base: &str, path: &str, query: &[(&str, String)]) -> String {
    let mut url = format!("{base}{path}");
    for (i, (key, value)) in query.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(key);
        url.push('=');
        url.push_str(&encode(value));
    }
    url
}

/// Status errors keep the response body, which usually explains the failure
fn request_error(what: &str, error: ureq::Error) -> anyhow::Error {
    match error {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            anyhow!("{what} failed with HTTP {code}: {body}")
        }
        ureq::Error::Transport(transport) => anyhow!("{what} failed: {transport}"),
    }
}
