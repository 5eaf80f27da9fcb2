//! Debounced repository search with avatar loading.

use super::image_loader::{self, ImageLoaderEffectId, ImageLoaderInput, ImageLoaderState};
use super::CommonEffectQueue;
use crate::core::{Mapping, MatchPolicy};
use crate::effects::{Effect, HttpClient, HttpRequest, Scheduler};
use crate::{lens, prism};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitHubConfig {
    /// Quiet period before a search is sent. Typing again within it
    /// supersedes the pending search.
    pub debounce: Duration,
    pub endpoint: String,
    /// Avatar downloads allowed in flight at once.
    pub max_concurrent_avatars: usize,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            endpoint: "https://api.github.com/search/repositories".to_string(),
            max_concurrent_avatars: 4,
        }
    }
}

#[derive(Clone)]
pub struct GitHubWorld {
    pub http: Arc<dyn HttpClient>,
    pub scheduler: Arc<dyn Scheduler>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub full_name: String,
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub html_url: String,
    pub owner: Owner,
}

/// Search results, or the error body GitHub sends when rate limited.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Items { items: Vec<Repository> },
    Error { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitHubInput {
    OnAppear,
    UpdateSearchText(String),
    UpdateItems(Vec<Repository>),
    ShowError { message: String },
    TapRow(usize),
    Dismiss,
    DismissError,
    ImageLoader(ImageLoaderInput),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubState {
    pub search_text: String,
    pub selected_index: Option<usize>,
    pub error_message: Option<String>,
    is_loading: bool,
    items: Vec<Repository>,
    pub image_loader: ImageLoaderState,
}

impl Default for GitHubState {
    fn default() -> Self {
        Self {
            search_text: "rust".to_string(),
            selected_index: None,
            error_message: None,
            is_loading: false,
            items: Vec::new(),
            image_loader: ImageLoaderState::default(),
        }
    }
}

impl GitHubState {
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn items(&self) -> &[Repository] {
        &self.items
    }

    pub fn selected_web_url(&self) -> Option<&str> {
        self.selected_index
            .and_then(|index| self.items.get(index))
            .map(|repository| repository.html_url.as_str())
    }
}

type GitHubEffect = Effect<GitHubInput, CommonEffectQueue, ImageLoaderEffectId, GitHubWorld>;

fn decode(body: &[u8]) -> GitHubInput {
    match serde_json::from_slice::<SearchResponse>(body) {
        Ok(SearchResponse::Items { items }) => GitHubInput::UpdateItems(items),
        Ok(SearchResponse::Error { message }) => GitHubInput::ShowError { message },
        Err(error) => GitHubInput::ShowError {
            message: error.to_string(),
        },
    }
}

fn search(text: &str, config: &GitHubConfig) -> GitHubEffect {
    if text.is_empty() {
        return Effect::just(GitHubInput::UpdateItems(Vec::new())).on(CommonEffectQueue::Request);
    }

    let request = HttpRequest::get(config.endpoint.clone())
        .query("q", text)
        .header("Accept", "application/json");
    let debounce = config.debounce;

    Effect::future(move |world: GitHubWorld| async move {
        world.scheduler.sleep(debounce).await;
        debug!(query = ?request.query, "searching repositories");
        match world.http.send(request).await {
            Ok(response) => decode(&response.body),
            Err(error) => GitHubInput::ShowError {
                message: error.to_string(),
            },
        }
    })
    .on(CommonEffectQueue::Request)
}

fn search_mapping(
    config: GitHubConfig,
) -> Mapping<GitHubInput, GitHubState, CommonEffectQueue, ImageLoaderEffectId, GitHubWorld> {
    Mapping::inout(move |input, state: &mut GitHubState| match input {
        GitHubInput::OnAppear => {
            state.is_loading = true;
            Some(search(&state.search_text, &config))
        }
        GitHubInput::UpdateSearchText(text) => {
            state.search_text = text.clone();
            state.is_loading = !text.is_empty();
            Some(search(text, &config))
        }
        GitHubInput::UpdateItems(items) => {
            state.items = items.clone();
            state.is_loading = false;
            state.error_message = None;
            if items.is_empty() {
                return Some(Effect::empty());
            }
            Some(Effect::sequence(items.iter().map(|repository| {
                GitHubInput::ImageLoader(ImageLoaderInput::RequestImage {
                    url: repository.owner.avatar_url.clone(),
                })
            })))
        }
        GitHubInput::ShowError { message } => {
            state.is_loading = false;
            state.error_message = Some(message.clone());
            Some(Effect::empty())
        }
        GitHubInput::TapRow(index) => {
            if *index >= state.items.len() {
                return None;
            }
            state.selected_index = Some(*index);
            Some(Effect::empty())
        }
        GitHubInput::Dismiss => {
            state.selected_index = None;
            Some(Effect::empty())
        }
        GitHubInput::DismissError => {
            state.error_message.take()?;
            Some(Effect::empty())
        }
        GitHubInput::ImageLoader(_) => None,
    })
}

pub fn mapping(
    config: GitHubConfig,
) -> Mapping<GitHubInput, GitHubState, CommonEffectQueue, ImageLoaderEffectId, GitHubWorld> {
    let download = CommonEffectQueue::Download {
        max_concurrent: config.max_concurrent_avatars,
    };
    Mapping::reduce(
        MatchPolicy::First,
        [
            search_mapping(config),
            image_loader::mapping()
                .map_queue(move |queue| match queue {
                    CommonEffectQueue::Default => download,
                    other => other,
                })
                .contramap_world(|world: &GitHubWorld| Arc::clone(&world.http))
                .transform(
                    prism!(GitHubInput::ImageLoader),
                    lens!(GitHubState, image_loader),
                ),
        ],
    )
}
