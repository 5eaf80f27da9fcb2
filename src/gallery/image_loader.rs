//! URL-keyed image cache with request coalescing.

use super::CommonEffectQueue;
use crate::core::Mapping;
use crate::effects::{Effect, HttpClient, HttpRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageLoaderInput {
    RequestImage { url: String },
    CacheImage { url: String, image: Vec<u8> },
    FailedToLoad { url: String },
    CancelRequest { url: String },
    RemoveImage { url: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLoaderState {
    pub images: BTreeMap<String, Vec<u8>>,
    pub is_requesting: BTreeMap<String, bool>,
}

impl ImageLoaderState {
    pub fn is_requesting(&self, url: &str) -> bool {
        self.is_requesting.get(url).copied().unwrap_or(false)
    }
}

/// One identity per URL, so a single download can be cancelled.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageLoaderEffectId {
    pub url: String,
}

pub type ImageLoaderWorld = Arc<dyn HttpClient>;

fn fetch(url: String) -> Effect<ImageLoaderInput, CommonEffectQueue, ImageLoaderEffectId, ImageLoaderWorld> {
    let id = ImageLoaderEffectId { url: url.clone() };
    Effect::future(move |http: ImageLoaderWorld| async move {
        let response = http
            .send(HttpRequest::get(url.clone()))
            .await
            .and_then(|response| response.error_for_status());
        match response {
            Ok(response) => ImageLoaderInput::CacheImage {
                url,
                image: response.body,
            },
            Err(error) => {
                warn!(%url, %error, "image download failed");
                ImageLoaderInput::FailedToLoad { url }
            }
        }
    })
    .with_id(id)
}

/// Requests for a cached URL, or one already in flight, are unhandled.
pub fn mapping(
) -> Mapping<ImageLoaderInput, ImageLoaderState, CommonEffectQueue, ImageLoaderEffectId, ImageLoaderWorld>
{
    Mapping::inout(|input, state: &mut ImageLoaderState| match input {
        ImageLoaderInput::RequestImage { url } => {
            if state.images.contains_key(url) || state.is_requesting(url) {
                return None;
            }
            state.is_requesting.insert(url.clone(), true);
            Some(fetch(url.clone()))
        }
        ImageLoaderInput::CacheImage { url, image } => {
            state.is_requesting.insert(url.clone(), false);
            state.images.insert(url.clone(), image.clone());
            Some(Effect::empty())
        }
        ImageLoaderInput::FailedToLoad { url } => {
            state.is_requesting.insert(url.clone(), false);
            Some(Effect::empty())
        }
        ImageLoaderInput::CancelRequest { url } => {
            state.is_requesting.insert(url.clone(), false);
            Some(Effect::cancel(ImageLoaderEffectId { url: url.clone() }))
        }
        ImageLoaderInput::RemoveImage { url } => {
            state.images.remove(url);
            Some(Effect::empty())
        }
    })
}
