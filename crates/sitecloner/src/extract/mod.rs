//! Asset discovery in HTML documents and stylesheets
//!
//! Both extractors share one [`AssetCollector`] so that every reference goes
//! through the same resolve, classify and dedupe steps.

pub mod css;
pub mod html;

use crate::classify::{classify, SourceTag};
use crate::resolve::resolve;
use crate::types::AssetReference;
use std::collections::HashSet;
use url::Url;

/// Accumulates resolved references, first occurrence wins
#[derive(Debug, Default)]
pub(crate) struct AssetCollector {
    seen: HashSet<String>,
    assets: Vec<AssetReference>,
}

impl AssetCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resolve and record a reference; non-web references are dropped
    pub(crate) fn push(&mut self, base: &Url, reference: &str, tag: SourceTag) {
        let Some(url) = resolve(base, reference).into_url() else {
            return;
        };
        let category = classify(&url, &tag);
        let url = String::from(url);
        if self.seen.insert(url.clone()) {
            self.assets.push(AssetReference {
                url,
                category,
                source_tag: tag,
            });
        }
    }

    pub(crate) fn into_assets(self) -> Vec<AssetReference> {
        self.assets
    }
}
