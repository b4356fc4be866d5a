use crate::error::{Result, ShortenerError};
use crate::settings::ShortenerSettings;
use crate::shortener::Shortener;
use async_trait::async_trait;
use std::sync::Arc;
use tether_core::{MappingStore, ShortCode, StoreError, TargetUrl, UrlMapping};
use tether_generator::Generator;
use tracing::{debug, error, trace, warn};

/// A concrete implementation of the [`Shortener`] trait.
///
/// Wraps a [`MappingStore`] and a [`Generator`]. The generator only
/// proposes codes: uniqueness is decided by the store's insert, and a
/// collision costs one attempt out of
/// [`max_attempts`](ShortenerSettings::max_attempts).
#[derive(Debug, Clone)]
pub struct ShortenerService<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    settings: ShortenerSettings,
}

impl<S: MappingStore, G: Generator> ShortenerService<S, G> {
    pub fn new(store: S, generator: G) -> Self {
        Self::with_settings(store, generator, ShortenerSettings::default())
    }

    pub fn with_settings(store: S, generator: G, settings: ShortenerSettings) -> Self {
        Self {
            store: Arc::new(store),
            generator: Arc::new(generator),
            settings,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn parse_code(code: &str) -> Result<ShortCode> {
        ShortCode::parse(code).map_err(|e| {
            trace!(code, error = %e, "malformed short code");
            ShortenerError::NotFound(code.to_string())
        })
    }
}

#[async_trait]
impl<S: MappingStore, G: Generator> Shortener for ShortenerService<S, G> {
    async fn create(&self, target_url: &str) -> Result<UrlMapping> {
        let target_url = TargetUrl::parse(target_url)?;
        trace!(url = %target_url, "creating mapping");

        let attempts = self.settings.max_attempts.max(1);
        for attempt in 1..=attempts {
            let code = self.generator.generate().map_err(|e| {
                error!(error = %e, "code generator failed");
                ShortenerError::from(e)
            })?;

            match self.store.insert(&code, &target_url).await {
                Ok(mapping) => {
                    debug!(code = %code, attempt, "created mapping");
                    return Ok(mapping);
                }
                Err(StoreError::DuplicateCode(_)) => {
                    warn!(code = %code, attempt, "short code collision, drawing another");
                }
                Err(e) => return Err(e.into()),
            }
        }

        error!(attempts, "short code generation exhausted");
        Err(ShortenerError::GenerationExhausted { attempts })
    }

    async fn update(&self, code: &str, target_url: &str) -> Result<UrlMapping> {
        let code = Self::parse_code(code)?;
        let target_url = TargetUrl::parse(target_url)?;

        let current = self.store.get_by_code(&code).await?;
        let updated = self
            .store
            .update(&code, &target_url, current.version)
            .await
            .inspect_err(|e| debug!(code = %code, error = %e, "update rejected"))?;

        debug!(code = %code, version = updated.version, "updated mapping");
        Ok(updated)
    }

    async fn delete(&self, code: &str) -> Result<()> {
        let code = Self::parse_code(code)?;

        let current = self.store.get_by_code(&code).await?;
        self.store
            .soft_delete(&code, current.version)
            .await
            .inspect_err(|e| debug!(code = %code, error = %e, "delete rejected"))?;

        debug!(code = %code, "deleted mapping");
        Ok(())
    }

    async fn get(&self, code: &str) -> Result<UrlMapping> {
        let code = Self::parse_code(code)?;
        Ok(self.store.get_by_code(&code).await?)
    }
}
