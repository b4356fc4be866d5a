use crate::shortcode::ShortCode;
use crate::target_url::TargetUrl;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Version assigned to a freshly inserted mapping.
pub const INITIAL_VERSION: u64 = 1;

/// A persisted short code to target URL mapping.
///
/// Mappings are never hard-deleted by the engine. Deleting one sets
/// `deleted_at`, leaving a tombstone that keeps the code from being reused
/// and lets readers tell "gone" apart from "never existed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMapping {
    /// Store-assigned surrogate key. Internal ordering anchor only.
    #[serde(skip)]
    pub id: i64,
    pub short_code: ShortCode,
    pub target_url: TargetUrl,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Bumped on every mutation; compared on update and delete.
    pub version: u64,
    pub deleted_at: Option<Timestamp>,
}

impl UrlMapping {
    /// Builds the record for a fresh insert.
    pub fn new(id: i64, short_code: ShortCode, target_url: TargetUrl, now: Timestamp) -> Self {
        Self {
            id,
            short_code,
            target_url,
            created_at: now,
            updated_at: now,
            version: INITIAL_VERSION,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Applies a target change, bumping `version` and `updated_at`.
    ///
    /// `updated_at` never moves behind `created_at`, even if the clock steps back.
    pub fn retarget(&mut self, target_url: TargetUrl, now: Timestamp) {
        self.target_url = target_url;
        self.touch(now);
    }

    /// Tombstones the mapping, bumping `version` and `updated_at`.
    pub fn tombstone(&mut self, now: Timestamp) {
        let now = now.max(self.updated_at);
        self.deleted_at = Some(now);
        self.touch(now);
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now.max(self.updated_at);
        self.version += 1;
    }
}
