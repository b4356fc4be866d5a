use jiff::Timestamp;
use tether_core::UrlMapping;

/// Decides whether a live (not deleted) mapping may still be served.
///
/// This is where expiration rules plug in. A mapping the policy rejects
/// resolves as `Gone`, the same as a deleted one.
pub trait AvailabilityPolicy: Send + Sync + 'static {
    fn is_available(&self, mapping: &UrlMapping, now: Timestamp) -> bool;
}

/// Serves every live mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAvailable;

impl AvailabilityPolicy for AlwaysAvailable {
    fn is_available(&self, _mapping: &UrlMapping, _now: Timestamp) -> bool {
        true
    }
}

impl<F> AvailabilityPolicy for F
where
    F: Fn(&UrlMapping, Timestamp) -> bool + Send + Sync + 'static,
{
    fn is_available(&self, mapping: &UrlMapping, now: Timestamp) -> bool {
        self(mapping, now)
    }
}
