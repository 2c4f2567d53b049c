//! Source binding.
//!
//! Decides whether a new locator requires reloading the engine, remembers the
//! declared video dimensions for the bound source, and builds the engine
//! [`MediaSource`] for it.

use crate::config::AdapterConfig;
use bridge_traits::platform::PlatformSendSync;
use bridge_traits::MediaSource;
use url::Url;

/// Video dimensions known ahead of decoding (e.g., from a catalogue entry).
///
/// Each dimension independently overrides the size the engine reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclaredSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl DeclaredSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    /// Size to report to the host for an engine-reported `(width, height)`.
    pub fn apply(&self, width: u32, height: u32) -> (u32, u32) {
        (self.width.unwrap_or(width), self.height.unwrap_or(height))
    }
}

/// Builds the engine media source for a locator.
///
/// Hosts can inject their own factory to add headers, DRM or a different
/// fetch stack.
pub trait MediaSourceFactory: PlatformSendSync {
    fn create_media_source(&self, locator: &Url) -> MediaSource;
}

/// Default factory for progressive HTTP(S) and file sources.
#[derive(Debug, Clone)]
pub struct HttpMediaSourceFactory {
    user_agent: String,
    connect_timeout: std::time::Duration,
    read_timeout: std::time::Duration,
    allow_cross_protocol_redirects: bool,
}

impl HttpMediaSourceFactory {
    pub fn from_config(config: &AdapterConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            allow_cross_protocol_redirects: config.allow_cross_protocol_redirects,
        }
    }
}

impl MediaSourceFactory for HttpMediaSourceFactory {
    fn create_media_source(&self, locator: &Url) -> MediaSource {
        MediaSource {
            locator: locator.clone(),
            user_agent: self.user_agent.clone(),
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            allow_cross_protocol_redirects: self.allow_cross_protocol_redirects,
        }
    }
}

/// The locator currently bound to a session and its declared size.
#[derive(Debug, Clone, Default)]
pub struct SourceBinding {
    locator: Option<Url>,
    declared: DeclaredSize,
    /// Set once a source was handed to the engine; size events before that
    /// belong to no source and are ignored.
    size_listener_armed: bool,
}

impl SourceBinding {
    pub fn locator(&self) -> Option<&Url> {
        self.locator.as_ref()
    }

    pub fn declared(&self) -> DeclaredSize {
        self.declared
    }

    /// A bind is skipped only when the current locator equals the new one,
    /// including both being absent.
    pub fn is_same(&self, locator: Option<&Url>) -> bool {
        self.locator.as_ref() == locator
    }

    /// Replace the bound locator and declared size.
    pub fn bind(&mut self, locator: Option<Url>, declared: DeclaredSize) {
        self.locator = locator;
        self.declared = declared;
    }

    pub fn arm_size_listener(&mut self) {
        self.size_listener_armed = true;
    }

    pub fn size_listener_armed(&self) -> bool {
        self.size_listener_armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn rebind_rules() {
        let mut binding = SourceBinding::default();
        let a = url("https://cdn.example.org/a.mp4");
        let b = url("https://cdn.example.org/b.mp4");

        // null -> null is skipped, null -> locator is not
        assert!(binding.is_same(None));
        assert!(!binding.is_same(Some(&a)));

        binding.bind(Some(a.clone()), DeclaredSize::unknown());
        assert!(binding.is_same(Some(&a)));
        assert!(!binding.is_same(Some(&b)));
        // locator -> null rebinds
        assert!(!binding.is_same(None));
    }

    #[test]
    fn declared_size_overrides_each_dimension() {
        assert_eq!(DeclaredSize::new(320, 240).apply(1920, 1080), (320, 240));
        assert_eq!(DeclaredSize::unknown().apply(1920, 1080), (1920, 1080));

        let width_only = DeclaredSize {
            width: Some(640),
            height: None,
        };
        assert_eq!(width_only.apply(1920, 1080), (640, 1080));
    }

    #[test]
    fn http_factory_uses_config() {
        let config = AdapterConfig::default().with_user_agent("ccctv/2.0");
        let factory = HttpMediaSourceFactory::from_config(&config);
        let source = factory.create_media_source(&url("https://cdn.example.org/a.mp4"));

        assert_eq!(source.locator.as_str(), "https://cdn.example.org/a.mp4");
        assert_eq!(source.user_agent, "ccctv/2.0");
        assert_eq!(source.connect_timeout, Duration::from_secs(8));
        assert!(source.allow_cross_protocol_redirects);
    }

    #[test]
    fn size_listener_arms_once_bound() {
        let mut binding = SourceBinding::default();
        assert!(!binding.size_listener_armed());
        binding.arm_size_listener();
        assert!(binding.size_listener_armed());
    }
}
