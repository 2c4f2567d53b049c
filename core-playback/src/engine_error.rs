//! Translation of engine failures into host-facing errors.

use bridge_traits::EngineFailure;

/// Error as delivered to `PlayerHost::on_error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    /// Engine error kind code, forwarded verbatim.
    pub kind: i32,
    pub message: String,
}

/// Build the host error for an engine failure.
///
/// The message always embeds the kind code and the renderer index so that a
/// bare error dialog is still actionable in bug reports.
pub fn translate(failure: &EngineFailure) -> HostError {
    let kind = failure.kind.code();
    let mut message = format!(
        "MediaPlayer error code {}, extra {}.",
        kind, failure.renderer_index
    );

    if let Some(detail) = failure.detail.as_deref().filter(|d| !d.is_empty()) {
        message.push(' ');
        message.push_str(detail);
    }

    HostError { kind, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::EngineErrorKind;

    #[test]
    fn message_embeds_kind_and_renderer() {
        let error = translate(&EngineFailure::new(EngineErrorKind::Unexpected, 1));
        assert_eq!(error.kind, 2);
        assert_eq!(error.message, "MediaPlayer error code 2, extra 1.");
    }

    #[test]
    fn detail_is_appended() {
        let failure =
            EngineFailure::new(EngineErrorKind::Source, -1).with_detail("HTTP 404 Not Found");
        let error = translate(&failure);
        assert_eq!(error.kind, 0);
        assert_eq!(
            error.message,
            "MediaPlayer error code 0, extra -1. HTTP 404 Not Found"
        );
    }

    #[test]
    fn unknown_codes_pass_through() {
        let error = translate(&EngineFailure::new(EngineErrorKind::Other(1004), 0));
        assert_eq!(error.kind, 1004);
        assert!(error.message.contains("1004"));
    }
}
