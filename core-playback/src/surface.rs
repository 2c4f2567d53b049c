//! Surface binding.
//!
//! Tracks whether a rendering surface is attached and whether the host needs
//! one at all. Attach and detach are the same transition with a different
//! target, so both funnel through [`SurfaceBinding::set_display`].

use bridge_traits::SurfaceHandle;

/// Whether the host renders into a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRequirement {
    /// Audio-only or off-screen host; readiness does not depend on a surface.
    None,
    /// Video host; the session is only prepared while a surface is attached.
    Required,
}

impl SurfaceRequirement {
    pub fn from_host_flag(requires_surface: bool) -> Self {
        if requires_surface {
            SurfaceRequirement::Required
        } else {
            SurfaceRequirement::None
        }
    }
}

/// Outcome of a [`SurfaceBinding::set_display`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTransition {
    /// Attachment state did not change; nothing to forward.
    Unchanged,
    Attached(SurfaceHandle),
    Detached,
}

#[derive(Debug, Clone)]
pub struct SurfaceBinding {
    requirement: SurfaceRequirement,
    has_display: bool,
}

impl SurfaceBinding {
    pub fn new(requirement: SurfaceRequirement) -> Self {
        Self {
            requirement,
            has_display: false,
        }
    }

    pub fn has_display(&self) -> bool {
        self.has_display
    }

    /// Record a surface attach (`Some`) or detach (`None`).
    ///
    /// Only a change of attachment state is reported. Attaching a second
    /// surface while one is attached is `Unchanged`: the host is expected to
    /// detach before attaching a replacement.
    pub fn set_display(&mut self, surface: Option<SurfaceHandle>) -> DisplayTransition {
        let had_display = self.has_display;
        self.has_display = surface.is_some();

        match (had_display, surface) {
            (false, Some(handle)) => DisplayTransition::Attached(handle),
            (true, None) => DisplayTransition::Detached,
            _ => DisplayTransition::Unchanged,
        }
    }

    /// Forget the attached surface without a transition (session release).
    pub fn clear(&mut self) {
        self.has_display = false;
    }

    /// Whether an initialized session may be reported as prepared.
    pub fn allows_prepared(&self) -> bool {
        self.requirement == SurfaceRequirement::None || self.has_display
    }

    pub fn is_prepared(&self, initialized: bool) -> bool {
        initialized && self.allows_prepared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_and_detach_report_transitions_once() {
        let mut binding = SurfaceBinding::new(SurfaceRequirement::Required);
        let surface = SurfaceHandle::new(7);

        assert_eq!(binding.set_display(Some(surface)), DisplayTransition::Attached(surface));
        assert!(binding.has_display());
        assert_eq!(binding.set_display(Some(surface)), DisplayTransition::Unchanged);

        assert_eq!(binding.set_display(None), DisplayTransition::Detached);
        assert!(!binding.has_display());
        assert_eq!(binding.set_display(None), DisplayTransition::Unchanged);
    }

    #[test]
    fn swapping_surfaces_without_detach_is_unchanged() {
        let mut binding = SurfaceBinding::new(SurfaceRequirement::Required);
        binding.set_display(Some(SurfaceHandle::new(1)));
        assert_eq!(
            binding.set_display(Some(SurfaceHandle::new(2))),
            DisplayTransition::Unchanged
        );
        assert!(binding.has_display());
    }

    #[test]
    fn prepared_truth_table() {
        let cases = [
            // (initialized, has_display, requirement, expected)
            (false, false, SurfaceRequirement::None, false),
            (false, true, SurfaceRequirement::Required, false),
            (true, false, SurfaceRequirement::None, true),
            (true, false, SurfaceRequirement::Required, false),
            (true, true, SurfaceRequirement::Required, true),
            (true, true, SurfaceRequirement::None, true),
        ];

        for (initialized, has_display, requirement, expected) in cases {
            let mut binding = SurfaceBinding::new(requirement);
            if has_display {
                binding.set_display(Some(SurfaceHandle::new(1)));
            }
            assert_eq!(
                binding.is_prepared(initialized),
                expected,
                "initialized={initialized} has_display={has_display} requirement={requirement:?}"
            );
        }
    }

    #[test]
    fn clear_drops_display() {
        let mut binding = SurfaceBinding::new(SurfaceRequirement::Required);
        binding.set_display(Some(SurfaceHandle::new(3)));
        binding.clear();
        assert!(!binding.has_display());
        assert!(!binding.allows_prepared());
    }
}
