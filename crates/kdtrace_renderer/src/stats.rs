//! Counters collected while rendering.

use std::fmt;
use std::ops::AddAssign;

/// Ray and intersection counts for one render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Rays leaving the camera
    pub primary_rays: u64,
    /// Reflected and refracted rays
    pub secondary_rays: u64,
    /// Rays cast from lights toward shaded points
    pub shadow_feelers: u64,
    /// Calls to a viewable's intersection routine
    pub intersection_tests: u64,
}

impl RenderStats {
    /// Every ray cast, shadow feelers included.
    pub fn total_rays(&self) -> u64 {
        self.primary_rays + self.secondary_rays + self.shadow_feelers
    }
}

impl AddAssign for RenderStats {
    fn add_assign(&mut self, other: Self) {
        self.primary_rays += other.primary_rays;
        self.secondary_rays += other.secondary_rays;
        self.shadow_feelers += other.shadow_feelers;
        self.intersection_tests += other.intersection_tests;
    }
}

impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rays ({} primary, {} secondary, {} shadow), {} intersection tests",
            self.total_rays(),
            self.primary_rays,
            self.secondary_rays,
            self.shadow_feelers,
            self.intersection_tests
        )
    }
}
