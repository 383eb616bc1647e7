use std::fmt;

/// Output video shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectMode {
    /// 9:16, phone-style vertical video
    Portrait,
    /// 16:9, widescreen video
    Landscape,
}

impl AspectMode {
    /// Name used in logs and output file names
    pub fn name(&self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }

    /// Width:height ratio as `(numerator, denominator)`
    pub fn ratio(&self) -> (u32, u32) {
        match self {
            Self::Portrait => (9, 16),
            Self::Landscape => (16, 9),
        }
    }

    /// Frame width for a panorama of the given height, rounded down.
    ///
    /// Computed in integers so `300 * 9 / 16` is exactly 168, never 167.99..
    pub fn frame_width(&self, height: u32) -> u32 {
        let (num, den) = self.ratio();
        let width = u64::from(height) * u64::from(num) / u64::from(den);
        u32::try_from(width).unwrap_or(u32::MAX)
    }
}

impl fmt::Display for AspectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which videos to render, resolved once from the raw CLI flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeSelection {
    #[default]
    Portrait,
    Landscape,
    Both,
}

impl ModeSelection {
    /// Portrait is the default whenever landscape isn't asked for.
    pub fn from_flags(portrait: bool, landscape: bool) -> Self {
        match (portrait, landscape) {
            (true, true) => Self::Both,
            (false, true) => Self::Landscape,
            (_, false) => Self::Portrait,
        }
    }

    /// Modes in render order
    pub fn modes(&self) -> &'static [AspectMode] {
        match self {
            Self::Portrait => &[AspectMode::Portrait],
            Self::Landscape => &[AspectMode::Landscape],
            Self::Both => &[AspectMode::Portrait, AspectMode::Landscape],
        }
    }
}
