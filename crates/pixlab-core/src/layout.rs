//! Channel layout tags.
//!
//! A [`ChannelLayout`] declares how many interleaved samples a pixel has and
//! what they mean. Only three layouts exist:
//!
//! | Layout | Samples | Order |
//! |--------|---------|-------|
//! | `Gray` | 1 | `[Y]` |
//! | `Rgb`  | 3 | `[R G B]` |
//! | `Rgba` | 4 | `[R G B A]` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Color layout of a buffer and thus its per-pixel sample count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    /// Single luminance channel.
    Gray,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, straight alpha.
    Rgba,
}

impl ChannelLayout {
    /// Number of samples per pixel.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Number of samples carrying color (alpha excluded).
    #[inline]
    pub const fn color_channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb | Self::Rgba => 3,
        }
    }

    /// Returns `true` if the last sample of each pixel is alpha.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba)
    }

    /// Returns `true` if the layout carries red, green and blue planes.
    #[inline]
    pub const fn is_color(self) -> bool {
        !matches!(self, Self::Gray)
    }

    /// Maps a raw sample count to a layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] for counts other than 1, 3 and 4.
    pub fn from_count(channels: usize) -> Result<Self, Error> {
        match channels {
            1 => Ok(Self::Gray),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            n => Err(Error::invalid_image(format!(
                "unrecognized channel count {n} (expected 1, 3 or 4)"
            ))),
        }
    }

    /// Lowercase tag name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
        }
    }

    /// Names of the color channels, in sample order.
    pub const fn color_channel_names(self) -> &'static [&'static str] {
        match self {
            Self::Gray => &["gray"],
            Self::Rgb | Self::Rgba => &["red", "green", "blue"],
        }
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gray" | "grey" | "l" => Ok(Self::Gray),
            "rgb" => Ok(Self::Rgb),
            "rgba" => Ok(Self::Rgba),
            other => Err(Error::invalid_image(format!("unrecognized channel tag '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_counts() {
        assert_eq!(ChannelLayout::Gray.channels(), 1);
        assert_eq!(ChannelLayout::Rgb.channels(), 3);
        assert_eq!(ChannelLayout::Rgba.channels(), 4);
        assert_eq!(ChannelLayout::Rgba.color_channels(), 3);
        assert!(ChannelLayout::Rgba.has_alpha());
        assert!(!ChannelLayout::Gray.is_color());
    }

    #[test]
    fn test_from_count() {
        assert_eq!(ChannelLayout::from_count(3).unwrap(), ChannelLayout::Rgb);
        assert!(matches!(
            ChannelLayout::from_count(2),
            Err(Error::InvalidImage { .. })
        ));
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!("RGBA".parse::<ChannelLayout>().unwrap(), ChannelLayout::Rgba);
        assert_eq!("gray".parse::<ChannelLayout>().unwrap(), ChannelLayout::Gray);
        assert!("cmyk".parse::<ChannelLayout>().is_err());
    }
}
