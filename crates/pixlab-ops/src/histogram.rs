//! 256-bin per-channel histograms.
//!
//! Each color sample lands in bin `floor(v * 255)`, so `0.0` is bin 0 and
//! `1.0` is bin 255. Alpha is never counted. Channels are named `gray` for
//! GRAY buffers and `red`, `green`, `blue` otherwise.
//!
//! A [`HistogramTable`] serializes as an ordered JSON object mapping each
//! channel name to its 256 counts.

use std::fmt;

use pixlab_core::ImageBuffer;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
#[allow(unused_imports)]
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of bins per channel.
pub const BINS: usize = 256;

/// Bin index for a sample.
#[inline]
pub fn bin_for_value(v: f32) -> usize {
    ((v.clamp(0.0, 1.0) * 255.0).floor() as usize).min(BINS - 1)
}

/// Counts for one named channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHistogram {
    /// Channel name.
    pub name: String,
    /// Pixel count per bin.
    pub bins: [u64; BINS],
}

impl ChannelHistogram {
    /// Sum of all bins, equal to the pixel count.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Index and count of the fullest bin (lowest index on ties).
    pub fn peak(&self) -> (usize, u64) {
        self.bins
            .iter()
            .enumerate()
            .fold((0, 0), |best, (i, &n)| if n > best.1 { (i, n) } else { best })
    }

    /// Bins divided by the total, summing to 1.
    pub fn normalized(&self) -> Vec<f64> {
        let total = self.total().max(1) as f64;
        self.bins.iter().map(|&n| n as f64 / total).collect()
    }
}

/// Histograms of every color channel, in channel order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistogramTable {
    channels: Vec<ChannelHistogram>,
}

impl HistogramTable {
    /// All channels in order.
    pub fn channels(&self) -> &[ChannelHistogram] {
        &self.channels
    }

    /// Channel by name.
    pub fn get(&self, name: &str) -> Option<&ChannelHistogram> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Channel names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    /// Number of pixels counted (the same for every channel).
    pub fn total(&self) -> u64 {
        self.channels.first().map_or(0, ChannelHistogram::total)
    }

    /// `(bin, count)` of the fullest bin of channel `name`.
    pub fn peak(&self, name: &str) -> Option<(usize, u64)> {
        self.get(name).map(ChannelHistogram::peak)
    }

    /// Relative frequencies of channel `name`.
    pub fn normalized(&self, name: &str) -> Option<Vec<f64>> {
        self.get(name).map(ChannelHistogram::normalized)
    }
}

/// Counts every color sample of `src`.
pub fn histogram(src: &ImageBuffer) -> HistogramTable {
    trace!(
        width = src.width(),
        height = src.height(),
        layout = %src.layout(),
        "histogram::histogram"
    );
    let ch = src.channels();
    let names = src.layout().color_channel_names();
    let color = names.len();

    let count_rows = |rows: &[f32]| {
        let mut bins = vec![[0u64; BINS]; color];
        for px in rows.chunks_exact(ch) {
            for (c, b) in bins.iter_mut().enumerate() {
                b[bin_for_value(px[c])] += 1;
            }
        }
        bins
    };
    let add = |mut a: Vec<[u64; BINS]>, b: Vec<[u64; BINS]>| {
        for (x, y) in a.iter_mut().zip(&b) {
            for (p, q) in x.iter_mut().zip(y) {
                *p += q;
            }
        }
        a
    };

    let row_len = src.width() as usize * ch;
    #[cfg(feature = "parallel")]
    let bins = src
        .samples()
        .par_chunks(row_len)
        .map(count_rows)
        .reduce(|| vec![[0u64; BINS]; color], add);
    #[cfg(not(feature = "parallel"))]
    let bins = src
        .samples()
        .chunks(row_len)
        .map(count_rows)
        .fold(vec![[0u64; BINS]; color], add);

    HistogramTable {
        channels: names
            .iter()
            .zip(bins)
            .map(|(name, bins)| ChannelHistogram {
                name: (*name).to_string(),
                bins,
            })
            .collect(),
    }
}

impl Serialize for HistogramTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.channels.len()))?;
        for c in &self.channels {
            map.serialize_entry(&c.name, &c.bins[..])?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HistogramTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = HistogramTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of channel name to {BINS} counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut channels = Vec::new();
                while let Some((name, counts)) = access.next_entry::<String, Vec<u64>>()? {
                    let bins: [u64; BINS] = counts
                        .try_into()
                        .map_err(|v: Vec<u64>| de::Error::invalid_length(v.len(), &self))?;
                    channels.push(ChannelHistogram { name, bins });
                }
                Ok(HistogramTable { channels })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}
