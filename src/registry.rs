//! Static table of NAIP mosaic epochs and the imagery backing each one.

use std::collections::HashSet;

use tracing::warn;

use crate::error::{NaipError, NaipResult};

/// One selectable epoch with both imagery sources
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MosaicEntry {
    pub epoch: &'static str,
    pub label: &'static str,
    /// Full-resolution mosaic, served at high zoom
    pub full_res_url: &'static str,
    /// Lower-resolution overview mosaic, served at mid zoom
    pub overview_url: &'static str,
}

pub const NAIP_MOSAICS: &[MosaicEntry] = &[
    MosaicEntry {
        epoch: "2011-2013",
        label: "Imagery Range: 2011-2013",
        full_res_url: "dynamodb://us-west-2/74f48044f38db32666078e75f3439d8e62cf9e25820afc79ea6ce19f",
        overview_url: "s3://mosaics-us-west-2.kylebarron.dev/mosaics/naip/naip_overview_2011_2013.json.gz",
    },
    MosaicEntry {
        epoch: "2014-2015",
        label: "Imagery Range: 2014-2015",
        full_res_url: "dynamodb://us-west-2/5395d9e7bba4eeaa6af4842e1a7b9d3ea9dfc2a74373ae24698809e9",
        overview_url: "s3://mosaics-us-west-2.kylebarron.dev/mosaics/naip/naip_overview_2014_2015.json.gz",
    },
    MosaicEntry {
        epoch: "2015-2017",
        label: "Imagery Range: 2015-2017",
        full_res_url: "dynamodb://us-west-2/7610d6d77fca346802fb21b89668cb12ef3162a31eb71734a8aaf5de",
        overview_url: "s3://mosaics-us-west-2.kylebarron.dev/mosaics/naip/naip_overview_2015_2017.json.gz",
    },
    MosaicEntry {
        epoch: "2016-2018",
        label: "Imagery Range: 2016-2018",
        full_res_url: "dynamodb://us-west-2/94c61bd217e1211db47cf7f8b95bbc8e5e7d68a26cd9099319cf15f9",
        overview_url: "s3://mosaics-us-west-2.kylebarron.dev/mosaics/naip/naip_overview_2016_2018.json.gz",
    },
];

/// Lookup from epoch key to mosaic sources. Always holds at least one entry.
#[derive(Clone, Debug)]
pub struct MosaicRegistry {
    entries: &'static [MosaicEntry],
}

impl MosaicRegistry {
    /// Build a registry, rejecting empty tables, blank identifiers and
    /// duplicated keys or identifiers.
    pub fn new(entries: &'static [MosaicEntry]) -> NaipResult<Self> {
        if entries.is_empty() {
            return Err(NaipError::InvalidConfig("mosaic registry is empty".into()));
        }

        let mut seen = HashSet::new();
        for entry in entries {
            if entry.full_res_url.is_empty() || entry.overview_url.is_empty() {
                return Err(NaipError::InvalidConfig(format!(
                    "epoch {} is missing an imagery source",
                    entry.epoch
                )));
            }
            for key in [entry.epoch, entry.full_res_url, entry.overview_url] {
                if !seen.insert(key) {
                    return Err(NaipError::InvalidConfig(format!("duplicate registry value: {key}")));
                }
            }
        }

        Ok(Self { entries })
    }

    /// Look up an epoch. Fails with `UnknownEpoch` when it is not registered.
    pub fn resolve_epoch(&self, epoch: &str) -> NaipResult<&MosaicEntry> {
        self.entries
            .iter()
            .find(|entry| entry.epoch == epoch)
            .ok_or_else(|| NaipError::UnknownEpoch(epoch.to_string()))
    }

    /// Look up an epoch, substituting `default` (then the first entry) when
    /// it is unknown. Rendering always gets an imagery source.
    pub fn resolve_or_default(&self, epoch: &str, default: &str) -> &MosaicEntry {
        match self.resolve_epoch(epoch) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, default, "falling back to default epoch");
                self.resolve_epoch(default).unwrap_or(&self.entries[0])
            }
        }
    }

    pub fn contains(&self, epoch: &str) -> bool {
        self.resolve_epoch(epoch).is_ok()
    }

    pub fn entries(&self) -> &[MosaicEntry] {
        self.entries
    }

    /// `(value, label)` pairs in registry order
    pub fn options(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().map(|entry| (entry.epoch, entry.label))
    }

    pub fn position(&self, epoch: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.epoch == epoch)
    }
}

impl Default for MosaicRegistry {
    fn default() -> Self {
        Self { entries: NAIP_MOSAICS }
    }
}
