//! Trending plans
//!
//! A plan is an ordered list of slots. Each slot asks one source for a
//! share of the requested limit, either through its native trending call
//! or through a few searches picked from a seed list.

use fedsource::SourceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seeds of the local curated slot
pub const LOCAL_CURATED_SEEDS: &[&str] = &[
    "hindi",
    "bollywood",
    "punjabi",
    "tamil",
    "telugu",
    "malayalam",
    "arijit singh",
    "jubin nautiyal",
    "pritam",
    "ar rahman",
    "anirudh",
    "shreya ghoshal",
];

pub const HINDI_SEEDS: &[&str] = &["bollywood", "arijit singh", "shreya ghoshal", "pritam"];

pub const PUNJABI_SEEDS: &[&str] = &["diljit dosanjh", "guru randhawa", "ammy virk"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Global,
    /// Indian catalogs
    Local,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Global => "global",
            Region::Local => "local",
        }
    }

    pub fn plan(&self) -> Vec<Slot> {
        match self {
            Region::Global => global_plan(),
            Region::Local => local_plan(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown region: {0}")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global" | "all" => Ok(Region::Global),
            "local" | "india" => Ok(Region::Local),
            other => Err(UnknownRegion(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotMode {
    /// The adapter's own trending call
    Native,
    /// `picks` random seeds, one search each
    Seeded {
        seeds: &'static [&'static str],
        picks: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub source: SourceId,
    pub mode: SlotMode,
    pub divisor: u32,
}

impl Slot {
    pub fn native(source: SourceId, divisor: u32) -> Self {
        Self {
            source,
            mode: SlotMode::Native,
            divisor,
        }
    }

    pub fn seeded(
        source: SourceId,
        seeds: &'static [&'static str],
        picks: usize,
        divisor: u32,
    ) -> Self {
        Self {
            source,
            mode: SlotMode::Seeded { seeds, picks },
            divisor,
        }
    }

    /// `ceil(limit / divisor)`
    pub fn share(&self, limit: u32) -> u32 {
        limit.div_ceil(self.divisor.max(1))
    }
}

pub fn local_plan() -> Vec<Slot> {
    vec![
        Slot::seeded(SourceId::Musiq, LOCAL_CURATED_SEEDS, 4, 2),
        Slot::native(SourceId::Archive, 3),
        Slot::seeded(SourceId::Musiq, HINDI_SEEDS, 2, 4),
        Slot::seeded(SourceId::Musiq, PUNJABI_SEEDS, 2, 4),
    ]
}

pub fn global_plan() -> Vec<Slot> {
    vec![
        Slot::native(SourceId::Gateway, 3),
        Slot::native(SourceId::Audius, 3),
        Slot::native(SourceId::Jamendo, 3),
        Slot::native(SourceId::Youtube, 4),
        Slot::native(SourceId::Deezer, 4),
        Slot::seeded(SourceId::Fma, &["creative commons"], 1, 6),
        Slot::seeded(SourceId::CcMixter, &["remix"], 1, 6),
        Slot::native(SourceId::Incompetech, 6),
        Slot::native(SourceId::Bensound, 6),
        Slot::seeded(SourceId::Freesound, &["music"], 1, 6),
        Slot::seeded(SourceId::InternetArchive, &["audio"], 1, 6),
    ]
}

/// Slot used when trending is asked of `source` alone
///
/// The whole limit goes to the source. Musiq gets the curated seed list,
/// sources with a seeded global slot keep their seed.
pub fn source_slot(source: SourceId) -> Slot {
    if source == SourceId::Musiq {
        return Slot::seeded(source, LOCAL_CURATED_SEEDS, 4, 1);
    }
    global_plan()
        .into_iter()
        .find(|slot| slot.source == source)
        .map(|slot| Slot { divisor: 1, ..slot })
        .unwrap_or_else(|| Slot::native(source, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_rounds_up() {
        let slot = Slot::native(SourceId::Audius, 3);
        assert_eq!(slot.share(20), 7);
        assert_eq!(slot.share(3), 1);
        assert_eq!(slot.share(1), 1);
    }

    #[test]
    fn test_region_parsing() {
        assert_eq!("india".parse::<Region>().unwrap(), Region::Local);
        assert_eq!(" Global ".parse::<Region>().unwrap(), Region::Global);
        assert!("mars".parse::<Region>().is_err());
    }

    #[test]
    fn test_plans() {
        let local = Region::Local.plan();
        assert_eq!(local.len(), 4);
        assert!(local.iter().all(|s| matches!(s.source, SourceId::Musiq | SourceId::Archive)));

        let global = Region::Global.plan();
        assert_eq!(global[0].source, SourceId::Gateway);
        assert!(!global.iter().any(|s| s.source == SourceId::Musiq));
    }

    #[test]
    fn test_source_slot() {
        assert_eq!(
            source_slot(SourceId::Fma).mode,
            SlotMode::Seeded {
                seeds: &["creative commons"],
                picks: 1
            }
        );
        assert_eq!(source_slot(SourceId::Deezer), Slot::native(SourceId::Deezer, 1));
        assert_eq!(source_slot(SourceId::Radio), Slot::native(SourceId::Radio, 1));

        let musiq = source_slot(SourceId::Musiq);
        assert_eq!(musiq.share(20), 20);
        assert!(matches!(musiq.mode, SlotMode::Seeded { picks: 4, .. }));
    }
}
