//! Bitmap-packed breakdown bucket and the aggregate statistics derived
//! from it. Kept as an explicit value type with pack/unpack helpers per the
//! "retain this representation" redesign note: the packed integer itself
//! never crosses the transport boundary.

/// `(intro_count, credits_count)` packed into one machine word as
/// `credits << 16 | intros`. Commercial markers are tracked in a third
/// field alongside this bucket (see `ItemBucket`) and are counted in
/// per-item totals but excluded from the intro/credits breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedBucket(u32);

impl PackedBucket {
    pub fn new(intros: u16, credits: u16) -> Self {
        Self((credits as u32) << 16 | intros as u32)
    }

    pub fn intros(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    pub fn credits(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn with_intros(self, intros: u16) -> Self {
        Self::new(intros, self.credits())
    }

    pub fn with_credits(self, credits: u16) -> Self {
        Self::new(self.intros(), credits)
    }

    pub fn total(self) -> u32 {
        self.intros() as u32 + self.credits() as u32
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Per-item bucket stored in the Marker Cache: the packed intro/credits
/// bucket plus a separately tracked commercial count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ItemBucket {
    pub bucket: PackedBucket,
    pub commercials: u32,
}

impl ItemBucket {
    pub fn total_markers(self) -> u32 {
        self.bucket.total() + self.commercials
    }

    pub fn has_markers(self) -> bool {
        self.total_markers() > 0
    }
}

/// Aggregate statistics for a scope (section, show, season), as returned by
/// `get_stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Breakdown {
    /// Number of distinct `(intros, credits)` combinations observed.
    pub buckets: usize,
    /// `total markers -> number of items with that total`.
    pub collapsed_buckets: std::collections::BTreeMap<u32, usize>,
    /// `intro count -> number of items with that intro count`.
    pub intro_buckets: std::collections::BTreeMap<u16, usize>,
    /// `credits count -> number of items with that credits count`.
    pub credits_buckets: std::collections::BTreeMap<u16, usize>,
    pub total_intros: u64,
    pub total_credits: u64,
    pub total_markers: u64,
    pub items_with_markers: u64,
    pub items_with_intros: u64,
    pub items_with_credits: u64,
}
