// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Eras and overlap resolution.
//!
//! Eras are colored background intervals that may overlap freely.  Before
//! painting, [`Eras::all_periods`] flattens them into bands that never
//! overlap:
//!
//! 1. Sort by `(start, id)`; drop zero-length eras.
//! 2. Find the first adjacent pair whose half-open periods overlap.
//! 3. Replace the pair by up to three pieces: the part of the earlier band
//!    before the overlap, the overlap itself, and the remainder of whichever
//!    band ends last.
//! 4. Re-sort and start over until no adjacent pair overlaps.
//!
//! Once adjacent pairs are disjoint, every pair is: a sorted list in which
//! `b[i]` overlapped `b[j]` for some `j > i + 1` would also have `b[i]`
//! overlapping `b[i + 1]`.
//!
//! Each band carries the summed colors of every era it stands for, so the
//! painted color of a region is the mean over exactly the eras covering it.

use crate::color::{ColorMix, Rgb};
use crate::error::{DomainError, DomainResult};
use crate::instant::Instant;
use crate::period::TimePeriod;
use std::fmt;
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name given to bands where eras overlap.
pub const OVERLAP_NAME: &str = "Era Overlap";

/// Process-unique era identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EraId(u64);

impl EraId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Era {
    pub id: EraId,
    pub period: TimePeriod,
    pub name: String,
    pub color: Rgb,
}

impl Era {
    pub fn new(id: EraId, period: TimePeriod, name: impl Into<String>, color: Rgb) -> Self {
        Self {
            id,
            period,
            name: name.into(),
            color,
        }
    }
}

/// A resolved, non-overlapping era band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintedEra {
    pub period: TimePeriod,
    pub name: String,
    pub color: Rgb,
}

/// The eras of a timeline, kept sorted by `(start, id)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eras {
    items: Vec<Era>,
}

impl Eras {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_eras(eras: impl IntoIterator<Item = Era>) -> Self {
        let mut items: Vec<Era> = eras.into_iter().collect();
        items.sort_by_key(|e| (e.period.start(), e.id));
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Eras in `(start, id)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Era> {
        self.items.iter()
    }

    pub fn get(&self, id: EraId) -> Option<&Era> {
        self.items.iter().find(|e| e.id == id)
    }

    /// Insert a new era or replace the one with the same id.
    pub fn save(&mut self, era: Era) {
        self.items.retain(|e| e.id != era.id);
        let at = self
            .items
            .partition_point(|e| (e.period.start(), e.id) < (era.period.start(), era.id));
        self.items.insert(at, era);
    }

    pub fn remove(&mut self, id: EraId) -> DomainResult<Era> {
        let index = self
            .items
            .iter()
            .position(|e| e.id == id)
            .ok_or(DomainError::UnknownEra(id))?;
        Ok(self.items.remove(index))
    }

    /// First era, in sorted order, whose period contains `t`.
    pub fn era_at(&self, t: Instant) -> Option<&Era> {
        self.items.iter().find(|e| e.period.contains(t))
    }

    /// Eras that overlap `period`.
    pub fn in_period(&self, period: &TimePeriod) -> Vec<&Era> {
        self.items
            .iter()
            .filter(|e| e.period.overlaps(period))
            .collect()
    }

    /// Flatten the eras into sorted, pairwise disjoint bands.
    pub fn all_periods(&self) -> Vec<PaintedEra> {
        resolve_overlaps(&self.items)
    }
}

#[derive(Debug, Clone)]
struct Band {
    key: u64,
    period: TimePeriod,
    name: String,
    mix: ColorMix,
}

impl Band {
    fn piece(&self, key: u64, start: Instant, end: Instant) -> Band {
        Band {
            key,
            period: TimePeriod::from_unordered(start, end),
            name: self.name.clone(),
            mix: self.mix,
        }
    }
}

/// Overlap resolution over any slice of eras.
pub fn resolve_overlaps(eras: &[Era]) -> Vec<PaintedEra> {
    let mut bands: Vec<Band> = eras
        .iter()
        .filter(|e| e.period.is_period())
        .map(|e| Band {
            key: e.id.get(),
            period: e.period,
            name: e.name.clone(),
            mix: ColorMix::of(e.color),
        })
        .collect();
    let mut next_key = bands.iter().map(|b| b.key).max().map_or(0, |k| k + 1);
    let sort = |bands: &mut Vec<Band>| bands.sort_by_key(|b| (b.period.start(), b.key));
    sort(&mut bands);

    let mut rewrites = 0usize;
    while let Some(i) = bands
        .windows(2)
        .position(|w| w[0].period.overlaps(&w[1].period))
    {
        let e1 = bands.remove(i + 1);
        let e0 = bands.remove(i);
        let mut key = || {
            next_key += 1;
            next_key
        };
        let (s0, t0) = (e0.period.start(), e0.period.end());
        let (s1, t1) = (e1.period.start(), e1.period.end());
        let overlap_end = t0.min(t1);

        if s0 < s1 {
            bands.push(e0.piece(key(), s0, s1));
        }
        bands.push(Band {
            key: key(),
            period: TimePeriod::from_unordered(s1, overlap_end),
            name: OVERLAP_NAME.to_owned(),
            mix: e0.mix.merge(e1.mix),
        });
        if t0 < t1 {
            bands.push(e1.piece(key(), t0, t1));
        } else if t1 < t0 {
            bands.push(e0.piece(key(), t1, t0));
        }
        sort(&mut bands);
        rewrites += 1;
    }
    trace!(eras = eras.len(), bands = bands.len(), rewrites, "resolved era overlaps");

    bands
        .into_iter()
        .map(|b| PaintedEra {
            period: b.period,
            name: b.name,
            // Every band is built from at least one era.
            color: b.mix.mean().unwrap_or_default(),
        })
        .collect()
}
