// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Categories and the category arena.
//!
//! Parents are stored as ids, never as references, so a hierarchy is a set
//! of `CategoryId -> Option<CategoryId>` links that [`Categories`] keeps
//! acyclic.

use crate::color::Rgb;
use crate::error::{DomainError, DomainResult};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Process-unique category identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryId(u64);

impl CategoryId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: Rgb,
    pub progress_color: Rgb,
    /// Progress bar color once an event is complete.
    pub done_color: Rgb,
    /// Label color; `None` picks black or white by contrast.
    pub font_color: Option<Rgb>,
    pub parent: Option<CategoryId>,
}

impl Category {
    /// A category with the given base color; the other colors are derived
    /// from it.
    pub fn new(id: CategoryId, name: impl Into<String>, color: Rgb) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            progress_color: color.darken(0.7),
            done_color: color.darken(0.5),
            font_color: None,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: CategoryId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// All categories of a timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories {
    items: BTreeMap<CategoryId, Category>,
}

impl Categories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.items.values()
    }

    pub fn by_name(&self, name: &str) -> Option<&Category> {
        self.items.values().find(|c| c.name == name)
    }

    /// Categories ordered by name, then id.
    pub fn sorted_by_name(&self) -> Vec<&Category> {
        let mut sorted: Vec<&Category> = self.items.values().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        sorted
    }

    /// Direct children of `id`.
    pub fn children(&self, id: CategoryId) -> impl Iterator<Item = &Category> {
        self.items.values().filter(move |c| c.parent == Some(id))
    }

    /// `id` followed by its parent, grandparent and so on.
    pub fn lineage(&self, id: CategoryId) -> Vec<CategoryId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            if chain.contains(&cid) {
                break;
            }
            chain.push(cid);
            current = self.items.get(&cid).and_then(|c| c.parent);
        }
        chain
    }

    /// Insert or replace a category after checking the hierarchy rules.
    pub fn save(&mut self, category: Category) -> DomainResult<()> {
        self.validate(&category)?;
        self.items.insert(category.id, category);
        Ok(())
    }

    /// Remove a category.  Its children move up to its parent.
    pub fn remove(&mut self, id: CategoryId) -> DomainResult<Category> {
        let removed = self
            .items
            .remove(&id)
            .ok_or(DomainError::UnknownCategory(id))?;
        for child in self.items.values_mut() {
            if child.parent == Some(id) {
                child.parent = removed.parent;
            }
        }
        Ok(removed)
    }

    fn validate(&self, category: &Category) -> DomainResult<()> {
        if self
            .items
            .values()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(DomainError::DuplicateCategoryName(category.name.clone()));
        }
        let Some(parent) = category.parent else {
            return Ok(());
        };
        let cycle = DomainError::CategoryCycle {
            child: category.id,
            parent,
        };
        if parent == category.id {
            return Err(cycle);
        }
        if !self.items.contains_key(&parent) {
            return Err(DomainError::UnknownParentCategory(parent));
        }
        if self.lineage(parent).contains(&category.id) {
            return Err(cycle);
        }
        Ok(())
    }
}
