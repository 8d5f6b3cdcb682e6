//! # Selection Validation
//!
//! Enforces the required/min/max rules of addon and variant groups against
//! what a customer picked.
//!
//! ## Evaluation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  active groups, sorted: variants first, then addons,                   │
//! │                         each by (display_order, group_id)              │
//! │                                                                         │
//! │  for each group (count = distinct options picked from it):             │
//! │     required && count == 0      → missing required selection           │
//! │     min > 0  && count < min     → selection below minimum              │
//! │     max > 0  && count > max     → selection above maximum              │
//! │                                                                         │
//! │  first violation wins; inactive groups are skipped                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Request normalisation lives here too: variant ids are trimmed and
//! deduplicated, and repeated addon option ids are coalesced into one
//! selection with summed quantity, so a repeated id counts once.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::{validate_quantity_field, ValidationResult};

// =============================================================================
// Group Kind
// =============================================================================

/// Which family a group belongs to. Variants sort before addons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupKind {
    Variant,
    Addon,
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Variant => f.write_str("variant"),
            GroupKind::Addon => f.write_str("addon"),
        }
    }
}

// =============================================================================
// Group Rule
// =============================================================================

/// The constraint part of an addon or variant group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRule {
    pub group_id: String,
    pub kind: GroupKind,
    pub required: bool,
    pub min_select: i64,
    /// 0 = unbounded.
    pub max_select: i64,
    pub display_order: i64,
    pub is_active: bool,
}

impl GroupRule {
    /// Checks one group's count. Does not look at `is_active`.
    pub fn check(&self, selected: usize) -> CoreResult<()> {
        let count = selected as i64;

        if self.required && selected == 0 {
            return Err(CoreError::MissingRequiredSelection {
                kind: self.kind,
                group_id: self.group_id.clone(),
            });
        }
        if self.min_select > 0 && count < self.min_select {
            return Err(CoreError::SelectionBelowMinimum {
                kind: self.kind,
                group_id: self.group_id.clone(),
                min: self.min_select,
                selected,
            });
        }
        if self.max_select > 0 && count > self.max_select {
            return Err(CoreError::SelectionAboveMaximum {
                kind: self.kind,
                group_id: self.group_id.clone(),
                max: self.max_select,
                selected,
            });
        }
        Ok(())
    }

    fn sort_key(&self) -> (GroupKind, i64, &str) {
        (self.kind, self.display_order, self.group_id.as_str())
    }
}

/// Validates every active group of an item against distinct-pick counts
/// keyed by group id. Groups missing from `counts` have zero picks.
///
/// ## Example
/// ```rust
/// use std::collections::HashMap;
/// use bistro_core::selection::{validate_group_counts, GroupKind, GroupRule};
///
/// let extras = GroupRule {
///     group_id: "extras".into(),
///     kind: GroupKind::Addon,
///     required: false,
///     min_select: 0,
///     max_select: 2,
///     display_order: 0,
///     is_active: true,
/// };
///
/// let ok = HashMap::from([("extras".to_string(), 2)]);
/// assert!(validate_group_counts(&[extras.clone()], &ok).is_ok());
///
/// let too_many = HashMap::from([("extras".to_string(), 3)]);
/// assert!(validate_group_counts(&[extras], &too_many).is_err());
/// ```
pub fn validate_group_counts(rules: &[GroupRule], counts: &HashMap<String, usize>) -> CoreResult<()> {
    let mut active: Vec<&GroupRule> = rules.iter().filter(|r| r.is_active).collect();
    active.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    for rule in active {
        let selected = counts.get(&rule.group_id).copied().unwrap_or(0);
        rule.check(selected)?;
    }
    Ok(())
}

// =============================================================================
// Request Normalisation
// =============================================================================

/// One addon pick from a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonSelection {
    pub option_id: String,
    pub quantity: i64,
}

impl AddonSelection {
    pub fn new(option_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            option_id: option_id.into(),
            quantity,
        }
    }
}

/// Trims variant option ids, drops blanks and repeats. First occurrence
/// order is kept.
pub fn normalize_variant_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

/// Validates addon picks and merges repeated option ids by summing their
/// quantities. First occurrence order is kept.
///
/// ## Example
/// ```rust
/// use bistro_core::selection::{coalesce_addon_selections, AddonSelection};
///
/// let picks = vec![
///     AddonSelection::new("bacon", 1),
///     AddonSelection::new("onion", 1),
///     AddonSelection::new("bacon", 2),
/// ];
/// let merged = coalesce_addon_selections(&picks).unwrap();
/// assert_eq!(merged, vec![AddonSelection::new("bacon", 3), AddonSelection::new("onion", 1)]);
/// ```
pub fn coalesce_addon_selections(
    selections: &[AddonSelection],
) -> ValidationResult<Vec<AddonSelection>> {
    let mut merged: Vec<AddonSelection> = Vec::with_capacity(selections.len());

    for selection in selections {
        let option_id = selection.option_id.trim();
        if option_id.is_empty() {
            return Err(ValidationError::Required {
                field: "addon option_id".to_string(),
            });
        }
        validate_quantity_field("addon quantity", selection.quantity)?;

        match merged.iter_mut().find(|m| m.option_id == option_id) {
            Some(existing) => {
                existing.quantity += selection.quantity;
                validate_quantity_field("addon quantity", existing.quantity)?;
            }
            None => merged.push(AddonSelection::new(option_id, selection.quantity)),
        }
    }

    Ok(merged)
}

// =============================================================================
// Unit Tests
// =============================================================================
