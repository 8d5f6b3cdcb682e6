//! # Line Signatures
//!
//! Two cart lines are "the same thing" when their signatures are byte-equal:
//! same item, same variant picks, same addon picks with the same quantities,
//! same trimmed note. Adding an item whose signature matches an existing line
//! bumps that line's quantity instead of appending a duplicate.
//!
//! ```text
//! <item_id>||v:<sorted variant option ids, comma-joined>
//!          ||a:<sorted "<addon option id>:<qty>" tokens, comma-joined>
//!          ||n:<trimmed note>
//! ```
//!
//! Sorting makes the signature independent of the order the client listed
//! its picks in.

use std::fmt;

use crate::order::OrderItem;

/// Canonical identity of an order line's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineSignature(String);

impl LineSignature {
    /// Builds a signature from raw picks.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::signature::LineSignature;
    ///
    /// let a = LineSignature::compute("burger", &["large", "spicy"], &[("bacon", 1)], " no onion ");
    /// let b = LineSignature::compute("burger", &["spicy", "large"], &[("bacon", 1)], "no onion");
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str(), "burger||v:large,spicy||a:bacon:1||n:no onion");
    /// ```
    pub fn compute<V, A>(item_id: &str, variant_option_ids: &[V], addons: &[(A, i64)], note: &str) -> Self
    where
        V: AsRef<str>,
        A: AsRef<str>,
    {
        let mut variants: Vec<&str> = variant_option_ids.iter().map(AsRef::as_ref).collect();
        variants.sort_unstable();

        let mut addon_tokens: Vec<String> = addons
            .iter()
            .map(|(option_id, qty)| format!("{}:{}", option_id.as_ref(), qty))
            .collect();
        addon_tokens.sort_unstable();

        LineSignature(format!(
            "{}||v:{}||a:{}||n:{}",
            item_id,
            variants.join(","),
            addon_tokens.join(","),
            note.trim()
        ))
    }

    /// Signature of an existing line, from its snapshots.
    pub fn of_line(line: &OrderItem) -> Self {
        let variants: Vec<&str> = line.variants.iter().map(|v| v.option_id.as_str()).collect();
        let addons: Vec<(&str, i64)> = line
            .addons
            .iter()
            .map(|a| (a.option_id.as_str(), a.quantity))
            .collect();
        Self::compute(&line.item_id, &variants, &addons, &line.note)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::order::{OrderItemAddon, OrderItemVariant};

    const NO_ADDONS: &[(&str, i64)] = &[];

    #[test]
    fn test_variant_order_does_not_matter() {
        let a = LineSignature::compute("item", &["v1", "v2"], NO_ADDONS, "");
        let b = LineSignature::compute("item", &["v2", "v1"], NO_ADDONS, "");
        assert_eq!(a, b);
    }

    #[test]
    fn test_addon_order_does_not_matter() {
        let a = LineSignature::compute::<&str, _>("item", &[], &[("a1", 1), ("a2", 2)], "");
        let b = LineSignature::compute::<&str, _>("item", &[], &[("a2", 2), ("a1", 1)], "");
        assert_eq!(a, b);
    }

    #[test]
    fn test_addon_quantity_is_part_of_identity() {
        let one = LineSignature::compute::<&str, _>("item", &[], &[("bacon", 1)], "");
        let two = LineSignature::compute::<&str, _>("item", &[], &[("bacon", 2)], "");
        assert_ne!(one, two);
    }

    #[test]
    fn test_note_is_trimmed_but_case_sensitive() {
        let a = LineSignature::compute::<&str, &str>("item", &[], &[], "  well done ");
        let b = LineSignature::compute::<&str, &str>("item", &[], &[], "well done");
        let c = LineSignature::compute::<&str, &str>("item", &[], &[], "Well done");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_selection_format() {
        let sig = LineSignature::compute::<&str, &str>("item", &[], &[], "");
        assert_eq!(sig.as_str(), "item||v:||a:||n:");
    }

    #[test]
    fn test_of_line_matches_compute() {
        let line = OrderItem::snapshot_of(
            "burger",
            "Burger",
            Money::from_cents(3990),
            1,
            vec![OrderItemVariant {
                group_id: "size".into(),
                group_name: "Size".into(),
                option_id: "large".into(),
                option_name: "Large".into(),
                price_delta: Money::from_cents(800),
            }],
            vec![OrderItemAddon::new("extras", "Extras", "bacon", "Bacon", 2, Money::from_cents(500))],
            "no pickles",
        );

        let expected = LineSignature::compute("burger", &["large"], &[("bacon", 2)], "no pickles");
        assert_eq!(LineSignature::of_line(&line), expected);
    }
}
