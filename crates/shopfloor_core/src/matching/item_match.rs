//! Item resolution within an already-resolved order.

use crate::matching::MatchTier;
use crate::model::order::Item;
use crate::text::normalize;

/// A resolved item together with the tier that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemMatch<'a> {
    pub item: &'a Item,
    pub tier: MatchTier,
}

/// Resolves a scanned component name against one order's items.
///
/// Tier 1 tests raw containment on the BOM name or part code; Tier 2 tests
/// normalized forms, but only when the normalized key is non-empty (an
/// empty key would match every item). The owning order is already known,
/// so there is no failure classification beyond `None`.
pub fn match_item<'a>(items: &'a [Item], bom_name_raw: &str) -> Option<ItemMatch<'a>> {
    if let Some(item) = items.iter().find(|item| {
        item.bom_name.contains(bom_name_raw)
            || item
                .part_code
                .as_deref()
                .is_some_and(|code| code.contains(bom_name_raw))
    }) {
        return Some(ItemMatch {
            item,
            tier: MatchTier::Strict,
        });
    }

    let bom_norm = normalize(bom_name_raw);
    if bom_norm.is_empty() {
        return None;
    }

    items
        .iter()
        .find(|item| {
            normalize(&item.bom_name).contains(&bom_norm)
                || item
                    .part_code
                    .as_deref()
                    .is_some_and(|code| normalize(code).contains(&bom_norm))
        })
        .map(|item| ItemMatch {
            item,
            tier: MatchTier::Fuzzy,
        })
}
