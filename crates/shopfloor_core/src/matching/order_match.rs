//! Order resolution from scanned project/product text.

use crate::matching::MatchTier;
use crate::model::order::Order;
use crate::text::normalize;

/// A resolved order together with the tier that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderMatch<'a> {
    pub order: &'a Order,
    pub tier: MatchTier,
}

/// Why no order could be resolved, classified for user feedback.
///
/// The classification is diagnostic only: a single-field hit never selects
/// an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMatchFailure {
    /// Some order's project name matched, but no order's product name did.
    ProjectMatchedOnly,
    /// Some order's product name matched, but no order's project name did.
    ProductMatchedOnly,
    /// Neither field matched any order on its own (also covers the case
    /// where each field matched a different order).
    NeitherMatched,
}

/// Resolves a scanned project/product pair against the catalog.
///
/// Tier 1 tests raw substring containment on both fields; Tier 2 repeats
/// the test on normalized forms. On failure, a per-field normalized probe
/// classifies the miss for the notification message.
pub fn match_order<'a>(
    orders: &'a [Order],
    project_name_raw: &str,
    product_name_raw: &str,
) -> Result<OrderMatch<'a>, OrderMatchFailure> {
    if let Some(order) = orders.iter().find(|order| {
        order.project_name.contains(project_name_raw)
            && order.product_name.contains(product_name_raw)
    }) {
        return Ok(OrderMatch {
            order,
            tier: MatchTier::Strict,
        });
    }

    let project_norm = normalize(project_name_raw);
    let product_norm = normalize(product_name_raw);

    if let Some(order) = orders.iter().find(|order| {
        normalize(&order.project_name).contains(&project_norm)
            && normalize(&order.product_name).contains(&product_norm)
    }) {
        return Ok(OrderMatch {
            order,
            tier: MatchTier::Fuzzy,
        });
    }

    let project_hit = orders
        .iter()
        .any(|order| normalize(&order.project_name).contains(&project_norm));
    let product_hit = orders
        .iter()
        .any(|order| normalize(&order.product_name).contains(&product_norm));

    Err(if project_hit && !product_hit {
        OrderMatchFailure::ProjectMatchedOnly
    } else if !project_hit && product_hit {
        OrderMatchFailure::ProductMatchedOnly
    } else {
        OrderMatchFailure::NeitherMatched
    })
}
