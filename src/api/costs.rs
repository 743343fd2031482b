//! Cost lookups for recipes, menus, and carts.
//!
//! Each entity's composite order is resolved by associate id, then its
//! backend-computed total cost is read. Costs are decorative in every view
//! that shows them, so any failure degrades to `None` instead of
//! propagating.

use tracing::debug;

use super::PurchaseSystemApi;

pub async fn recipe_cost(api: &PurchaseSystemApi, recipe_id: &str) -> Option<f64> {
    entity_cost(api, recipe_id).await
}

pub async fn menu_cost(api: &PurchaseSystemApi, menu_id: &str) -> Option<f64> {
    entity_cost(api, menu_id).await
}

pub async fn cart_cost(api: &PurchaseSystemApi, cart_id: &str) -> Option<f64> {
    entity_cost(api, cart_id).await
}

async fn entity_cost(api: &PurchaseSystemApi, associate_id: &str) -> Option<f64> {
    let order = match api.order_by_associate_id(associate_id).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            debug!(associate_id, "no order for entity");
            return None;
        }
        Err(error) => {
            debug!(associate_id, %error, "order lookup failed");
            return None;
        }
    };
    match api.order_cost(&order.id).await {
        Ok(cost) => cost,
        Err(error) => {
            debug!(associate_id, %error, "cost lookup failed");
            None
        }
    }
}

/// `$x.yz`, or `N/A` when no cost is known.
pub fn format_cost(cost: Option<f64>) -> String {
    match cost {
        Some(value) if value.is_finite() => format!("${value:.2}"),
        _ => "N/A".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::format_cost;

    #[test]
    fn formats_known_costs_as_currency() {
        assert_eq!(format_cost(Some(12.345)), "$12.35");
        assert_eq!(format_cost(Some(0.0)), "$0.00");
    }

    #[test]
    fn missing_or_bad_costs_render_na() {
        assert_eq!(format_cost(None), "N/A");
        assert_eq!(format_cost(Some(f64::NAN)), "N/A");
    }
}
