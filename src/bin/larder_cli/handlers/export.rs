use std::collections::BTreeMap;

use larder::api::ShoppingListOptions;
use larder::domain::export::CartIngredient;
use larder::domain::week;
use serde_json::json;

use crate::args::ExportCmd;
use crate::context::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: ExportCmd) -> Result<(), CliError> {
    match cmd {
        ExportCmd::ShoppingList {
            date,
            title,
            linkback_origin,
        } => {
            ctx.stores.weekly_cart.ensure_cart_loaded(date).await?;
            let ingredients = gather_cart_ingredients(ctx, date).await?;

            let week_start = week::week_start(date);
            let url = ctx
                .backend
                .instacart
                .create_shopping_list(
                    &ingredients,
                    &ShoppingListOptions {
                        title,
                        week_start: week_start.to_string(),
                        linkback_origin,
                    },
                )
                .await?;
            print_json(&json!({ "url": url }))
        }
    }
}

/// Aggregate scaled ingredient totals across every menu in the week's
/// cart, keyed by name and unit.
async fn gather_cart_ingredients(
    ctx: &Ctx,
    date: chrono::NaiveDate,
) -> Result<Vec<CartIngredient>, CliError> {
    let mut totals: BTreeMap<(String, String), f64> = BTreeMap::new();
    for menu_id in ctx.stores.weekly_cart.menu_ids_for_week(date) {
        ctx.stores.menu_detail.ensure_loaded(&menu_id).await?;
        let Some(entry) = ctx.stores.menu_detail.get(&menu_id) else {
            continue;
        };
        for recipe in &entry.recipes {
            for ingredient in &recipe.ingredients {
                let key = (ingredient.name.clone(), ingredient.units.clone());
                *totals.entry(key).or_insert(0.0) +=
                    ingredient.quantity * recipe.scaling_factor;
            }
        }
    }

    Ok(totals
        .into_iter()
        .map(|((name, units), total_quantity)| CartIngredient {
            name,
            total_quantity,
            units,
        })
        .collect())
}
