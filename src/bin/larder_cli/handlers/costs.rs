use larder::api::costs::{cart_cost, format_cost, menu_cost, recipe_cost};
use serde_json::json;

use crate::args::CostsCmd;
use crate::context::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: CostsCmd) -> Result<(), CliError> {
    match cmd {
        CostsCmd::Recipe { recipe } => {
            let cost = recipe_cost(&ctx.backend.purchases, &recipe).await;
            print_json(&json!({ "recipe": recipe, "cost": format_cost(cost) }))
        }
        CostsCmd::Menu { menu } => {
            let cost = menu_cost(&ctx.backend.purchases, &menu).await;
            print_json(&json!({ "menu": menu, "cost": format_cost(cost) }))
        }
        CostsCmd::CartWeek { date } => {
            ctx.stores.weekly_cart.ensure_cart_loaded(date).await?;
            let cart = ctx.stores.weekly_cart.cart_for_week(date);
            match cart.and_then(|cart| cart.cart_id) {
                Some(cart_id) => {
                    let cost = cart_cost(&ctx.backend.purchases, &cart_id).await;
                    print_json(&json!({ "cart": cart_id, "cost": format_cost(cost) }))
                }
                None => print_json(&json!({ "cart": null, "cost": "N/A" })),
            }
        }
    }
}
