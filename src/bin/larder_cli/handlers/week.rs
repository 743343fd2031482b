use serde_json::json;

use crate::args::WeekCmd;
use crate::context::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: WeekCmd) -> Result<(), CliError> {
    match cmd {
        WeekCmd::Show { date, refresh } => {
            if refresh {
                ctx.stores.weekly_cart.refresh_cart(date).await?;
            } else {
                ctx.stores.weekly_cart.ensure_cart_loaded(date).await?;
            }
            let mapping = ctx.stores.weekly_cart.week_mapping(date).await?;
            let cart = ctx.stores.weekly_cart.cart_for_week(date);
            print_json(&json!({
                "weekStart": larder::domain::week::week_start(date),
                "cart": cart,
                "mapping": mapping,
            }))
        }
        WeekCmd::AddMenu { menu, date } => {
            let cart_id = ctx.stores.weekly_cart.add_menu_to_cart(&menu, date).await?;
            ctx.settle();
            println!("{cart_id}");
            Ok(())
        }
        WeekCmd::RemoveMenu { menu } => {
            let cart_id = ctx.stores.weekly_cart.remove_menu_from_cart(&menu).await?;
            ctx.settle();
            println!("{cart_id}");
            Ok(())
        }
        WeekCmd::CreateCart { date } => {
            let cart_id = ctx.stores.weekly_cart.create_cart(date).await?;
            ctx.settle();
            println!("{cart_id}");
            Ok(())
        }
        WeekCmd::DeleteCart { date } => {
            let cart_id = ctx.stores.weekly_cart.delete_cart(date).await?;
            ctx.settle();
            println!("{cart_id}");
            Ok(())
        }
    }
}
