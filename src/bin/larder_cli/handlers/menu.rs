use serde_json::json;

use crate::args::MenuCmd;
use crate::context::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: MenuCmd) -> Result<(), CliError> {
    match cmd {
        MenuCmd::Show { menu, refresh } => {
            if refresh {
                ctx.stores.menu_detail.refresh(&menu).await?;
            } else {
                ctx.stores.menu_detail.ensure_loaded(&menu).await?;
            }
            match ctx.stores.menu_detail.get(&menu) {
                Some(entry) => print_json(&entry),
                None => print_json(&json!({ "menu": null })),
            }
        }
        MenuCmd::AddRecipe {
            menu,
            recipe,
            scaling,
        } => {
            ctx.backend.menus.add_recipe(&menu, &recipe, scaling).await?;
            ctx.stores.menu_detail.add_recipe(&menu, &recipe, scaling).await?;
            if let Some(entry) = ctx.stores.menu_detail.get(&menu) {
                ctx.stores.menus.update_menu(
                    &menu,
                    &larder::cache::MenuPatch {
                        recipe_count: Some(entry.recipes.len()),
                        ..Default::default()
                    },
                );
            }
            ctx.settle();
            println!("added");
            Ok(())
        }
        MenuCmd::RemoveRecipe { menu, recipe } => {
            ctx.backend.menus.remove_recipe(&menu, &recipe).await?;
            ctx.stores.menu_detail.remove_recipe(&menu, &recipe);
            if let Some(entry) = ctx.stores.menu_detail.get(&menu) {
                ctx.stores.menus.update_menu(
                    &menu,
                    &larder::cache::MenuPatch {
                        recipe_count: Some(entry.recipes.len()),
                        ..Default::default()
                    },
                );
            }
            ctx.settle();
            println!("removed");
            Ok(())
        }
        MenuCmd::SetScaling {
            menu,
            recipe,
            scaling,
        } => {
            ctx.backend
                .menus
                .change_recipe_scaling(&menu, &recipe, scaling)
                .await?;
            ctx.stores
                .menu_detail
                .update_recipe_scaling(&menu, &recipe, scaling);
            ctx.settle();
            println!("updated");
            Ok(())
        }
    }
}
