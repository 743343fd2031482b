use larder::cache::MenuPatch;
use larder::domain::types::MenuSummary;
use larder_api_types::menu_collection::MenuUpdateRequest;

use crate::args::MenusCmd;
use crate::context::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: MenusCmd) -> Result<(), CliError> {
    match cmd {
        MenusCmd::List { refresh } => {
            let user_id = ctx.user_id()?;
            if refresh {
                ctx.stores.menus.refresh(&user_id).await?;
            } else {
                ctx.stores.menus.ensure_loaded(&user_id).await?;
            }
            print_json(&ctx.stores.menus.menus())
        }
        MenusCmd::Create { name, date } => {
            let user_id = ctx.user_id()?;
            let menu_id = ctx.backend.menus.create_menu(&name, date, &user_id).await?;
            ctx.stores
                .menus
                .add_menu(MenuSummary {
                    id: menu_id.clone(),
                    name,
                    date,
                    owner: user_id,
                    recipe_count: 0,
                })
                .await;
            ctx.settle();
            println!("{menu_id}");
            Ok(())
        }
        MenusCmd::Update { menu, name, date } => {
            ctx.backend
                .menus
                .update_menu(&MenuUpdateRequest {
                    menu: menu.clone(),
                    name: name.clone(),
                    date,
                })
                .await?;
            ctx.stores.menus.update_menu(
                &menu,
                &MenuPatch {
                    name: name.clone(),
                    date,
                    recipe_count: None,
                },
            );
            ctx.stores.menu_detail.update_menu(
                &menu,
                &larder::cache::MenuDetailPatch { name, date },
            );
            ctx.settle();
            println!("updated");
            Ok(())
        }
    }
}
