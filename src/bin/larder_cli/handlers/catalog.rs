use larder::cache::PurchaseOptionPatch;
use larder::domain::types::PurchaseOption;

use crate::args::CatalogCmd;
use crate::context::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: CatalogCmd) -> Result<(), CliError> {
    match cmd {
        CatalogCmd::List { refresh } => {
            if refresh {
                ctx.stores.catalog.refresh().await?;
            } else {
                ctx.stores.catalog.ensure_loaded().await?;
            }
            print_json(&ctx.stores.catalog.items())
        }
        CatalogCmd::AddItem { name } => {
            let item_id = ctx.backend.catalog.create_item(&name).await?;
            ctx.stores.catalog.add_item(larder::domain::types::CatalogItem {
                id: item_id.clone(),
                name,
                purchase_options: Vec::new(),
            });
            ctx.settle();
            println!("{item_id}");
            Ok(())
        }
        CatalogCmd::RenameItem { item, name } => {
            ctx.backend.catalog.update_item_name(&item, &name).await?;
            ctx.stores.catalog.update_item_name(&item, &name);
            ctx.settle();
            println!("renamed");
            Ok(())
        }
        CatalogCmd::RemoveItem { item } => {
            ctx.backend.catalog.delete_item(&item).await?;
            ctx.stores.catalog.remove_item(&item);
            ctx.settle();
            println!("removed");
            Ok(())
        }
        CatalogCmd::AddOption {
            item,
            quantity,
            units,
            price,
            store,
        } => {
            let option_id = ctx
                .backend
                .catalog
                .add_purchase_option(&item, quantity, &units, price, &store)
                .await?;
            ctx.stores.catalog.add_purchase_option(
                &item,
                PurchaseOption {
                    id: option_id.clone(),
                    quantity,
                    units,
                    price,
                    store,
                    confirmed: false,
                },
            );
            ctx.settle();
            println!("{option_id}");
            Ok(())
        }
        CatalogCmd::UpdateOption {
            option,
            quantity,
            units,
            price,
            store,
        } => {
            if let Some(quantity) = quantity {
                ctx.backend
                    .catalog
                    .update_purchase_option_quantity(&option, quantity)
                    .await?;
            }
            if let Some(units) = &units {
                ctx.backend
                    .catalog
                    .update_purchase_option_units(&option, units)
                    .await?;
            }
            if let Some(price) = price {
                ctx.backend
                    .catalog
                    .update_purchase_option_price(&option, price)
                    .await?;
            }
            if let Some(store) = &store {
                ctx.backend
                    .catalog
                    .update_purchase_option_store(&option, store)
                    .await?;
            }
            if let Some(item) = ctx.stores.catalog.find_item_by_purchase_option(&option) {
                ctx.stores.catalog.update_purchase_option(
                    &item.id,
                    &option,
                    &PurchaseOptionPatch {
                        quantity,
                        units,
                        price,
                        store,
                        confirmed: None,
                    },
                );
            }
            ctx.settle();
            println!("updated");
            Ok(())
        }
        CatalogCmd::ConfirmOption { option } => {
            ctx.backend.catalog.confirm_purchase_option(&option).await?;
            if let Some(item) = ctx.stores.catalog.find_item_by_purchase_option(&option) {
                ctx.stores.catalog.update_purchase_option(
                    &item.id,
                    &option,
                    &PurchaseOptionPatch {
                        confirmed: Some(true),
                        ..Default::default()
                    },
                );
            }
            ctx.settle();
            println!("confirmed");
            Ok(())
        }
        CatalogCmd::RemoveOption { item, option } => {
            ctx.backend
                .catalog
                .remove_purchase_option(&item, &option)
                .await?;
            ctx.stores.catalog.remove_purchase_option(&item, &option);
            ctx.settle();
            println!("removed");
            Ok(())
        }
    }
}
