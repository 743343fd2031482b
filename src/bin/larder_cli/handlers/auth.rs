use serde_json::json;

use crate::args::AuthCmd;
use crate::context::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: AuthCmd) -> Result<(), CliError> {
    match cmd {
        AuthCmd::Login { username, password } => {
            let session = ctx.stores.session.login(&username, &password).await?;
            ctx.settle();
            print_json(&session)
        }
        AuthCmd::Register { username, password } => {
            let session = ctx.stores.session.register(&username, &password).await?;
            ctx.settle();
            print_json(&session)
        }
        AuthCmd::Whoami => match ctx.stores.session.session() {
            Some(session) => print_json(&session),
            None => print_json(&json!({ "session": null })),
        },
        AuthCmd::Logout => {
            ctx.stores.session.logout();
            ctx.settle();
            println!("logged out");
            Ok(())
        }
        AuthCmd::Passwd {
            old_password,
            new_password,
        } => {
            ctx.stores
                .session
                .update_password(&old_password, &new_password)
                .await?;
            println!("password updated");
            Ok(())
        }
        AuthCmd::Admin => {
            let is_admin = ctx.stores.session.ensure_admin().await?;
            print_json(&json!({ "isAdmin": is_admin }))
        }
        AuthCmd::Grant { user } => {
            ctx.backend.auth.grant_admin(&user).await?;
            println!("granted");
            Ok(())
        }
        AuthCmd::Users { refresh } => {
            let session_user = ctx.stores.session.user_id();
            if refresh {
                ctx.stores
                    .menus
                    .refresh_users(session_user.as_deref())
                    .await?;
            } else {
                ctx.stores
                    .menus
                    .ensure_users_loaded(session_user.as_deref())
                    .await?;
            }
            let users: Vec<_> = ctx
                .stores
                .menus
                .users()
                .into_iter()
                .map(|user| json!({ "id": user.id, "username": user.username }))
                .collect();
            print_json(&users)
        }
        AuthCmd::Test => {
            let reachable = ctx.stores.session.test_connection().await;
            print_json(&json!({ "reachable": reachable }))
        }
    }
}
