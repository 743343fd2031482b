use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "larder-cli", version, about = "Command-line client for the Larder backend")]
pub struct Cli {
    /// Backend origin RPC calls are sent to (or a proxy origin ending in
    /// /api).
    #[arg(long, env = "LARDER_BACKEND_ORIGIN", default_value = "http://localhost:8000")]
    pub backend: String,

    /// Directory persisting the session between invocations.
    #[arg(long, env = "LARDER_STORAGE_DIR", default_value = ".larder")]
    pub storage_dir: PathBuf,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout_seconds: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Session and user administration.
    Auth(AuthCmdWrapper),
    /// Store catalog items and purchase options.
    Catalog(CatalogCmdWrapper),
    /// The menu list.
    Menus(MenusCmdWrapper),
    /// One menu's recipes and attributes.
    Menu(MenuCmdWrapper),
    /// Weekly carts and the week view.
    Week(WeekCmdWrapper),
    /// Shopping-list export.
    Export(ExportCmdWrapper),
    /// Backend-computed costs.
    Costs(CostsCmdWrapper),
}

#[derive(Debug, Args)]
pub struct AuthCmdWrapper {
    #[command(subcommand)]
    pub action: AuthCmd,
}

#[derive(Debug, Subcommand)]
pub enum AuthCmd {
    /// Log in and persist the session.
    Login { username: String, password: String },
    /// Register a new user and log in.
    Register { username: String, password: String },
    /// Show the current session.
    Whoami,
    /// End the session and clear every store.
    Logout,
    /// Change the session user's password.
    Passwd {
        old_password: String,
        new_password: String,
    },
    /// Show whether the session user is an admin.
    Admin,
    /// Grant admin rights to a user.
    Grant { user: String },
    /// List all users (excluding the session user).
    Users {
        #[arg(long)]
        refresh: bool,
    },
    /// Probe backend connectivity.
    Test,
}

#[derive(Debug, Args)]
pub struct CatalogCmdWrapper {
    #[command(subcommand)]
    pub action: CatalogCmd,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCmd {
    /// List the catalog.
    List {
        #[arg(long)]
        refresh: bool,
    },
    /// Create an item.
    AddItem { name: String },
    /// Rename an item.
    RenameItem { item: String, name: String },
    /// Delete an item.
    RemoveItem { item: String },
    /// Add a purchase option to an item.
    AddOption {
        item: String,
        #[arg(long)]
        quantity: f64,
        #[arg(long)]
        units: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        store: String,
    },
    /// Update one field of a purchase option.
    UpdateOption {
        option: String,
        #[arg(long)]
        quantity: Option<f64>,
        #[arg(long)]
        units: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        store: Option<String>,
    },
    /// Confirm a purchase option.
    ConfirmOption { option: String },
    /// Remove a purchase option from an item.
    RemoveOption { item: String, option: String },
}

#[derive(Debug, Args)]
pub struct MenusCmdWrapper {
    #[command(subcommand)]
    pub action: MenusCmd,
}

#[derive(Debug, Subcommand)]
pub enum MenusCmd {
    /// List the session user's menus, newest first.
    List {
        #[arg(long)]
        refresh: bool,
    },
    /// Create a menu for a date.
    Create { name: String, date: NaiveDate },
    /// Update a menu's name and/or date.
    Update {
        menu: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Debug, Args)]
pub struct MenuCmdWrapper {
    #[command(subcommand)]
    pub action: MenuCmd,
}

#[derive(Debug, Subcommand)]
pub enum MenuCmd {
    /// Show one menu with recipes and ingredients.
    Show {
        menu: String,
        #[arg(long)]
        refresh: bool,
    },
    /// Add a recipe to a menu.
    AddRecipe {
        menu: String,
        recipe: String,
        #[arg(long, default_value_t = 1.0)]
        scaling: f64,
    },
    /// Remove a recipe from a menu.
    RemoveRecipe { menu: String, recipe: String },
    /// Change a recipe's scaling factor within a menu.
    SetScaling {
        menu: String,
        recipe: String,
        scaling: f64,
    },
}

#[derive(Debug, Args)]
pub struct WeekCmdWrapper {
    #[command(subcommand)]
    pub action: WeekCmd,
}

#[derive(Debug, Subcommand)]
pub enum WeekCmd {
    /// Show the week's cart and date → menu mapping.
    Show {
        date: NaiveDate,
        #[arg(long)]
        refresh: bool,
    },
    /// Add a menu (scheduled on `date`) to its week's cart.
    AddMenu { menu: String, date: NaiveDate },
    /// Remove a menu from its cart.
    RemoveMenu { menu: String },
    /// Create the week's cart.
    CreateCart { date: NaiveDate },
    /// Delete the week's cart.
    DeleteCart { date: NaiveDate },
}

#[derive(Debug, Args)]
pub struct ExportCmdWrapper {
    #[command(subcommand)]
    pub action: ExportCmd,
}

#[derive(Debug, Subcommand)]
pub enum ExportCmd {
    /// Export the week's cart as a shopping list; prints the list URL.
    ShoppingList {
        date: NaiveDate,
        #[arg(long, default_value = "Shopping List")]
        title: String,
        #[arg(long, default_value = "https://larder.app")]
        linkback_origin: String,
    },
}

#[derive(Debug, Args)]
pub struct CostsCmdWrapper {
    #[command(subcommand)]
    pub action: CostsCmd,
}

#[derive(Debug, Subcommand)]
pub enum CostsCmd {
    /// Cost of a recipe.
    Recipe { recipe: String },
    /// Cost of a menu.
    Menu { menu: String },
    /// Cost of the cart for the week containing a date.
    CartWeek { date: NaiveDate },
}
