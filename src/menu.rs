//! `hotel-admin menu items|specials ...`

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use client::net::api::{ImageUpload, MenuItemForm};
use time::OffsetDateTime;

use crate::output::{menu_item_line, print_json, special_line};
use crate::{CliContext, CliError};

#[derive(Args, Debug)]
pub(crate) struct MenuCommand {
    #[command(subcommand)]
    pub(crate) command: MenuSubcommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum MenuSubcommand {
    Items(ItemsCommand),
    Specials(SpecialsCommand),
}

#[derive(Args, Debug)]
pub(crate) struct ItemsCommand {
    #[command(subcommand)]
    pub(crate) command: ItemsSubcommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ItemsSubcommand {
    List,
    Show { id: i64 },
    Create(FormArgs),
    Update {
        id: i64,
        #[command(flatten)]
        form: FormArgs,
    },
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub(crate) struct SpecialsCommand {
    #[command(subcommand)]
    pub(crate) command: SpecialsSubcommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum SpecialsSubcommand {
    List,
    Show { id: i64 },
    /// Create an inactive special.
    Create {
        #[command(flatten)]
        form: FormArgs,
        /// Defaults to today (UTC).
        #[arg(long)]
        date: Option<String>,
    },
    /// Resubmit a special; it comes back inactive.
    Update {
        id: i64,
        #[command(flatten)]
        form: FormArgs,
        #[arg(long)]
        date: Option<String>,
    },
    Delete { id: i64 },
    Activate { id: i64 },
    Deactivate { id: i64 },
    /// Flip a special's visibility.
    Toggle { id: i64 },
}

/// Fields shared by menu item and special forms.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct FormArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Decimal price, e.g. 12.50
    #[arg(long)]
    price: String,
    /// Image file to upload.
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    vegetarian: Option<bool>,
    #[arg(long)]
    available: Option<bool>,
    #[arg(long)]
    category: Option<String>,
}

impl FormArgs {
    pub(crate) fn to_form(&self) -> Result<MenuItemForm, CliError> {
        let image = self.image.as_deref().map(read_image).transpose()?;
        Ok(MenuItemForm {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.clone(),
            image,
            is_vegetarian: self.vegetarian,
            is_available: self.available,
            category: self.category.clone(),
        })
    }
}

fn read_image(path: &Path) -> Result<ImageUpload, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::Io { path: path.display().to_string(), source })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
    Ok(ImageUpload { mime: guess_mime(path).to_owned(), file_name, bytes })
}

pub(crate) fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

fn today() -> String {
    OffsetDateTime::now_utc().date().to_string()
}

pub(crate) async fn run(ctx: &CliContext, command: MenuCommand) -> Result<(), CliError> {
    match command.command {
        MenuSubcommand::Items(items) => run_items(ctx, items.command).await,
        MenuSubcommand::Specials(specials) => run_specials(ctx, specials.command).await,
    }
}

async fn run_items(ctx: &CliContext, command: ItemsSubcommand) -> Result<(), CliError> {
    let api = &ctx.api;
    let item = match command {
        ItemsSubcommand::List => {
            let items = api.list_menu_items().await?;
            if ctx.json {
                return print_json(&items);
            }
            for item in &items {
                println!("{}", menu_item_line(item));
            }
            return Ok(());
        }
        ItemsSubcommand::Delete { id } => {
            api.delete_menu_item(id).await?;
            println!("deleted menu item {id}");
            return Ok(());
        }
        ItemsSubcommand::Show { id } => api.get_menu_item(id).await?,
        ItemsSubcommand::Create(form) => api.create_menu_item(&form.to_form()?).await?,
        ItemsSubcommand::Update { id, form } => api.update_menu_item(id, &form.to_form()?).await?,
    };

    if ctx.json {
        print_json(&item)
    } else {
        println!("{}", menu_item_line(&item));
        Ok(())
    }
}

async fn run_specials(ctx: &CliContext, command: SpecialsSubcommand) -> Result<(), CliError> {
    let api = &ctx.api;
    let special = match command {
        SpecialsSubcommand::List => {
            let specials = api.list_daily_specials().await?;
            if ctx.json {
                return print_json(&specials);
            }
            for special in &specials {
                println!("{}", special_line(special));
            }
            return Ok(());
        }
        SpecialsSubcommand::Delete { id } => {
            api.delete_daily_special(id).await?;
            println!("deleted daily special {id}");
            return Ok(());
        }
        SpecialsSubcommand::Show { id } => api.get_daily_special(id).await?,
        SpecialsSubcommand::Create { form, date } => {
            let date = date.unwrap_or_else(today);
            api.create_daily_special(&form.to_form()?, &date).await?
        }
        SpecialsSubcommand::Update { id, form, date } => {
            let date = date.unwrap_or_else(today);
            api.update_daily_special(id, &form.to_form()?, &date).await?
        }
        SpecialsSubcommand::Activate { id } => api.activate_daily_special(id).await?,
        SpecialsSubcommand::Deactivate { id } => api.deactivate_daily_special(id).await?,
        SpecialsSubcommand::Toggle { id } => {
            let current = api.get_daily_special(id).await?;
            api.toggle_daily_special(&current).await?
        }
    };

    if ctx.json {
        print_json(&special)
    } else {
        println!("{}", special_line(&special));
        Ok(())
    }
}
