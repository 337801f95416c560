use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storyline::app::AppContext;
use storyline::cli::{commands, Cli, Commands};
use storyline::config::Config;
use storyline::sync::ToggleOutcome;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storyline=info")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(db) = cli.db {
        config.storage.database_path = Some(db);
    }
    if let Some(api) = cli.api {
        config.api.base_url = api;
    }

    let mut ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::login(&mut ctx, &email, &password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            commands::register(&ctx, &name, &email, &password).await?;
        }
        Commands::Logout => {
            commands::logout(&mut ctx)?;
        }
        Commands::Stories {
            page,
            size,
            location,
        } => {
            let mut query = ctx.default_list_query();
            query.page = page;
            query.location = location;
            if let Some(size) = size {
                query.size = size;
            }
            commands::list_stories(&ctx, &query).await?;
        }
        Commands::Show { id } => {
            commands::show_story(&ctx, &id).await?;
        }
        Commands::Bookmark { id } => {
            if commands::toggle_bookmark(&ctx, &id).await? == ToggleOutcome::Failed {
                anyhow::bail!("Bookmark for {} was not updated", id);
            }
        }
        Commands::Bookmarks => {
            commands::list_bookmarks(&ctx)?;
        }
        Commands::Post {
            photo,
            description,
            lat,
            lon,
        } => {
            commands::post_story(&ctx, &photo, &description, lat, lon).await?;
        }
        Commands::Sweep => {
            commands::sweep(&ctx)?;
        }
        Commands::Clear => {
            commands::clear(&ctx)?;
        }
    }

    Ok(())
}
