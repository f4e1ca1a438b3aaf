//! CLI entry point for prismic-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "prismic-blog")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "A static blog generator for content stored in Prismic", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate,

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// List the posts of the first listing page
    List {
        /// Walk every listing page
        #[arg(short, long)]
        all: bool,
    },

    /// Show a single post with its reading time
    Show {
        /// Post uid
        uid: String,
    },

    /// Clean the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "prismic_blog=debug,info"
    } else {
        "prismic_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            prismic_blog::commands::init::init_site(&target_dir)?;
            println!("Initialized empty blog in {:?}", target_dir);
        }

        Commands::Generate => {
            let blog = prismic_blog::Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            blog.generate().await?;
            println!("Generated successfully!");
        }

        Commands::Server { port, ip, open } => {
            let blog = prismic_blog::Blog::new(&base_dir)?;

            // Generate first
            tracing::info!("Generating static files...");
            blog.generate().await?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            prismic_blog::server::start(&blog, &ip, port, open).await?;
        }

        Commands::List { all } => {
            let blog = prismic_blog::Blog::new(&base_dir)?;
            prismic_blog::commands::list::run(&blog, all).await?;
        }

        Commands::Show { uid } => {
            let blog = prismic_blog::Blog::new(&base_dir)?;
            prismic_blog::commands::show::run(&blog, &uid).await?;
        }

        Commands::Clean => {
            let blog = prismic_blog::Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("prismic-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
