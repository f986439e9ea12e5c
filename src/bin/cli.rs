use clap::{Args, Parser, Subcommand};
use hr_core::{
    cli::{
        auth,
        db::{db_generate, db_list, db_migrate, db_revert, db_seed_permissions},
    },
    core::db::init_pool,
    settings::get_config,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database related command
    Db(DbArgs),
    /// Authentication related command
    Auth(AuthArgs),
}

#[derive(Debug, Args)]
struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommands,
}

#[derive(Debug, Subcommand)]
enum AuthCommands {
    /// Create administrator account with a superuser role
    CreateSuperuser {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbCommands,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Generate new migration file
    Generate { migration_name: String },
    /// List all migration
    List,
    /// Run all pending migration
    Migrate,
    /// Revert latest migration
    Revert,
    /// Install or refresh the permission catalog
    SeedPermissions,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = get_config();
    match cli.command {
        Commands::Db(args) => match args.command {
            DbCommands::Generate { migration_name } => db_generate(&migration_name).await,
            DbCommands::List => db_list(&config).await,
            DbCommands::Migrate => db_migrate(&config).await,
            DbCommands::Revert => db_revert(&config).await,
            DbCommands::SeedPermissions => {
                let pool = init_pool(&config).await;
                db_seed_permissions(&pool).await.unwrap();
                println!("permission catalog seeded");
            }
        },
        Commands::Auth(args) => match args.command {
            AuthCommands::CreateSuperuser { email, password } => {
                let pool = init_pool(&config).await;
                auth::create_superuser(&pool, &email, &password).await.unwrap();
                println!("superuser {} created", email);
            }
        },
    }
}
