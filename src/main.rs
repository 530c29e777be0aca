use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;

mod analytics;
mod cache;
mod cli;
mod config;
mod display;
mod error;
mod friends;
mod host;
mod ids;
mod interactions;
mod labels;
mod mapper;
mod recorder;
mod reminders;
mod scheduler;
mod types;

use cli::friends::ProfileArgs;
use cli::interactions::LogArgs;
use config::Settings;

#[derive(Parser)]
#[command(name = "friends")]
#[command(version)]
#[command(about = "Keep track of friends, time spent together and who to call next")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Profile options accepted by both `add` and `update`
#[derive(Args)]
struct ProfileOpts {
    /// Nickname
    #[arg(long)]
    nickname: Option<String>,

    /// Birthday (YYYY-MM-DD)
    #[arg(long)]
    birthday: Option<String>,

    /// Where you met
    #[arg(long)]
    met_location: Option<String>,

    /// Relationship, e.g. colleague or classmate
    #[arg(short, long)]
    relationship: Option<String>,

    /// Comma-separated tags (replaces existing on update)
    #[arg(short, long)]
    tags: Option<String>,

    /// Intimacy from 1 to 10
    #[arg(short, long)]
    intimacy: Option<u8>,

    /// Phone number
    #[arg(long)]
    phone: Option<String>,

    /// WeChat id
    #[arg(long)]
    wechat: Option<String>,

    /// Email address
    #[arg(long)]
    email: Option<String>,

    /// Social media handle or link
    #[arg(long)]
    social: Option<String>,

    /// Free-form notes
    #[arg(long)]
    notes: Option<String>,
}

impl ProfileOpts {
    fn into_args(self, met_date: Option<String>) -> ProfileArgs {
        ProfileArgs {
            nickname: self.nickname,
            birthday: self.birthday,
            met_date,
            met_location: self.met_location,
            relationship: self.relationship,
            tags: self.tags,
            intimacy: self.intimacy,
            phone: self.phone,
            wechat: self.wechat,
            email: self.email,
            social: self.social,
            notes: self.notes,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a friend
    Add {
        /// Name
        name: String,

        /// When you met (YYYY-MM-DD)
        #[arg(long)]
        met_date: Option<String>,

        #[command(flatten)]
        profile: ProfileOpts,
    },

    /// Update a friend's profile
    Update {
        /// Friend id or name
        friend: String,

        /// Last contact date (YYYY-MM-DD)
        #[arg(long)]
        last_contact: Option<String>,

        #[command(flatten)]
        profile: ProfileOpts,
    },

    /// Show a friend's profile and recent interactions
    Show {
        /// Friend id or name
        friend: String,

        /// Number of recent interactions
        #[arg(short = 'n', long, default_value = "5")]
        recent: usize,
    },

    /// Search friends
    Search {
        /// Text to match in name, nickname or tags (omit to list all)
        query: Option<String>,

        /// Only this relationship
        #[arg(short, long)]
        relationship: Option<String>,

        /// Comma-separated tags, all must match
        #[arg(short, long)]
        tags: Option<String>,
    },

    /// Log an interaction
    Log {
        /// meeting, chat, activity, gift, call, meal, travel or other
        #[arg(value_name = "TYPE")]
        kind: String,

        /// Friend id or name
        #[arg(short, long)]
        friend: Option<String>,

        /// Date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,

        /// Mood from 1 to 5
        #[arg(short, long)]
        mood: Option<u8>,

        /// Location
        #[arg(short, long)]
        location: Option<String>,

        /// Money spent
        #[arg(long)]
        cost: Option<f64>,

        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,

        /// Title
        #[arg(long)]
        title: Option<String>,

        /// What happened
        #[arg(short, long)]
        content: Option<String>,
    },

    /// List a friend's interactions, newest first
    Interactions {
        /// Friend id or name
        friend: String,

        /// Maximum results
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,

        /// Skip this many results
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Only this interaction type
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
    },

    /// Interaction counts and mood per type for a friend
    Stats {
        /// Friend id or name
        friend: String,

        /// week, month or year
        #[arg(short, long, default_value = "month", value_parser = ["week", "month", "year"])]
        period: String,
    },

    /// Set a reminder to contact a friend
    Remind {
        /// Friend id or name
        friend: String,

        /// Due date (YYYY-MM-DD or "today")
        due: String,

        /// Message
        #[arg(default_value = "")]
        message: String,
    },

    /// List reminders due today or earlier
    Due {
        /// Include pending reminders that are not due yet
        #[arg(short, long)]
        all: bool,
    },

    /// Mark a reminder done
    Done {
        /// Reminder id
        id: String,
    },

    /// Check for due reminders periodically until Ctrl-C
    Watch {
        /// Seconds between checks (default from config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Write to the log instead of stdout
        #[arg(long)]
        log: bool,
    },

    /// Overall activity chart
    Analytics {
        /// week, month or year
        #[arg(short, long, default_value = "month", value_parser = ["week", "month", "year"])]
        period: String,
    },

    /// View or set configuration
    Config {
        /// Config key
        key: Option<String>,

        /// Config value
        value: Option<String>,

        /// List available keys
        #[arg(long)]
        list: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config { key, value, list } => {
            cli::config::run_config(key.as_deref(), value.as_deref(), list)
        }
        command => match Settings::load() {
            Ok(settings) => run(&settings, command).await,
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        log::debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(settings: &Settings, command: Commands) -> error::Result<()> {
    match command {
        Commands::Add {
            name,
            met_date,
            profile,
        } => cli::friends::run_add(settings, &name, profile.into_args(met_date)).await,
        Commands::Update {
            friend,
            last_contact,
            profile,
        } => {
            cli::friends::run_update(settings, &friend, profile.into_args(None), last_contact.as_deref()).await
        }
        Commands::Show { friend, recent } => cli::friends::run_show(settings, &friend, recent).await,
        Commands::Search {
            query,
            relationship,
            tags,
        } => cli::friends::run_search(settings, query.as_deref(), relationship, tags.as_deref()).await,
        Commands::Log {
            kind,
            friend,
            date,
            mood,
            location,
            cost,
            tags,
            title,
            content,
        } => {
            let args = LogArgs {
                friend,
                date,
                mood,
                location,
                cost,
                tags,
                title,
                content,
            };
            cli::interactions::run_log(settings, &kind, args).await
        }
        Commands::Interactions {
            friend,
            limit,
            offset,
            kind,
        } => cli::interactions::run_interactions(settings, &friend, limit, offset, kind.as_deref()).await,
        Commands::Stats { friend, period } => cli::interactions::run_stats(settings, &friend, &period).await,
        Commands::Remind {
            friend,
            due,
            message,
        } => cli::reminders::run_remind(settings, &friend, &due, &message).await,
        Commands::Due { all } => cli::reminders::run_due(settings, all).await,
        Commands::Done { id } => cli::reminders::run_done(settings, &id).await,
        Commands::Watch { interval, log } => cli::reminders::run_watch(settings, interval, log).await,
        Commands::Analytics { period } => cli::analytics::run_analytics(settings, &period).await,
        Commands::Config { key, value, list } => {
            cli::config::run_config(key.as_deref(), value.as_deref(), list)
        }
    }
}
