//! CLI binary: a thin wrapper around the library.
//!
//! Handles argument parsing, logger initialization and JSON output
//! formatting; all client logic lives in the library crate. Session cookie
//! values come from flags or environment variables, since login itself is
//! performed outside this tool.

use std::time::Duration;

use anyhow::Result;
use structopt::StructOpt;

use interpals_client::{Client, SearchOptions, Session};

#[derive(Debug, StructOpt)]
#[structopt(name = "interpals", about = "Unofficial Interpals client")]
struct Opt {
    /// Account username the session belongs to
    #[structopt(long, env = "INTERPALS_USERNAME")]
    username: String,

    /// Value of the interpals_sessid cookie
    #[structopt(long, env = "INTERPALS_SESSID", hide_env_values = true)]
    session_id: String,

    /// Value of the csrf_cookieV2 cookie
    #[structopt(long, env = "INTERPALS_CSRF", hide_env_values = true)]
    csrf_cookie: String,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Fetch and print a user's profile
    Profile { user: String },
    /// Resolve a username to its internal uid
    Uid { user: String },
    /// Run a keyword search
    Search {
        #[structopt(long, default_value = "")]
        keywords: String,
        #[structopt(long, default_value = "50")]
        limit: usize,
        /// Seconds to wait between result pages
        #[structopt(long, default_value = "1")]
        delay: u64,
    },
    /// List inbox thread summaries
    Chats {
        #[structopt(long, default_value = "9")]
        count: usize,
    },
    /// Load the messages of one thread
    Messages { thread_id: String },
    /// List a user's friends
    Friends { uid: String },
    /// List a user's photo albums
    Albums { uid: String },
    /// List the pictures in one album
    Pictures { uid: String, aid: String },
    /// List usernames that recently viewed this profile
    Visitors,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let opt = Opt::from_args();
    let session = Session::new(opt.username, opt.session_id, opt.csrf_cookie);
    let client = Client::new(session);

    let output = match opt.command {
        Command::Profile { user } => {
            serde_json::to_string_pretty(&client.profile(&user).await?)?
        }
        Command::Uid { user } => client.get_uid(&user).await?,
        Command::Search {
            keywords,
            limit,
            delay,
        } => {
            let options = SearchOptions {
                keywords,
                ..SearchOptions::default()
            };
            let results = client
                .search_collect(&options, limit, Duration::from_secs(delay))
                .await?;
            serde_json::to_string_pretty(&results)?
        }
        Command::Chats { count } => {
            serde_json::to_string_pretty(&client.chat(count, 0).await?)?
        }
        Command::Messages { thread_id } => {
            serde_json::to_string_pretty(&client.chat_messages(&thread_id, None).await?)?
        }
        Command::Friends { uid } => serde_json::to_string_pretty(&client.friends(&uid).await?)?,
        Command::Albums { uid } => serde_json::to_string_pretty(&client.albums(&uid).await?)?,
        Command::Pictures { uid, aid } => {
            serde_json::to_string_pretty(&client.pictures(&uid, &aid).await?)?
        }
        Command::Visitors => serde_json::to_string_pretty(&client.visitors().await?)?,
    };

    println!("{output}");
    Ok(())
}
