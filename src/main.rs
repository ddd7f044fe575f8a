use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use moodlist::{
    cli, config, error,
    language::Language,
    mood::Mood,
    pipeline::GenerationRequest,
    types::PkceToken,
};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Forget the cached Spotify session
    Logout,

    /// Generate a playlist for a mood
    Generate(GenerateOptions),

    /// Generate a playlist from a free-text description
    Custom(CustomOptions),

    /// Show the playlist waiting to be saved or discarded
    Preview,

    /// Keep the pending playlist
    Save,

    /// Throw the pending playlist away
    Discard,

    /// List moods and their target audio features
    Moods,

    /// List languages and their markets
    Languages,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateOptions {
    /// Mood to generate for; guessed from your library with --ai when omitted
    #[clap(long)]
    mood: Option<Mood>,

    /// Language code, e.g. `es`, or `any`
    #[clap(long, default_value = "any")]
    language: Language,

    /// Let the text model suggest songs
    #[clap(long)]
    ai: bool,

    /// Number of tracks (25 by default, 15 with --ai)
    #[clap(long)]
    count: Option<usize>,

    /// Playlist name
    #[clap(long)]
    name: Option<String>,

    /// Keep the playlist local until it is saved
    #[clap(long)]
    defer: bool,

    /// Seed for a reproducible track order
    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct CustomOptions {
    /// What the playlist should sound like
    #[clap(long)]
    prompt: String,

    /// Playlist name
    #[clap(long)]
    name: Option<String>,

    /// Language code, e.g. `es`, or `any`
    #[clap(long, default_value = "any")]
    language: Language,

    /// Number of tracks (20 by default)
    #[clap(long)]
    count: Option<usize>,

    /// Keep the playlist local until it is saved
    #[clap(long)]
    defer: bool,

    /// Seed for a reproducible track order
    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

impl GenerateOptions {
    fn into_request(self) -> GenerationRequest {
        let mut request = if self.ai {
            GenerationRequest::ai(self.mood, self.language)
        } else {
            GenerationRequest::basic(self.mood.unwrap_or(Mood::Chill), self.language)
        };
        request.count = self.count;
        request.name = self.name;
        request.deferred(self.defer)
    }
}

impl CustomOptions {
    fn into_request(self) -> GenerationRequest {
        let mut request = GenerationRequest::custom(self.prompt, self.language);
        request.count = self.count;
        request.name = self.name;
        request.deferred(self.defer)
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Logout => cli::logout().await,
        Command::Generate(opt) => {
            let seed = opt.seed;
            cli::generate(opt.into_request(), seed).await
        }
        Command::Custom(opt) => {
            let seed = opt.seed;
            cli::generate(opt.into_request(), seed).await
        }
        Command::Preview => cli::preview().await,
        Command::Save => cli::save().await,
        Command::Discard => cli::discard().await,
        Command::Moods => cli::moods(),
        Command::Languages => cli::languages(),
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
