use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hand_notes::{
    initial_route, ApiClient, AudioFile, AuthFlow, AuthProbe, Catalog, Config, FileSessionStore,
    InitialRoute, ProfileService, RecorderConfig, RecorderController, SessionStore, UploadClient,
    UploadRequest, WavRecorder,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Frame size used when replaying a WAV file through the recorder
const REPLAY_FRAME_MS: u64 = 100;

#[derive(Parser)]
#[command(name = "hand-notes", version, about = "Record, upload and review poker hand notes")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/hand-notes")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show whether a session is stored
    Status,
    /// Log in (or register) with a phone number and OTP
    Login {
        #[arg(long)]
        phone: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Run a WAV file through the recorder and upload the result
    Record {
        source: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// Upload an existing audio file
    Upload {
        file: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// List transcripts
    Transcripts,
    /// Show one transcript
    Transcript { id: String },
    /// List players
    Players,
    /// Show a player's hands and notes
    Player { id: String },
    /// Ask the server to analyze a player
    Analyze { id: String },
    /// Show the profile
    Profile,
    /// Change the username
    Rename { username: String },
    /// Change the phone number
    ChangePhone { number: String, otp: String },
    /// Delete the account
    DeleteAccount {
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;
    info!("API: {}", cfg.api.base_url);

    let result = run(cli.command, &cfg).await;

    if let Err(e) = &result {
        if e
            .downcast_ref::<hand_notes::Error>()
            .is_some_and(hand_notes::Error::requires_reauth)
        {
            eprintln!("Session missing or expired. Run `hand-notes login` first.");
        }
    }

    result
}

async fn run(command: Command, cfg: &Config) -> Result<()> {
    let api = ApiClient::from_config(&cfg.api)?;
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(cfg.session_path()));

    match command {
        Command::Status => match initial_route(store.as_ref()).await {
            InitialRoute::Main => {
                let session = store.get().await?.context("Session disappeared")?;
                println!("Logged in as {} ({})", session.username, session.user_id);
            }
            InitialRoute::Login => println!("Not logged in"),
        },

        Command::Login { phone } => login(api, store, phone).await?,

        Command::Logout => {
            hand_notes::session::logout(store.as_ref()).await?;
            println!("Logged out");
        }

        Command::Record {
            source,
            description,
        } => record(api, store, cfg, &source, description).await?,

        Command::Upload { file, description } => {
            let user_id = store.get().await?.map(|s| s.user_id);
            let mut request = UploadRequest::new(file.clone(), &cfg.upload, user_id);
            if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
                request.file_name = name.to_string();
            }
            if let Some(mime) = mime_for(&file) {
                request.mime_type = mime.to_string();
            }
            if let Some(d) = description {
                request = request.with_description(d);
            }

            let receipt = UploadClient::new(api).upload(&request).await?;
            print_upload(receipt.success);
        }

        Command::Transcripts => {
            for t in Catalog::new(api, store).transcripts().await? {
                println!(
                    "{}  {} {}  {}",
                    t.transcript_id,
                    t.date_label().unwrap_or_default(),
                    t.time_label().unwrap_or_default(),
                    t.summary
                );
            }
        }

        Command::Transcript { id } => {
            let t = Catalog::new(api, store).transcript(&id).await?;
            println!("{} ({})", t.filename, t.created_at);
            println!("\nSummary:\n{}", t.summary);
            println!("\nInsight:\n{}", t.insight);
            println!("\nTranscript:\n{}", t.transcript);
        }

        Command::Players => {
            for p in Catalog::new(api, store).players().await? {
                println!(
                    "{}  {:<20} {:>4} hands {:>4} wins ({:.0}%)  updated {}",
                    p.id,
                    p.name,
                    p.total_hands,
                    p.total_wins,
                    p.win_rate() * 100.0,
                    p.updated_label().unwrap_or_default()
                );
            }
        }

        Command::Player { id } => print_details(&Catalog::new(api, store).hands_notes(&id).await?),

        Command::Analyze { id } => print_details(&Catalog::new(api, store).analyze(&id).await?),

        Command::Profile => {
            let p = ProfileService::new(api, store).fetch().await?;
            println!("{} ({})", p.username, p.mobile_number);
            println!("Verified: {}", p.is_verified);
        }

        Command::Rename { username } => {
            let p = ProfileService::new(api, store).update_username(&username).await?;
            println!("Username updated successfully: {}", p.username);
        }

        Command::ChangePhone { number, otp } => {
            ProfileService::new(api, store)
                .change_phone_number(&number, &otp)
                .await?;
            println!("Phone number changed successfully.");
        }

        Command::DeleteAccount { yes } => {
            if !yes {
                bail!("This cannot be undone; pass --yes to confirm");
            }
            ProfileService::new(api, store).delete_account().await?;
            println!("Account deleted successfully");
        }
    }

    Ok(())
}

async fn login(api: ApiClient, store: Arc<dyn SessionStore>, phone: Option<String>) -> Result<()> {
    let mut flow = AuthFlow::new(api, store);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let phone = match phone {
        Some(p) => p,
        None => prompt(&mut lines, "Phone number (10-15 digits): ").await?,
    };

    let probe = flow.request_otp(&phone).await?;
    println!("OTP sent successfully");

    let otp = prompt(&mut lines, "OTP: ").await?;
    let username = match probe {
        AuthProbe::Unknown => Some(prompt(&mut lines, "New account, choose a username: ").await?),
        AuthProbe::Known { .. } => None,
    };

    let session = flow
        .verify_otp(&phone, &otp, username.as_deref())
        .await?;
    println!("Welcome, {}", session.username);

    Ok(())
}

async fn record(
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    cfg: &Config,
    source: &Path,
    description: Option<String>,
) -> Result<()> {
    let audio = AudioFile::open(source)?;
    if audio.sample_rate != cfg.audio.sample_rate || audio.channels != cfg.audio.channels {
        bail!(
            "{} is {}Hz/{}ch but the recorder is configured for {}Hz/{}ch",
            source.display(),
            audio.sample_rate,
            audio.channels,
            cfg.audio.sample_rate,
            cfg.audio.channels
        );
    }

    let recorder = WavRecorder::new(RecorderConfig {
        output_dir: cfg.recordings_path(),
        sample_rate: cfg.audio.sample_rate,
        channels: cfg.audio.channels,
    });
    let feed = recorder.feed();

    let mut controller = RecorderController::new(
        Box::new(recorder),
        UploadClient::new(api),
        store,
        cfg.upload.clone(),
    );

    if !controller.mount().await? {
        bail!("Please grant audio recording permissions");
    }
    controller.start().await?;

    for frame in audio.frames(REPLAY_FRAME_MS) {
        if !feed.push(frame).await {
            break;
        }
    }

    controller.stop().await?;
    let receipt = controller.finish_upload(description).await?;
    print_upload(receipt.success);

    Ok(())
}

async fn prompt<R>(lines: &mut tokio::io::Lines<R>, label: &str) -> Result<String>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;

    let line = lines.next_line().await?.context("Input closed")?;
    Ok(line.trim().to_string())
}

fn print_upload(success: bool) {
    if success {
        println!("Recording uploaded successfully");
    } else {
        println!("Upload finished but the server did not confirm success");
    }
}

fn print_details(details: &hand_notes::api::PlayerDetails) {
    let p = &details.player;
    println!("{}: {} hands, {} wins", p.name, p.total_hands, p.total_wins);
    if let Some(strengths) = &p.strengths {
        println!("Strengths: {}", strengths.join(", "));
    }
    if let Some(weaknesses) = &p.weaknesses {
        println!("Weaknesses: {}", weaknesses.join(", "));
    }

    for hn in &details.hand_and_notes {
        let outcome = if hn.hand.i_won { "won" } else { "lost" };
        println!("\n[{}] {} from {}, {}", hn.hand.date, hn.hand.id, hn.hand.my_position, outcome);
        println!("  {}", hn.note.summary);
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "wav" => Some("audio/wav"),
        "m4a" => Some("audio/x-m4a"),
        "mp3" => Some("audio/mpeg"),
        _ => None,
    }
}
