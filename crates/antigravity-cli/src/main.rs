//! antigravity - terminal chat with the Antigravity assistant

mod audio;
mod render;

use std::io::{BufRead, Write};

use clap::Parser;

use antigravity_chat::{AudioBackend, ChatSession, DiscardBackend, WidgetConfig};
use audio::CommandBackend;
use render::TerminalRenderer;

/// Terminal front-end for the Antigravity assistant chat
#[derive(Parser, Debug)]
#[command(name = "antigravity")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chat endpoint URL
    #[arg(
        long,
        default_value = "http://localhost:8000/api/antigravity/public/chat"
    )]
    endpoint: String,

    /// TTS endpoint URL; enables spoken replies
    #[arg(long)]
    tts_endpoint: Option<String>,

    /// Player command spoken replies are piped into
    #[arg(long, default_value = "mpv --no-video --really-quiet -")]
    player: String,

    /// Fetch synthesized speech but discard it instead of playing it
    #[arg(long)]
    no_audio: bool,

    /// Assistant display name
    #[arg(long, default_value = "Antigravity")]
    name: String,

    /// Session id prefix
    #[arg(long, default_value = "public_")]
    session_prefix: String,

    /// Greeting shown before the first prompt
    #[arg(long)]
    welcome: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("antigravity=debug")
            .init();
    }

    let mut config = WidgetConfig::new(&args.name, &args.endpoint)
        .with_session_prefix(&args.session_prefix);
    if let Some(welcome) = args.welcome {
        config = config.with_welcome(welcome);
    }
    if let Some(tts_endpoint) = args.tts_endpoint {
        config = config.with_tts_endpoint(tts_endpoint);
    }

    let backend: Box<dyn AudioBackend> = if args.no_audio {
        Box::new(DiscardBackend)
    } else {
        Box::new(CommandBackend::new(&args.player)?)
    };
    let session = ChatSession::new(config).with_audio_backend(backend);
    tracing::debug!("session id: {}", session.session_id());

    let stdout = std::io::stdout();
    let mut renderer = TerminalRenderer::new(stdout, args.name.clone());

    if let Some(greeting) = session.greet() {
        renderer.print_assistant(&greeting.content);
    }

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        // The prompt only returns after send completes, so at most one
        // request is ever in flight
        session.send(&line, &mut renderer).await;
    }

    session.handle().close();
    Ok(())
}
