use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{
    Chess, ClickReport, ConnectFour, GameController, HttpTransport, IgnoreReason, Outcome,
};
use shared::domain::GameKind;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod render;

use command::{Command, HELP};
use config::{load_settings, Settings};
use render::{render, TextBoard};

#[derive(Parser, Debug)]
#[command(about = "Play chess or Connect-Four against a remote engine")]
struct Args {
    #[arg(long, default_value = "play.toml")]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    game: Option<GameKind>,
    /// Side to play: white/black or red/yellow.
    #[arg(long)]
    side: Option<String>,
    #[arg(long)]
    two_player: bool,
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl Args {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(v) = self.server_url {
            settings.server_url = v;
        }
        if let Some(v) = self.game {
            settings.game = v;
        }
        if let Some(v) = self.side {
            settings.human_side = Some(v);
        }
        if self.two_player {
            settings.two_player = true;
        }
        if let Some(v) = self.timeout_ms {
            settings.request_timeout_ms = v;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(&args.config);
    let settings = args.apply(settings);
    info!(game = %settings.game, server = %settings.server_url, "starting session");

    match settings.game {
        GameKind::Chess => run::<Chess>(settings).await,
        GameKind::ConnectFour => run::<ConnectFour>(settings).await,
    }
}

async fn run<G: TextBoard>(settings: Settings) -> Result<()> {
    let transport = HttpTransport::new(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let mut controller = GameController::<G, _>::new(transport)
        .with_request_timeout(Duration::from_millis(settings.request_timeout_ms));

    if let Some(raw) = settings.human_side.as_deref() {
        let side = parse_side::<G>(raw)?;
        controller.set_human_side(side)?;
    }
    controller.set_two_player(settings.two_player)?;

    controller.new_game().await?;
    println!("{}", render(controller.session()));

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Some(note) = execute(&mut controller, command).await {
            println!("{note}");
        }
        println!("{}", render(controller.session()));
    }

    Ok(())
}

fn parse_side<G: TextBoard>(raw: &str) -> Result<G::Side> {
    raw.parse::<G::Side>()
        .map_err(|_| anyhow!("'{raw}' is not a side in {}", G::KIND))
}

/// Runs one command; returns a line to print before the board, if any.
async fn execute<G: TextBoard>(
    controller: &mut GameController<G, HttpTransport>,
    command: Command,
) -> Option<String> {
    debug!(?command, "executing command");
    let result = match command {
        Command::New => controller.new_game().await.map(describe_outcome),
        Command::Load(state) => controller.load_game(state).await.map(describe_outcome),
        Command::Ai => controller.retry_ai_move().await.map(describe_outcome),
        Command::Click(index) => controller.click(index).await.map(describe_click),
        Command::Drop(column) if G::KIND == GameKind::ConnectFour => {
            controller.click(column - 1).await.map(describe_click)
        }
        Command::Drop(_) => return Some("'drop' is only for Connect-Four".into()),
        Command::Side(raw) => match parse_side::<G>(&raw) {
            Ok(side) => controller
                .set_human_side(side)
                .map(|()| Some(format!("you will play {side} from the next game"))),
            Err(err) => return Some(err.to_string()),
        },
        Command::TwoPlayer(on) => controller
            .set_two_player(on)
            .map(|()| Some(format!("two-player {}", if on { "on" } else { "off" }))),
        Command::Help => return Some(HELP.into()),
        Command::Show | Command::Quit => return None,
    };

    match result {
        Ok(note) => note,
        Err(err) => Some(format!("cannot do that now: {err}")),
    }
}

fn describe_outcome(outcome: Outcome) -> Option<String> {
    match outcome {
        Outcome::Stale => Some("ignored a late engine reply".into()),
        _ => None,
    }
}

fn describe_click(report: ClickReport) -> Option<String> {
    match report {
        ClickReport::Ignored(IgnoreReason::RequestInFlight) => Some("still waiting for the engine".into()),
        ClickReport::Ignored(IgnoreReason::GameOver) => Some("the game is over; type 'new'".into()),
        ClickReport::Ignored(IgnoreReason::NoActiveGame) => Some("no game loaded; type 'new'".into()),
        ClickReport::Ignored(IgnoreReason::OutsideBoard) => Some("that cell is not on the board".into()),
        ClickReport::Ignored(IgnoreReason::NotSelectable) => Some("pick one of your own pieces".into()),
        ClickReport::Selected { .. }
        | ClickReport::Reselected { .. }
        | ClickReport::Cancelled
        | ClickReport::Played { .. } => None,
    }
}
