//! Headless client
//!
//! Runs a session without a window for a fixed number of ticks, feeding it
//! a short scripted walk. Offline by default; pass `host port` to join an
//! authority instead.
//!
//! ```text
//! cargo run --example headless_client
//! cargo run --example headless_client -- 127.0.0.1 4080
//! RUST_LOG=debug cargo run --example headless_client
//! ```
//!
//! A `cubious.toml` in the working directory overrides the defaults.

use cubious::{
    EngineConfig, FileStore, GameSession, InputEvent, KeyCode, MouseButton, PersistenceBackend,
    TcpTransport, TerrainGenerator, Transport,
};
use std::collections::VecDeque;
use std::path::Path;

const TICKS: u64 = 600;
const DT: f32 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = if Path::new("cubious.toml").exists() {
        EngineConfig::load("cubious.toml")?
    } else {
        EngineConfig::default()
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [host, port] = args.as_slice() {
        config.authority = Some(format!("{}:{}", host, port));
    }

    let transport: Option<Box<dyn Transport>> = match &config.authority {
        Some(addr) => Some(Box::new(TcpTransport::connect(addr)?)),
        None => None,
    };
    let persistence: Option<Box<dyn PersistenceBackend>> = match &config.data_dir {
        Some(dir) => Some(Box::new(FileStore::open(dir)?)),
        None => None,
    };

    let generator = Box::new(TerrainGenerator::new(config.seed));
    let mut session = GameSession::start(config, generator, persistence, transport)?;

    let mut events = VecDeque::new();
    for tick in 0..TICKS {
        script(tick, &mut events);
        session.tick(DT, &mut events)?;

        for notice in session.take_notices() {
            println!("[notice] {}", notice);
        }
        if !session.is_running() {
            break;
        }
    }

    let player = session.player();
    let stats = session.world().stats();
    println!(
        "ticks={} position=({:.2}, {:.2}, {:.2}) chunks={} pending={} created={} evicted={} connected={}",
        session.ticks(),
        player.position.x,
        player.position.y,
        player.position.z,
        stats.loaded_chunks,
        stats.pending_chunks,
        stats.chunks_created,
        stats.chunks_evicted,
        session.is_connected(),
    );
    if let Some(hit) = session.focused_block() {
        println!("looking at {:?} ({:?})", hit.position, hit.block);
    }

    session.shutdown()?;
    Ok(())
}

/// Walk forward, hop twice, place a block and say hello
fn script(tick: u64, events: &mut VecDeque<InputEvent>) {
    match tick {
        0 => events.push_back(InputEvent::KeyPressed(KeyCode::W)),
        120 | 240 => events.push_back(InputEvent::KeyPressed(KeyCode::Space)),
        121 | 241 => events.push_back(InputEvent::KeyReleased(KeyCode::Space)),
        300 => {
            events.push_back(InputEvent::KeyReleased(KeyCode::W));
            events.push_back(InputEvent::MouseMoved { dx: 0.0, dy: 200.0 });
        }
        301 => {
            events.push_back(InputEvent::KeyPressed(KeyCode::Digit(5)));
            events.push_back(InputEvent::MousePressed(MouseButton::Right));
        }
        360 => {
            events.extend("thello".chars().map(InputEvent::Char));
            events.push_back(InputEvent::KeyPressed(KeyCode::Enter));
        }
        _ => {}
    }
}
