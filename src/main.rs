use anyhow::Context;
use macroquad::prelude::*;
use std::path::Path;
use std::rc::Rc;

use tile_quest::assets::Assets;
use tile_quest::config::SCREEN_SIZE;
use tile_quest::states::build_states;
use tile_quest::{Control, Screen, Settings, StateId, StateMachine};

const SETTINGS_PATH: &str = "settings.json";

fn window_conf() -> Conf {
    Conf {
        window_title: "Tile Quest".into(),
        window_width: SCREEN_SIZE.x as i32,
        window_height: SCREEN_SIZE.y as i32,
        window_resizable: false,
        ..Default::default()
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::load(Path::new(SETTINGS_PATH)).context("loading settings")?;
    let assets = Assets::load(&settings.resource_dir)
        .await
        .with_context(|| format!("loading resources from {}", settings.resource_dir.display()))?;

    let mut font = None;
    if let Some((name, path)) = assets.fonts.iter().min_by(|a, b| a.0.cmp(b.0)) {
        match load_ttf_font(&path.to_string_lossy()).await {
            Ok(f) => font = Some(f),
            Err(err) => log::warn!("Font '{name}' failed to load, using the default: {err}"),
        }
    }
    let mut screen = Screen::new(assets.textures, font);

    let settings = Rc::new(settings);
    let states = build_states(settings.clone(), Rc::new(assets.sheets))?;
    let mut state_machine = StateMachine::new();
    state_machine.setup_states(states, StateId::Select, get_time() * 1000.0)?;

    let mut control = Control::new(&settings, state_machine)?;
    control.main(&mut screen).await?;
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run().await {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
