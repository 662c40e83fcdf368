// tests/state_flow.rs

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use macroquad::prelude::*;
use tile_quest::input::{Event, Keys};
use tile_quest::loader::json_loader::save_map_file;
use tile_quest::save::SaveSlots;
use tile_quest::states::build_states;
use tile_quest::{
    Control, Coord, DrawOp, LayerName, MapDescription, Recorder, Settings, Sheets, StateId, StateMachine, TileRef,
};

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tile_quest_flow_{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn world() -> (Rc<Settings>, Rc<Sheets>) {
    let dir = temp_dir();
    let settings = Settings {
        resource_dir: dir.clone(),
        save_path: dir.join("save.json"),
        ..Settings::default()
    };
    let mut map = MapDescription::blank();
    map.set_tile(
        LayerName::Solid,
        Coord(0, 0),
        TileRef {
            sheet: "base".into(),
            source: Coord(0, 0),
        },
    );
    save_map_file(&map, &settings.map_path(&settings.start_map)).expect("write start map");

    let mut sheets = Sheets::new();
    sheets.insert("base", Image::gen_image_color(100, 100, WHITE));
    (Rc::new(settings), Rc::new(sheets))
}

fn press(sm: &mut StateMachine, key: KeyCode) {
    sm.get_event(&Event::KeyDown(key));
}

fn step(sm: &mut StateMachine, now: f64) {
    sm.update(&Keys::new(), now, 1.0 / 60.0).expect("update");
}

#[test]
fn register_then_play_then_return() {
    let (settings, sheets) = world();
    let states = build_states(settings.clone(), sheets).expect("states");
    let mut sm = StateMachine::new();
    sm.setup_states(states, StateId::Select, 0.0).expect("setup");

    // empty slot goes to name entry
    press(&mut sm, KeyCode::Enter);
    step(&mut sm, 16.0);
    assert_eq!(sm.active(), Some(StateId::Register));

    press(&mut sm, KeyCode::Enter); // "A"
    press(&mut sm, KeyCode::Left);
    press(&mut sm, KeyCode::Up);
    press(&mut sm, KeyCode::Enter); // END
    step(&mut sm, 32.0);
    assert_eq!(sm.active(), Some(StateId::Select));
    let saves = SaveSlots::load(&settings.save_path).expect("saves");
    assert_eq!(saves.slots[0].player().map(|p| p.name.as_str()), Some("A"));

    // the filled slot now starts the game
    press(&mut sm, KeyCode::Enter);
    step(&mut sm, 48.0);
    assert_eq!(sm.active(), Some(StateId::Game));
    let mut canvas = Recorder::new();
    sm.draw(&mut canvas, 0.0);
    assert!(canvas.ops.contains(&DrawOp::Background));
    assert!(canvas.blitted_sheets().contains(&"base"));

    press(&mut sm, KeyCode::Escape);
    step(&mut sm, 64.0);
    assert_eq!(sm.active(), Some(StateId::Select));
    assert_eq!(sm.state(StateId::Select).map(|s| s.core().previous), Some(Some(StateId::Game)));
    let saves = SaveSlots::load(&settings.save_path).expect("saves");
    assert_eq!(saves.slots[0].player().map(|p| p.map.as_str()), Some("pond.json"));
}

#[test]
fn escape_on_select_stops_the_loop() {
    let (settings, sheets) = world();
    let mut sm = StateMachine::new();
    sm.setup_states(build_states(settings.clone(), sheets).expect("states"), StateId::Select, 0.0)
        .expect("setup");
    let mut control = Control::new(&settings, sm).expect("control");

    let mut canvas = Recorder::new();
    control
        .frame(0.0, &[Event::KeyDown(KeyCode::Escape)], Keys::new(), &mut canvas)
        .expect("frame");
    assert!(control.is_done());
}

#[test]
fn editor_opens_from_select() {
    let (settings, sheets) = world();
    let mut sm = StateMachine::new();
    sm.setup_states(build_states(settings, sheets).expect("states"), StateId::Select, 0.0)
        .expect("setup");
    press(&mut sm, KeyCode::E);
    step(&mut sm, 16.0);
    assert_eq!(sm.active(), Some(StateId::Edit));
}
