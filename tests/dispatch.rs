use tapmark::app::{AppState, Effect, InputEvent, Key, Orientation};

fn state() -> AppState {
    AppState::new(640, 480, 50.0, false)
}

#[test]
fn press_activates_and_requests_click() {
    let mut state = state();
    let mut effects = Vec::new();

    state.handle(&InputEvent::PointerDown { index: 0, x: 60.0, y: 70.0 }, &mut effects);

    let location = state.slots.get(0).unwrap();
    assert!(location.valid);
    assert_eq!((location.rect.x, location.rect.y), (35.0, 45.0));
    assert_eq!(effects, vec![Effect::PlayClick]);
}

#[test]
fn click_plays_even_for_unknown_pointer() {
    let mut state = state();
    let mut effects = Vec::new();

    state.handle(&InputEvent::PointerDown { index: 17, x: 1.0, y: 1.0 }, &mut effects);

    assert_eq!(state.slots.active().count(), 0);
    assert_eq!(effects, vec![Effect::PlayClick]);
}

#[test]
fn release_deactivates_matching_slot() {
    let mut state = state();
    let mut effects = Vec::new();
    state.handle(&InputEvent::PointerDown { index: 5, x: 1.0, y: 1.0 }, &mut effects);
    state.handle(&InputEvent::PointerUp { index: 4, x: 1.0, y: 1.0 }, &mut effects);
    assert!(state.slots.get(5).unwrap().valid);

    state.handle(&InputEvent::PointerUp { index: 5, x: 1.0, y: 1.0 }, &mut effects);
    assert!(!state.slots.get(5).unwrap().valid);
}

#[test]
fn alt_enter_toggles_fullscreen_once_per_key_up() {
    let mut state = state();
    let mut effects = Vec::new();

    state.handle(&InputEvent::KeyUp { key: Key::Return, alt: false }, &mut effects);
    assert!(!state.fullscreen);
    assert!(effects.is_empty());

    state.handle(&InputEvent::KeyUp { key: Key::Return, alt: true }, &mut effects);
    assert!(state.fullscreen);
    state.handle(&InputEvent::KeyUp { key: Key::Return, alt: true }, &mut effects);
    assert!(!state.fullscreen);

    assert_eq!(
        effects,
        vec![Effect::SetFullscreen(true), Effect::SetFullscreen(false)]
    );
}

#[test]
fn escape_and_close_quit() {
    let mut effects = Vec::new();

    let mut closed = state();
    closed.handle(&InputEvent::Quit, &mut effects);
    assert!(closed.quit);

    let mut escaped = state();
    escaped.handle(&InputEvent::KeyUp { key: Key::Other, alt: false }, &mut effects);
    assert!(!escaped.quit);
    escaped.handle(&InputEvent::KeyUp { key: Key::Escape, alt: false }, &mut effects);
    assert!(escaped.quit);

    // nothing brings it back
    escaped.handle(&InputEvent::DidEnterForeground, &mut effects);
    assert!(escaped.quit);
}

#[test]
fn lifecycle_tracks_foreground() {
    let mut state = state();
    let mut effects = Vec::new();

    state.handle(&InputEvent::Hidden, &mut effects);
    assert!(!state.foreground);
    state.handle(&InputEvent::Shown, &mut effects);
    assert!(state.foreground);
    state.handle(&InputEvent::WillEnterBackground, &mut effects);
    assert!(!state.foreground);
    state.handle(&InputEvent::DidEnterForeground, &mut effects);
    assert!(state.foreground);
}

#[test]
fn resize_and_orientation() {
    let mut state = state();
    let mut effects = Vec::new();

    state.handle(&InputEvent::Resized { width: 480, height: 800 }, &mut effects);
    state.handle(&InputEvent::Orientation(Orientation::Portrait), &mut effects);

    assert_eq!((state.width, state.height), (480, 800));
    assert_eq!(effects, vec![Effect::Notify("portrait")]);
}
