//! Arcade Loop entry point
//!
//! On the web: wires keyboard/touch input, the frame driver and the DOM HUD.
//! Natively: plays a short scripted session of every game headlessly.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, KeyboardEvent, TouchEvent};

    use arcade_loop::consts::*;
    use arcade_loop::persistence::{LocalStorageGateway, PlayerContext, ProgressTracker};
    use arcade_loop::platform::{Action, CombinedInput, InputPoller, KeyboardState, TouchControls, is_mobile};
    use arcade_loop::sim::SessionState;
    use arcade_loop::{FrameDriver, GameKind, Settings, Tuning, format_number, format_time};

    /// LocalStorage key of the local player id
    const PLAYER_ID_KEY: &str = "arcade_player_id";
    /// Joystick diameter (px)
    const JOYSTICK_SIZE: f32 = 120.0;

    struct App {
        driver: FrameDriver<LocalStorageGateway>,
        keyboard: KeyboardState,
        touch: Option<TouchControls>,
        poller: InputPoller,
        last_time: f64,
        show_fps: bool,
        /// Set by focus/visibility loss, consumed by the next frame
        pause_requested: bool,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            let mut input = self
                .poller
                .poll(&CombinedInput::new(&self.keyboard, self.touch.as_ref()));
            if std::mem::take(&mut self.pause_requested) && self.driver.state().session.is_playing() {
                input.pause = true;
            }
            self.driver.record_frame_time(time);
            self.driver.frame(dt, &input);
        }

        fn update_hud(&self, document: &Document) {
            let session = &self.driver.state().session;
            let set_text = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };
            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };

            set_text("#hud-score .hud-value", &format_number(session.score));
            set_text("#hud-lives .hud-value", &session.lives.to_string());
            set_text("#hud-level .hud-value", &session.level.to_string());
            set_text("#hud-time .hud-value", &format_time(session.elapsed));
            if let Some(high) = session.scoreboard.high_score {
                set_text("#hud-high .hud-value", &format_number(high.max(session.score)));
            }
            if session.combo > 1 {
                set_text("#hud-combo .hud-value", &format!("x{}", session.combo));
            }
            show("hud-combo", session.combo > 1);
            if self.show_fps {
                set_text("#hud-fps .hud-value", &self.driver.fps().to_string());
            }

            show("start-prompt", session.state == SessionState::Start);
            show("pause-menu", session.state == SessionState::Paused);
            show("game-over", session.state.is_terminal());
            if session.state.is_terminal() {
                set_text("#final-score", &format_number(session.score));
                set_text("#final-time", &format_time(session.elapsed));
                show("new-high-score", session.scoreboard.new_high_score);
                if let Some(list) = document.get_element_by_id("leaderboard") {
                    render_leaderboard(document, &list, &session.scoreboard.leaderboard);
                }
            }
        }
    }

    fn render_leaderboard(document: &Document, list: &Element, rows: &[arcade_loop::leaderboard::LeaderboardEntry]) {
        list.set_inner_html("");
        for (rank, row) in rows.iter().enumerate() {
            let Ok(item) = document.create_element("li") else {
                continue;
            };
            item.set_text_content(Some(&format!(
                "{}. {} {} ({})",
                rank + 1,
                row.user_name,
                format_number(row.score),
                arcade_loop::leaderboard::format_date(row.timestamp)
            )));
            let _ = list.append_child(&item);
        }
    }

    /// Game chosen by the page: `<body data-game="runner-3d">`
    fn selected_game(document: &Document) -> GameKind {
        document
            .body()
            .and_then(|b| b.get_attribute("data-game"))
            .and_then(|id| GameKind::from_id(&id))
            .unwrap_or(GameKind::CubeJumper)
    }

    /// Stable anonymous id for this browser
    fn local_player() -> Option<PlayerContext> {
        let storage = web_sys::window()?.local_storage().ok()??;
        let id = match storage.get_item(PLAYER_ID_KEY).ok()? {
            Some(id) => id,
            None => {
                let id = format!("local-{}", js_sys::Date::now() as u64);
                let _ = storage.set_item(PLAYER_ID_KEY, &id);
                id
            }
        };
        Some(PlayerContext::new(id))
    }

    fn touch_layout(game: GameKind) -> TouchControls {
        let mut touch = TouchControls::new(JOYSTICK_SIZE);
        match game {
            GameKind::CubeJumper => touch.add_button("jump", Action::Primary),
            GameKind::Runner => {
                touch.add_button("left", Action::Left);
                touch.add_button("right", Action::Right);
                touch.add_button("jump", Action::Primary);
                touch.add_button("duck", Action::Down);
            }
            GameKind::SpaceShooter => touch.add_button("fire", Action::Primary),
            GameKind::Racing => {}
        }
        touch.add_button("start", Action::Start);
        touch.add_button("pause", Action::Pause);
        touch
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let game = selected_game(&document);
        let settings = Settings::load();
        log::info!("Arcade Loop starting {}...", game.id());

        let Some(gateway) = LocalStorageGateway::new() else {
            log::error!("LocalStorage unavailable, cannot start");
            return;
        };
        let tracker = ProgressTracker::new(game, gateway, local_player());
        let seed = js_sys::Date::now() as u64;
        let driver = FrameDriver::new(game, seed, Tuning::default(), &settings, tracker);

        let user_agent = window.navigator().user_agent().unwrap_or_default();
        let width = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(1024.0);
        let touch = settings
            .touch_enabled(is_mobile(&user_agent, width))
            .then(|| touch_layout(game));

        let app = Rc::new(RefCell::new(App {
            driver,
            keyboard: KeyboardState::new(),
            touch,
            poller: InputPoller::new(),
            last_time: 0.0,
            show_fps: settings.show_fps,
            pause_requested: false,
        }));

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        setup_keyboard(&window, app.clone());
        if app.borrow().touch.is_some() {
            setup_touch(&document, app.clone());
        }
        setup_auto_pause(&window, &document, app.clone());

        request_animation_frame(app);
        log::info!("Arcade Loop running (seed {})", seed);
    }

    fn setup_keyboard(window: &web_sys::Window, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if app.borrow_mut().keyboard.key_down(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().keyboard.key_up(&event.key());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn listen_touch<F>(target: &Element, kind: &str, mut handler: F)
    where
        F: FnMut(&TouchEvent) + 'static,
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
            event.prevent_default();
            handler(&event);
        });
        let _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_touch(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(base) = document.get_element_by_id("touch-joystick") {
            {
                let app = app.clone();
                let base_el = base.clone();
                listen_touch(&base, "touchstart", move |event| {
                    let Some(first) = event.touches().get(0) else {
                        return;
                    };
                    let rect = base_el.get_bounding_client_rect();
                    let center = glam::Vec2::new(
                        (rect.left() + rect.width() / 2.0) as f32,
                        (rect.top() + rect.height() / 2.0) as f32,
                    );
                    if let Some(touch) = app.borrow_mut().touch.as_mut() {
                        touch.set_center(center);
                        touch.joystick_start(first.identifier());
                    }
                });
            }
            {
                let app = app.clone();
                listen_touch(&base, "touchmove", move |event| {
                    let touches = event.touches();
                    let mut a = app.borrow_mut();
                    let Some(touch) = a.touch.as_mut() else {
                        return;
                    };
                    for i in 0..touches.length() {
                        if let Some(t) = touches.get(i) {
                            let at = glam::Vec2::new(t.client_x() as f32, t.client_y() as f32);
                            touch.joystick_move(t.identifier(), at);
                        }
                    }
                });
            }
            for kind in ["touchend", "touchcancel"] {
                let app = app.clone();
                listen_touch(&base, kind, move |event| {
                    let changed = event.changed_touches();
                    let mut a = app.borrow_mut();
                    let Some(touch) = a.touch.as_mut() else {
                        return;
                    };
                    for i in 0..changed.length() {
                        if let Some(t) = changed.get(i) {
                            touch.joystick_end(t.identifier());
                        }
                    }
                });
            }
        }

        for id in ["jump", "duck", "left", "right", "fire", "start", "pause"] {
            let Some(button) = document.get_element_by_id(&format!("touch-btn-{}", id)) else {
                continue;
            };
            {
                let app = app.clone();
                listen_touch(&button, "touchstart", move |_| {
                    if let Some(touch) = app.borrow_mut().touch.as_mut() {
                        touch.button_down(id);
                    }
                });
            }
            {
                let app = app.clone();
                listen_touch(&button, "touchend", move |_| {
                    if let Some(touch) = app.borrow_mut().touch.as_mut() {
                        touch.button_up(id);
                    }
                });
            }
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, document: &Document, app: Rc<RefCell<App>>) {
        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    app.borrow_mut().pause_requested = true;
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside): also drop held keys
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut a = app.borrow_mut();
                a.keyboard.clear();
                if let Some(touch) = a.touch.as_mut() {
                    touch.reset();
                }
                a.pause_requested = true;
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.frame(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                a.update_hud(&document);
            }
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Arcade Loop (native) starting...");
    log::info!("Native mode runs a headless demo - serve the wasm build for the playable version");

    for game in arcade_loop::GameKind::ALL {
        demo::play(game);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;

    use arcade_loop::consts::SIM_DT;
    use arcade_loop::leaderboard::format_date;
    use arcade_loop::persistence::{MemoryGateway, PlayerContext, ProgressTracker};
    use arcade_loop::sim::{FrameInput, GameEvent};
    use arcade_loop::{FrameDriver, GameKind, Settings, Tuning, format_number, format_time};

    /// Longest simulated session per game (seconds)
    const DEMO_SECONDS: f32 = 90.0;

    /// Scripted "autopilot" input for frame `i`
    fn autopilot(game: GameKind, i: u32) -> FrameInput {
        let t = i as f32 * SIM_DT;
        let mut input = FrameInput {
            start: i == 0,
            ..Default::default()
        };
        match game {
            // Hold for half a second, then release
            GameKind::CubeJumper => input.jump = i % 90 < 30,
            GameKind::Runner => {
                input.left = i % 150 == 40;
                input.right = i % 150 == 110;
                input.jump = i % 70 == 0;
            }
            GameKind::SpaceShooter => {
                input.steer = Vec2::new((t * 0.7).sin(), (t * 0.3).cos() * 0.5);
                input.fire = true;
            }
            GameKind::Racing => {
                input.steer = Vec2::new(-(t * 0.4).sin().signum() * 0.6, 1.0);
            }
        }
        input
    }

    pub fn play(game: GameKind) {
        let ctx = PlayerContext::new("demo").with_display_name("Demo Pilot");
        let tracker = ProgressTracker::new(game, MemoryGateway::new(), Some(ctx));
        let mut driver = FrameDriver::new(game, 2024, Tuning::default(), &Settings::default(), tracker);

        let frames = (DEMO_SECONDS / SIM_DT) as u32;
        let mut ended = false;
        for i in 0..frames {
            for event in driver.frame(SIM_DT, &autopilot(game, i)) {
                if let GameEvent::Ended(request) = event {
                    log::info!("{} ended: {:?}", game.id(), request.terminal);
                    ended = true;
                }
            }
            if ended {
                // One more frame so the flush outcome lands
                driver.frame(SIM_DT, &FrameInput::default());
                break;
            }
        }

        let session = &driver.state().session;
        println!(
            "{:<14} score {:>8}  level {:>2}  time {}  state {:?}",
            game.id(),
            format_number(session.score),
            session.level,
            format_time(session.elapsed),
            session.state
        );
        for (rank, row) in session.scoreboard.leaderboard.iter().enumerate() {
            println!(
                "    {}. {} {} ({})",
                rank + 1,
                row.user_name,
                format_number(row.score),
                format_date(row.timestamp)
            );
        }
    }
}
