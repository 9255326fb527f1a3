//! Fruit Bowl entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, MouseEvent};

    use fruit_bowl::assets::{AssetCatalog, ITEM_TYPES, ProceduralSource};
    use fruit_bowl::input::client_to_ndc;
    use fruit_bowl::sim::{GameSession, SessionPhase};
    use fruit_bowl::{HighScores, Settings};

    /// Shell state around the session
    struct Shell {
        session: GameSession,
        last_time: f64,
        score_recorded: bool,
    }

    impl Shell {
        /// Update HUD elements in DOM
        fn update_hud(&mut self, document: &Document) {
            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&format!("Score: {}", self.session.score)));
            }

            if let Some(el) = document.get_element_by_id("timer") {
                el.set_text_content(Some(&self.session.timer.format()));
                // Urgency treatment for the last 30 seconds
                if self.session.timer.remaining() <= 30 {
                    let _ = el.class_list().add_1("urgent");
                }
            }

            // Tray slots: class + label per occupancy
            for index in 0..self.session.tray.size() {
                let Some(el) = document.get_element_by_id(&format!("slot-{index}")) else {
                    continue;
                };
                match self.session.tray.kind_at(index) {
                    Some(kind) => {
                        let _ = el.class_list().add_1("filled");
                        el.set_text_content(Some(kind.as_str()));
                    }
                    None => {
                        let _ = el.class_list().remove_1("filled");
                        el.set_text_content(None);
                    }
                }
            }

            // Game over overlay
            if let Some(el) = document.get_element_by_id("game-over") {
                if self.session.phase == SessionPhase::GameOver {
                    let _ = el.class_list().remove_1("hidden");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&self.session.score.to_string()));
                    }
                    if !self.score_recorded {
                        self.score_recorded = true;
                        let mut scores = HighScores::load();
                        if let Some(rank) = scores.record(
                            self.session.score,
                            self.session.matches_cleared,
                            js_sys::Date::now(),
                        ) {
                            log::info!("new high score, rank {rank}");
                        }
                        scores.save();
                        render_leaderboard(document, &scores);
                    }
                } else {
                    let _ = el.class_list().add_1("hidden");
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Fruit Bowl starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let settings = Settings::load();

        // Models: a GLB-backed source plugs in here alongside the renderer;
        // until then the procedural placeholders keep the game playable
        let catalog = match AssetCatalog::load(&ProceduralSource, &ITEM_TYPES) {
            Ok(catalog) => catalog,
            Err(err) => {
                log::error!("cannot start: {err}");
                return;
            }
        };

        // Assets are ready; drop the blocking load screen
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let mut session = GameSession::new(settings.config, catalog, seed);
        session.camera.aspect = canvas.client_width() as f32 / canvas.client_height() as f32;
        log::info!("Session initialized with seed: {seed}");

        build_tray_widgets(&document, settings.config.tray_size);

        let shell = Rc::new(RefCell::new(Shell {
            session,
            last_time: 0.0,
            score_recorded: false,
        }));

        setup_click_handler(&canvas, shell.clone());
        setup_slot_handlers(&document, settings.config.tray_size, shell.clone());
        setup_restart_button(&document, shell.clone());
        setup_timer_interval(shell.clone());

        request_animation_frame(shell);

        log::info!("Fruit Bowl running!");
    }

    /// Fill the game-over overlay's leaderboard list
    fn render_leaderboard(document: &Document, scores: &HighScores) {
        let Some(list) = document.get_element_by_id("highscore-list") else {
            return;
        };
        list.set_inner_html("");
        if scores.is_empty() {
            list.set_text_content(Some("No scores yet"));
            return;
        }
        for (index, entry) in scores.entries().iter().enumerate() {
            let row: Element = document.create_element("div").expect("create row");
            let _ = row.class_list().add_1("highscore-row");
            row.set_text_content(Some(&format!(
                "{}. {} ({} matches)",
                index + 1,
                entry.score,
                entry.matches
            )));
            let _ = list.append_child(&row);
        }
    }

    /// Create the fixed grid of tray slot widgets
    fn build_tray_widgets(document: &Document, tray_size: usize) {
        let Some(container) = document.get_element_by_id("collection") else {
            return;
        };
        container.set_inner_html("");
        for index in 0..tray_size {
            let slot: Element = document.create_element("div").expect("create slot");
            slot.set_id(&format!("slot-{index}"));
            let _ = slot.class_list().add_1("collection-slot");
            let _ = container.append_child(&slot);
        }
    }

    fn setup_click_handler(canvas: &HtmlCanvasElement, shell: Rc<RefCell<Shell>>) {
        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let rect = canvas_clone.get_bounding_client_rect();
            let ndc = client_to_ndc(
                event.client_x() as f32 - rect.left() as f32,
                event.client_y() as f32 - rect.top() as f32,
                rect.width() as f32,
                rect.height() as f32,
            );
            shell.borrow_mut().session.handle_click(ndc);
        });
        let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Clicking a filled slot returns its fruit to the bowl
    fn setup_slot_handlers(document: &Document, tray_size: usize, shell: Rc<RefCell<Shell>>) {
        for index in 0..tray_size {
            let Some(slot) = document.get_element_by_id(&format!("slot-{index}")) else {
                continue;
            };
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                shell.borrow_mut().session.return_slot(index);
            });
            let _ = slot.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(document: &Document, shell: Rc<RefCell<Shell>>) {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                let mut s = shell.borrow_mut();
                s.session.restart(seed);
                s.score_recorded = false;
                // Clear timer urgency from the previous session
                if let Some(window) = web_sys::window() {
                    if let Some(document) = window.document() {
                        if let Some(el) = document.get_element_by_id("timer") {
                            let _ = el.class_list().remove_1("urgent");
                        }
                    }
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// The countdown runs on its own coarse 1 Hz interval, independent of the
    /// frame loop
    fn setup_timer_interval(shell: Rc<RefCell<Shell>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut()>::new(move || {
            shell.borrow_mut().session.tick_timer();
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            1000,
        );
        closure.forget();
    }

    fn request_animation_frame(shell: Rc<RefCell<Shell>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            game_loop(shell, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(shell: Rc<RefCell<Shell>>, time: f64) {
        {
            let mut s = shell.borrow_mut();

            let dt = if s.last_time > 0.0 {
                ((time - s.last_time) / 1000.0) as f32
            } else {
                1.0 / 60.0
            };
            s.last_time = time;

            s.session.tick(dt);
            // A SceneRenderer backend draws s.session.scene here

            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                s.update_hud(&document);
            }
        }

        request_animation_frame(shell);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use fruit_bowl::assets::{AssetCatalog, ITEM_TYPES, ProceduralSource};
    use fruit_bowl::settings::Settings;
    use fruit_bowl::sim::GameSession;

    env_logger::init();
    log::info!("Fruit Bowl (native) starting...");

    let settings = Settings::load();
    let catalog = match AssetCatalog::load(&ProceduralSource, &ITEM_TYPES) {
        Ok(catalog) => catalog,
        Err(err) => {
            log::error!("cannot start: {err}");
            std::process::exit(1);
        }
    };

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1);
    let mut session = GameSession::new(settings.config, catalog, seed);

    // Headless smoke run: a minute of play with a center click every half
    // second; the web version is the real game
    println!("Running headless session...");
    for tick in 0..3600u32 {
        session.tick(1.0 / 60.0);
        if tick % 30 == 0 {
            session.handle_click(glam::Vec2::ZERO);
        }
        if tick % 60 == 0 {
            session.tick_timer();
        }
    }
    println!(
        "✓ Headless run done: score {}, {} matches, {} items active",
        session.score,
        session.matches_cleared,
        session.registry.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
