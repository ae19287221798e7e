mod game;
mod input;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use game::{render, SmithGame};
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use time::FrameClock;

/// Monotonic timestamp for the frame clock. Falls back to the wall clock in
/// the unlikely case the Performance API is unavailable.
fn perf_now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Query the grid container's bounding rect and convert mouse pixel
/// coordinates to a terminal cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();

    let col = pixel_x_to_col(click_x, rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(click_y, rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let now = js_sys::Date::now();

    #[cfg(target_arch = "wasm32")]
    let (save, offline_secs) = {
        let mut save = game::save::load(now);
        let offline = game::logic::apply_offline_progress(&mut save, now);
        if offline > 0.0 {
            game::save::store(&save);
        }
        (save, offline)
    };
    #[cfg(not(target_arch = "wasm32"))]
    let (save, offline_secs) = (game::state::SaveState::new(now), 0.0);

    let smith = Rc::new(RefCell::new(SmithGame::new(save, offline_secs)));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let clock = Rc::new(RefCell::new(FrameClock::new()));

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    // Mouse/touch handler
    terminal.on_mouse_event({
        let smith = smith.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.kind != MouseEventKind::ButtonDown(MouseButton::Left) {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }

            let (col, row) = (mouse_event.col, mouse_event.row);
            let matched = cs.hit_test(col, row);
            drop(cs);

            if let Some(action_id) = matched {
                smith
                    .borrow_mut()
                    .handle_input(&InputEvent::Click(action_id), js_sys::Date::now());
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let smith = smith.clone();
        move |key_event| {
            // Case preserved: save codes typed into the import prompt are
            // case-sensitive base64.
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c),
                KeyCode::Enter => InputEvent::Enter,
                KeyCode::Backspace => InputEvent::Backspace,
                KeyCode::Esc => InputEvent::Esc,
                _ => return,
            };
            smith
                .borrow_mut()
                .handle_input(&event, js_sys::Date::now());
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let seconds = clock.borrow_mut().update(perf_now_ms());

            let mut g = smith.borrow_mut();
            g.frame();
            if seconds > 0 {
                g.tick(seconds, js_sys::Date::now());
            }
            if g.take_dirty() {
                #[cfg(target_arch = "wasm32")]
                game::save::store(&g.save);
            }

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            render::render(&g, f, size, &click_state);
        }
    });

    Ok(())
}
