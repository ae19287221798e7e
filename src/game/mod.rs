//! IdleSmith — an incremental blacksmith clicker.
//!
//! `SmithGame` is the single owner of the persisted `SaveState`; every
//! mutation (strike, purchase, prestige, import, reset) goes through its
//! methods as a whole-state read-modify-write, so there is exactly one
//! mutation path and no shared-state coordination anywhere.

pub mod logic;
pub mod render;
pub mod save;
pub mod state;

use crate::input::InputEvent;

use render::{
    ACT_BUY_BASE, ACT_CONFIRM_NO, ACT_CONFIRM_YES, ACT_DISMISS, ACT_EXPORT, ACT_IMPORT,
    ACT_PRESTIGE, ACT_RESET, ACT_SAVE, ACT_STRIKE, ACT_TAB_FORGE, ACT_TAB_OPTIONS,
    ACT_TAB_PRESTIGE, ACT_TAB_UPGRADES,
};
use state::{SaveState, UpgradeKind};

/// How long a status-line message stays visible, in draw frames (~60/sec).
const STATUS_FRAMES: u32 = 240;

/// Which panel the lower half of the screen shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Forge,
    Upgrades,
    Prestige,
    Options,
}

/// Destructive actions awaiting a yes/no.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirm {
    Prestige,
    HardReset,
}

pub struct SmithGame {
    pub save: SaveState,
    pub tab: Tab,
    /// Pending destructive action, if any.
    pub confirm: Option<Confirm>,
    /// Export overlay: the base64 code currently shown for copying.
    pub export_code: Option<String>,
    /// Import prompt: the code typed/pasted so far. `Some` = prompt active.
    pub import_buffer: Option<String>,
    /// Status-line message and its remaining lifetime.
    pub status: Option<String>,
    status_frames_left: u32,
    /// Seconds credited by offline catch-up, shown until dismissed.
    pub offline_recap: Option<f64>,
    /// Animation frame counter (incremented every draw frame).
    pub anim_frame: u32,
    /// Strike feedback flash (frames remaining).
    pub click_flash: u32,
    /// Purchase celebration flash.
    pub purchase_flash: u32,
    dirty: bool,
}

impl SmithGame {
    pub fn new(save: SaveState, offline_secs: f64) -> Self {
        Self {
            save,
            tab: Tab::Forge,
            confirm: None,
            export_code: None,
            import_buffer: None,
            status: None,
            status_frames_left: 0,
            offline_recap: (offline_secs > 0.0).then_some(offline_secs),
            anim_frame: 0,
            click_flash: 0,
            purchase_flash: 0,
            dirty: false,
        }
    }

    /// Whether the save changed since the last `take_dirty`. The host
    /// persists after every frame that reports dirty.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
        self.status_frames_left = STATUS_FRAMES;
    }

    /// Advance per-frame visuals: animation counter, flashes, status decay.
    pub fn frame(&mut self) {
        self.anim_frame = self.anim_frame.wrapping_add(1);
        self.click_flash = self.click_flash.saturating_sub(1);
        self.purchase_flash = self.purchase_flash.saturating_sub(1);
        if self.status_frames_left > 0 {
            self.status_frames_left -= 1;
            if self.status_frames_left == 0 {
                self.status = None;
            }
        }
    }

    /// Apply `seconds` whole seconds of passive income.
    pub fn tick(&mut self, seconds: u32, now_ms: f64) {
        if seconds == 0 {
            return;
        }
        logic::advance_seconds(&mut self.save, seconds, now_ms);
        self.dirty = true;
    }

    /// Handle a normalized input event. Returns true if consumed.
    /// `now_ms` is the wall clock (ms since epoch) for reset timestamps.
    pub fn handle_input(&mut self, event: &InputEvent, now_ms: f64) -> bool {
        // The import prompt captures all keyboard input while open.
        if self.import_buffer.is_some() {
            return self.handle_import_prompt(event, now_ms);
        }

        match event {
            InputEvent::Esc => {
                if self.confirm.take().is_some()
                    || self.export_code.take().is_some()
                    || self.offline_recap.take().is_some()
                {
                    return true;
                }
                false
            }
            InputEvent::Key(c) => self.handle_key(*c, now_ms),
            InputEvent::Click(id) => self.handle_click(*id, now_ms),
            InputEvent::Enter | InputEvent::Backspace => false,
        }
    }

    fn handle_key(&mut self, key: char, now_ms: f64) -> bool {
        // Pending confirmation swallows everything except yes/no.
        if let Some(confirm) = self.confirm {
            match key {
                'y' => {
                    self.confirm = None;
                    self.resolve_confirm(confirm, now_ms);
                }
                'n' => self.confirm = None,
                _ => {}
            }
            return true;
        }

        match key {
            ' ' => {
                self.strike();
                true
            }
            '1' | '2' | '3' | '4' => {
                let idx = (key as u8 - b'1') as usize;
                // Index is 0..=3, always within all()
                if let Some(&kind) = UpgradeKind::all().get(idx) {
                    self.buy(kind);
                }
                true
            }
            'f' => {
                self.tab = Tab::Forge;
                true
            }
            'u' => {
                self.tab = Tab::Upgrades;
                true
            }
            'p' => {
                self.tab = Tab::Prestige;
                true
            }
            'o' => {
                self.tab = Tab::Options;
                true
            }
            'r' => {
                self.request_prestige();
                true
            }
            's' if self.tab == Tab::Options => {
                self.manual_save();
                true
            }
            'e' if self.tab == Tab::Options => {
                self.open_export();
                true
            }
            'i' if self.tab == Tab::Options => {
                self.open_import();
                true
            }
            'x' if self.tab == Tab::Options => {
                self.confirm = Some(Confirm::HardReset);
                true
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, action_id: u16, now_ms: f64) -> bool {
        // Confirmation overlay: only its own buttons respond.
        if let Some(confirm) = self.confirm {
            match action_id {
                ACT_CONFIRM_YES => {
                    self.confirm = None;
                    self.resolve_confirm(confirm, now_ms);
                }
                ACT_CONFIRM_NO => self.confirm = None,
                _ => {}
            }
            return true;
        }

        match action_id {
            ACT_STRIKE => self.strike(),
            ACT_TAB_FORGE => self.tab = Tab::Forge,
            ACT_TAB_UPGRADES => self.tab = Tab::Upgrades,
            ACT_TAB_PRESTIGE => self.tab = Tab::Prestige,
            ACT_TAB_OPTIONS => self.tab = Tab::Options,
            ACT_PRESTIGE => self.request_prestige(),
            ACT_SAVE => self.manual_save(),
            ACT_EXPORT => self.open_export(),
            ACT_IMPORT => self.open_import(),
            ACT_RESET => self.confirm = Some(Confirm::HardReset),
            ACT_DISMISS => {
                self.offline_recap = None;
                self.export_code = None;
            }
            id if id >= ACT_BUY_BASE && id < ACT_BUY_BASE + 4 => {
                let idx = (id - ACT_BUY_BASE) as usize;
                if let Some(&kind) = UpgradeKind::all().get(idx) {
                    self.buy(kind);
                }
            }
            _ => return false,
        }
        true
    }

    fn handle_import_prompt(&mut self, event: &InputEvent, now_ms: f64) -> bool {
        match event {
            InputEvent::Key(c) if !c.is_control() => {
                if let Some(buf) = self.import_buffer.as_mut() {
                    buf.push(*c);
                }
            }
            InputEvent::Backspace => {
                if let Some(buf) = self.import_buffer.as_mut() {
                    buf.pop();
                }
            }
            InputEvent::Enter => {
                let code = self.import_buffer.take().unwrap_or_default();
                self.apply_import(&code, now_ms);
            }
            InputEvent::Esc => {
                self.import_buffer = None;
            }
            // Taps elsewhere while typing are ignored rather than dispatched.
            _ => {}
        }
        true
    }

    fn resolve_confirm(&mut self, confirm: Confirm, now_ms: f64) {
        match confirm {
            Confirm::Prestige => {
                let gain = logic::perform_prestige(&mut self.save, now_ms);
                if gain > 0.0 {
                    self.dirty = true;
                    self.tab = Tab::Forge;
                    self.set_status(format!(
                        "Reforged! +{} essence ({} total)",
                        logic::format_number(gain),
                        logic::format_number(self.save.prestige.essence)
                    ));
                }
            }
            Confirm::HardReset => {
                logic::hard_reset(&mut self.save, now_ms);
                self.dirty = true;
                self.tab = Tab::Forge;
                self.set_status("everything melted down — fresh start");
            }
        }
    }

    fn strike(&mut self) {
        logic::click(&mut self.save);
        self.click_flash = 8;
        self.dirty = true;
    }

    fn buy(&mut self, kind: UpgradeKind) {
        // Insufficient funds is a silent no-op; the row renders as disabled.
        if logic::buy_upgrade(&mut self.save, kind) {
            self.purchase_flash = 20;
            self.dirty = true;
            self.set_status(format!(
                "{} → Lv {}",
                kind.name(),
                self.save.upgrades.level(kind)
            ));
        }
    }

    fn request_prestige(&mut self) {
        if logic::can_prestige(&self.save) {
            self.confirm = Some(Confirm::Prestige);
        }
    }

    fn manual_save(&mut self) {
        self.dirty = true;
        self.set_status("progress saved");
    }

    fn open_export(&mut self) {
        self.export_code = Some(save::export_string(&self.save));
        self.set_status("save code ready — copy the text below");
    }

    fn open_import(&mut self) {
        self.import_buffer = Some(String::new());
    }

    fn apply_import(&mut self, code: &str, now_ms: f64) {
        match save::import_string(code) {
            Ok(mut imported) => {
                if imported.last_tick <= 0.0 {
                    imported.last_tick = now_ms;
                }
                self.save = imported;
                self.dirty = true;
                self.set_status("save imported");
            }
            Err(e) => {
                // Current state untouched.
                self.set_status(e.to_string());
            }
        }
    }
}
