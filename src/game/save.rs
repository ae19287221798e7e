//! Save persistence and export/import.
//!
//! The save lives as one JSON blob under a fixed localStorage key. Loading
//! never fails: absent or unparsable data falls back to a fresh save, and a
//! partial blob shallow-merges over defaults (missing fields filled in, see
//! the serde attributes on `SaveState`). Writes are fire-and-forget; a
//! failed write is logged to the console and otherwise ignored.
//!
//! Export/import wraps the same JSON in base64 so players can copy their
//! save as a single line of text and paste it elsewhere.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::state::SaveState;

/// localStorage key.
#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "idlesmith_save";

/// Why an import was rejected. Shown verbatim in the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Not valid base64.
    BadEncoding,
    /// Decoded bytes were not UTF-8 text.
    BadText,
    /// Decoded text was not a JSON save.
    BadSave,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::BadEncoding => write!(f, "import failed: not a valid save code"),
            ImportError::BadText => write!(f, "import failed: corrupted save code"),
            ImportError::BadSave => write!(f, "import failed: unrecognized save data"),
        }
    }
}

/// Serialize a save to its JSON wire form.
fn to_json(save: &SaveState) -> String {
    // A plain data struct cannot fail to serialize; an empty string here
    // would only surface as a rejected import of our own export.
    serde_json::to_string(save).unwrap_or_default()
}

/// Parse a raw JSON blob, falling back to defaults when unparsable.
/// Partial JSON shallow-merges over `SaveState::default()`.
pub fn parse_save(json: &str) -> SaveState {
    serde_json::from_str(json).unwrap_or_default()
}

/// Encode the current save as a copyable base64 string.
pub fn export_string(save: &SaveState) -> String {
    STANDARD.encode(to_json(save))
}

/// Decode a pasted save code. On any failure the current state is left for
/// the caller to keep; only a fully decoded save is returned.
pub fn import_string(text: &str) -> Result<SaveState, ImportError> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|_| ImportError::BadEncoding)?;
    let json = String::from_utf8(bytes).map_err(|_| ImportError::BadText)?;
    serde_json::from_str(&json).map_err(|_| ImportError::BadSave)
}

/// localStorage handle. WASM only.
#[cfg(target_arch = "wasm32")]
fn get_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Read the persisted save, or a fresh one anchored at `now_ms` when there
/// is nothing usable in storage.
#[cfg(target_arch = "wasm32")]
pub fn load(now_ms: f64) -> SaveState {
    let stored = get_storage().and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
    match stored {
        Some(json) => {
            let mut save = parse_save(&json);
            if save.last_tick <= 0.0 {
                // Defaulted or pre-epoch timestamp: don't grant a bogus
                // offline window stretching back to 1970.
                save.last_tick = now_ms;
            }
            save
        }
        None => SaveState::new(now_ms),
    }
}

/// Write the save to localStorage. Failures are logged, never propagated.
#[cfg(target_arch = "wasm32")]
pub fn store(save: &SaveState) {
    let json = to_json(save);
    if let Some(storage) = get_storage() {
        if let Err(e) = storage.set_item(STORAGE_KEY, &json) {
            web_sys::console::warn_1(&format!("IdleSmith: save write failed: {e:?}").into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{UpgradeLevels, SAVE_VERSION};

    fn sample_save() -> SaveState {
        let mut save = SaveState::default();
        save.gold = 12_345.6;
        save.upgrades = UpgradeLevels {
            hammer: 10,
            anvil: 4,
            forge: 2,
            apprentice: 1,
        };
        save.prestige.count = 2;
        save.prestige.essence = 9.0;
        save.last_tick = 1_700_000_000_000.0;
        save
    }

    #[test]
    fn json_roundtrip_preserves_save() {
        let original = sample_save();
        let restored = parse_save(&to_json(&original));
        assert_eq!(restored, original);
    }

    #[test]
    fn parse_invalid_json_yields_defaults() {
        assert_eq!(parse_save(""), SaveState::default());
        assert_eq!(parse_save("{\"gold\": 5"), SaveState::default()); // truncated
        assert_eq!(parse_save("not json at all"), SaveState::default());
    }

    #[test]
    fn parse_partial_json_shallow_merges() {
        let save = parse_save(r#"{"gold": 250.0, "upgrades": {"hammer": 3}}"#);
        assert!((save.gold - 250.0).abs() < 1e-9);
        assert_eq!(save.upgrades.hammer, 3);
        // Everything absent falls back to defaults
        assert_eq!(save.upgrades.anvil, 0);
        assert_eq!(save.version, SAVE_VERSION);
        assert!((save.gold_per_click_base - 1.0).abs() < 1e-9);
        assert_eq!(save.prestige.count, 0);
    }

    #[test]
    fn parse_ignores_unknown_fields() {
        let save = parse_save(r#"{"gold": 10.0, "futureField": {"nested": true}}"#);
        assert!((save.gold - 10.0).abs() < 1e-9);
    }

    #[test]
    fn parse_uses_camel_case_wire_names() {
        let save = parse_save(r#"{"goldPerClickBase": 2.0, "lastTick": 99.0}"#);
        assert!((save.gold_per_click_base - 2.0).abs() < 1e-9);
        assert!((save.last_tick - 99.0).abs() < 1e-9);
    }

    #[test]
    fn export_import_roundtrip() {
        let original = sample_save();
        let code = export_string(&original);
        let restored = import_string(&code).expect("own export must import");
        assert_eq!(restored, original);
    }

    #[test]
    fn export_of_default_roundtrips_too() {
        let original = SaveState::default();
        let code = export_string(&original);
        assert_eq!(import_string(&code).expect("valid"), original);
    }

    #[test]
    fn import_tolerates_surrounding_whitespace() {
        let code = format!("  {}\n", export_string(&sample_save()));
        assert_eq!(import_string(&code).expect("valid"), sample_save());
    }

    #[test]
    fn import_rejects_garbage_base64() {
        assert_eq!(
            import_string("this is !!! not base64"),
            Err(ImportError::BadEncoding)
        );
    }

    #[test]
    fn import_rejects_non_utf8_payload() {
        let code = STANDARD.encode([0xff, 0xfe, 0x80]);
        assert_eq!(import_string(&code), Err(ImportError::BadText));
    }

    #[test]
    fn import_rejects_non_json_payload() {
        let code = STANDARD.encode("hello world");
        assert_eq!(import_string(&code), Err(ImportError::BadSave));
    }

    #[test]
    fn import_error_messages_are_user_facing() {
        // Displayed directly in the status line, so keep them readable.
        assert!(ImportError::BadEncoding.to_string().contains("import failed"));
        assert!(ImportError::BadSave.to_string().contains("import failed"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::game::state::{Prestige, UpgradeLevels};
    use proptest::prelude::*;

    prop_compose! {
        fn arb_save()(
            gold in 0.0f64..1e12,
            hammer in 0u32..300,
            anvil in 0u32..300,
            forge in 0u32..100,
            apprentice in 0u32..50,
            count in 0u32..100,
            essence in 0.0f64..1e6,
            last_tick in 0.0f64..2e12,
        ) -> SaveState {
            let mut save = SaveState::default();
            save.gold = gold;
            save.upgrades = UpgradeLevels { hammer, anvil, forge, apprentice };
            save.prestige = Prestige { count, essence };
            save.last_tick = last_tick;
            save
        }
    }

    proptest! {
        // serde_json emits the shortest f64 representation that parses back
        // to the same bits, so exact equality holds across the round trip.
        #[test]
        fn prop_import_of_export_is_identity(save in arb_save()) {
            let restored = import_string(&export_string(&save));
            prop_assert_eq!(restored, Ok(save));
        }

        #[test]
        fn prop_parse_never_panics_on_arbitrary_text(text in ".{0,200}") {
            let _ = parse_save(&text);
            let _ = import_string(&text);
        }
    }
}
