use crate::error::{Result, TyperError};
use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::time::Duration;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What a pressed global hotkey asks the typist to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Trigger,
    Cancel,
}

pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    registered: Vec<HotKey>,
    trigger_id: Option<u32>,
    cancel_id: Option<u32>,
}

impl HotkeyManager {
    pub fn new() -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| TyperError::hotkey(format!("failed to create hotkey manager: {e}")))?;

        Ok(Self {
            manager,
            registered: Vec::new(),
            trigger_id: None,
            cancel_id: None,
        })
    }

    pub fn register_trigger(&mut self, hotkey_str: &str) -> Result<()> {
        let id = self.register(hotkey_str)?;
        self.trigger_id = Some(id);
        Ok(())
    }

    pub fn register_cancel(&mut self, hotkey_str: &str) -> Result<()> {
        let id = self.register(hotkey_str)?;
        self.cancel_id = Some(id);
        Ok(())
    }

    fn register(&mut self, hotkey_str: &str) -> Result<u32> {
        let hotkey = parse_hotkey(hotkey_str)?;
        if self.registered.iter().any(|h| h.id() == hotkey.id()) {
            return Err(TyperError::invalid_key_combination(
                hotkey_str,
                "already bound to another action",
            ));
        }

        self.manager.register(hotkey).map_err(|e| {
            TyperError::hotkey(format!("failed to register '{hotkey_str}': {e}"))
        })?;
        debug!(hotkey = hotkey_str, id = hotkey.id(), "registered global hotkey");

        self.registered.push(hotkey);
        Ok(hotkey.id())
    }

    /// Blocking stream of trigger/cancel presses.
    ///
    /// Both hotkeys must be registered first.
    pub fn actions(&self) -> Result<HotkeyActions> {
        let trigger = self
            .trigger_id
            .ok_or_else(|| TyperError::hotkey("no trigger hotkey registered"))?;
        let cancel = self
            .cancel_id
            .ok_or_else(|| TyperError::hotkey("no cancel hotkey registered"))?;
        Ok(HotkeyActions { trigger, cancel })
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        if let Err(e) = self.manager.unregister_all(&self.registered) {
            warn!("failed to unregister hotkeys: {e}");
        }
    }
}

pub struct HotkeyActions {
    trigger: u32,
    cancel: u32,
}

impl Iterator for HotkeyActions {
    type Item = HotkeyAction;

    fn next(&mut self) -> Option<HotkeyAction> {
        let receiver = GlobalHotKeyEvent::receiver();
        loop {
            if let Ok(event) = receiver.try_recv() {
                if let Some(action) = classify(event.id, event.state, self.trigger, self.cancel) {
                    return Some(action);
                }
                continue;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

fn classify(id: u32, state: HotKeyState, trigger: u32, cancel: u32) -> Option<HotkeyAction> {
    if state != HotKeyState::Pressed {
        return None;
    }
    if id == cancel {
        Some(HotkeyAction::Cancel)
    } else if id == trigger {
        Some(HotkeyAction::Trigger)
    } else {
        None
    }
}

/// Parses a spec such as `ctrl+shift+t` or `f9` into a hotkey.
pub fn parse_hotkey(hotkey_str: &str) -> Result<HotKey> {
    if hotkey_str.trim().is_empty() {
        return Err(TyperError::invalid_key_combination(hotkey_str, "empty hotkey"));
    }

    let mut modifiers = Modifiers::empty();
    let mut key_code = None;

    for part in hotkey_str.split('+').map(str::trim) {
        if let Some(modifier) = parse_modifier(&part.to_lowercase()) {
            modifiers |= modifier;
            continue;
        }
        if key_code.is_some() {
            return Err(TyperError::invalid_key_combination(
                hotkey_str,
                "multiple keys specified",
            ));
        }
        key_code = Some(parse_key_code(part)?);
    }

    let code = key_code
        .ok_or_else(|| TyperError::invalid_key_combination(hotkey_str, "no key specified"))?;
    let modifiers = (!modifiers.is_empty()).then_some(modifiers);

    Ok(HotKey::new(modifiers, code))
}

fn parse_modifier(token: &str) -> Option<Modifiers> {
    match token {
        "ctrl" | "control" => Some(Modifiers::CONTROL),
        "alt" | "option" => Some(Modifiers::ALT),
        "shift" => Some(Modifiers::SHIFT),
        "meta" | "cmd" | "super" | "win" => Some(Modifiers::SUPER),
        _ => None,
    }
}

#[rustfmt::skip]
const LETTERS: [Code; 26] = [
    Code::KeyA, Code::KeyB, Code::KeyC, Code::KeyD, Code::KeyE, Code::KeyF, Code::KeyG,
    Code::KeyH, Code::KeyI, Code::KeyJ, Code::KeyK, Code::KeyL, Code::KeyM, Code::KeyN,
    Code::KeyO, Code::KeyP, Code::KeyQ, Code::KeyR, Code::KeyS, Code::KeyT, Code::KeyU,
    Code::KeyV, Code::KeyW, Code::KeyX, Code::KeyY, Code::KeyZ,
];

#[rustfmt::skip]
const DIGITS: [Code; 10] = [
    Code::Digit0, Code::Digit1, Code::Digit2, Code::Digit3, Code::Digit4,
    Code::Digit5, Code::Digit6, Code::Digit7, Code::Digit8, Code::Digit9,
];

#[rustfmt::skip]
const FUNCTION_KEYS: [Code; 24] = [
    Code::F1, Code::F2, Code::F3, Code::F4, Code::F5, Code::F6,
    Code::F7, Code::F8, Code::F9, Code::F10, Code::F11, Code::F12,
    Code::F13, Code::F14, Code::F15, Code::F16, Code::F17, Code::F18,
    Code::F19, Code::F20, Code::F21, Code::F22, Code::F23, Code::F24,
];

#[rustfmt::skip]
const NUMPAD_DIGITS: [Code; 10] = [
    Code::Numpad0, Code::Numpad1, Code::Numpad2, Code::Numpad3, Code::Numpad4,
    Code::Numpad5, Code::Numpad6, Code::Numpad7, Code::Numpad8, Code::Numpad9,
];

/// Resolves a key token. Short names are matched case-insensitively; any
/// other W3C `Code` name (`NumpadAdd`, `IntlBackslash`, ...) is accepted in
/// its canonical spelling.
fn parse_key_code(token: &str) -> Result<Code> {
    let key = token.to_lowercase();
    if let Some(code) = named_key_code(&key)? {
        return Ok(code);
    }
    token
        .parse::<Code>()
        .map_err(|_| TyperError::invalid_key(token, "unsupported key"))
}

fn named_key_code(key: &str) -> Result<Option<Code>> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_lowercase() {
            return Ok(Some(LETTERS[(c as u8 - b'a') as usize]));
        }
        if c.is_ascii_digit() {
            return Ok(Some(DIGITS[(c as u8 - b'0') as usize]));
        }
    }

    if let Some(n) = key.strip_prefix('f').and_then(|n| n.parse::<usize>().ok()) {
        return FUNCTION_KEYS
            .get(n.wrapping_sub(1))
            .copied()
            .map(Some)
            .ok_or_else(|| TyperError::invalid_key(key, "function keys run from f1 to f24"));
    }

    if let Some(rest) = key.strip_prefix("numpad") {
        return Ok(numpad_key_code(rest));
    }

    let code = match key {
        "esc" | "escape" => Code::Escape,
        "enter" | "return" => Code::Enter,
        "space" => Code::Space,
        "tab" => Code::Tab,
        "backspace" => Code::Backspace,
        "delete" | "del" => Code::Delete,
        "insert" | "ins" => Code::Insert,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" | "pgup" => Code::PageUp,
        "pagedown" | "pgdn" => Code::PageDown,
        "up" | "arrowup" => Code::ArrowUp,
        "down" | "arrowdown" => Code::ArrowDown,
        "left" | "arrowleft" => Code::ArrowLeft,
        "right" | "arrowright" => Code::ArrowRight,
        "pause" => Code::Pause,
        "printscreen" => Code::PrintScreen,
        "scrolllock" => Code::ScrollLock,
        "-" | "minus" => Code::Minus,
        "=" | "equal" => Code::Equal,
        "[" | "bracketleft" => Code::BracketLeft,
        "]" | "bracketright" => Code::BracketRight,
        "\\" | "backslash" => Code::Backslash,
        ";" | "semicolon" => Code::Semicolon,
        "'" | "quote" => Code::Quote,
        "`" | "backquote" => Code::Backquote,
        "," | "comma" => Code::Comma,
        "." | "period" => Code::Period,
        "/" | "slash" => Code::Slash,
        "capslock" => Code::CapsLock,
        "numlock" => Code::NumLock,
        "menu" | "contextmenu" => Code::ContextMenu,
        "volumeup" | "audiovolumeup" => Code::AudioVolumeUp,
        "volumedown" | "audiovolumedown" => Code::AudioVolumeDown,
        "mute" | "audiovolumemute" => Code::AudioVolumeMute,
        "playpause" | "mediaplaypause" => Code::MediaPlayPause,
        "nexttrack" | "mediatracknext" => Code::MediaTrackNext,
        "prevtrack" | "mediatrackprevious" => Code::MediaTrackPrevious,
        "mediastop" => Code::MediaStop,
        _ => return Ok(None),
    };

    Ok(Some(code))
}

fn numpad_key_code(rest: &str) -> Option<Code> {
    if let Ok(n) = rest.parse::<usize>() {
        return NUMPAD_DIGITS.get(n).copied();
    }
    let code = match rest {
        "add" | "plus" => Code::NumpadAdd,
        "subtract" | "minus" => Code::NumpadSubtract,
        "multiply" => Code::NumpadMultiply,
        "divide" => Code::NumpadDivide,
        "decimal" => Code::NumpadDecimal,
        "enter" => Code::NumpadEnter,
        "equal" => Code::NumpadEqual,
        "comma" => Code::NumpadComma,
        _ => return None,
    };
    Some(code)
}
