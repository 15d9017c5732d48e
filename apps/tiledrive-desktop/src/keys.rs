use tiledrive_input::KeyCode;
use winit::keyboard::KeyCode as WinitKey;

/// Translate a physical winit key into the integer code the input layer
/// uses. Keys with no equivalent are dropped.
pub fn to_key_code(key: WinitKey) -> Option<KeyCode> {
    let letter = match key {
        WinitKey::ArrowLeft => return Some(KeyCode::ARROW_LEFT),
        WinitKey::ArrowUp => return Some(KeyCode::ARROW_UP),
        WinitKey::ArrowRight => return Some(KeyCode::ARROW_RIGHT),
        WinitKey::ArrowDown => return Some(KeyCode::ARROW_DOWN),
        WinitKey::Space => return Some(KeyCode::SPACE),
        WinitKey::KeyA => 'a',
        WinitKey::KeyB => 'b',
        WinitKey::KeyC => 'c',
        WinitKey::KeyD => 'd',
        WinitKey::KeyE => 'e',
        WinitKey::KeyF => 'f',
        WinitKey::KeyG => 'g',
        WinitKey::KeyH => 'h',
        WinitKey::KeyI => 'i',
        WinitKey::KeyJ => 'j',
        WinitKey::KeyK => 'k',
        WinitKey::KeyL => 'l',
        WinitKey::KeyM => 'm',
        WinitKey::KeyN => 'n',
        WinitKey::KeyO => 'o',
        WinitKey::KeyP => 'p',
        WinitKey::KeyQ => 'q',
        WinitKey::KeyR => 'r',
        WinitKey::KeyS => 's',
        WinitKey::KeyT => 't',
        WinitKey::KeyU => 'u',
        WinitKey::KeyV => 'v',
        WinitKey::KeyW => 'w',
        WinitKey::KeyX => 'x',
        WinitKey::KeyY => 'y',
        WinitKey::KeyZ => 'z',
        _ => return None,
    };
    KeyCode::from_letter(letter)
}
