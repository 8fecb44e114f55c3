/// Modifier state and physical key of a keyboard event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyChord {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub code: String,
}

impl KeyChord {
    pub fn from_event(ev: &web_sys::KeyboardEvent) -> Self {
        Self {
            ctrl: ev.ctrl_key(),
            meta: ev.meta_key(),
            shift: ev.shift_key(),
            code: ev.code(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryCommand {
    Undo,
    Redo,
}

impl HistoryCommand {
    /// Ctrl/Cmd+Z undoes, Ctrl/Cmd+Shift+Z redoes.
    pub fn from_key(chord: &KeyChord) -> Option<Self> {
        if !(chord.ctrl || chord.meta) || chord.code != "KeyZ" {
            return None;
        }
        if chord.shift {
            Some(HistoryCommand::Redo)
        } else {
            Some(HistoryCommand::Undo)
        }
    }
}
