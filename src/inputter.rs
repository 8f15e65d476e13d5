use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single line text input with a cursor, used for the search and filter lines.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub curser_pos: usize,
    /// Whether the text changed with the last key.
    pub changed: bool,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.enter(),
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (kc, km) => self.key(kc, km),
        }
    }

    /// Replaces the text and puts the cursor at its end.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
    }

    pub fn get(&self) -> InputResult {
        self.result(false)
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn result(&self, changed: bool) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
            changed,
        }
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.result(false)
    }

    fn escape(&mut self) -> InputResult {
        let had_input = !self.current_input.is_empty();
        self.clear();
        self.canceled = true;
        self.finished = true;
        self.result(had_input)
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let pos = self.byte_pos();
            self.current_input.remove(pos);
            return self.result(true);
        }
        self.result(false)
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.result(false)
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        self.result(false)
    }

    fn home(&mut self) -> InputResult {
        self.curser_pos = 0;
        self.result(false)
    }

    fn end(&mut self) -> InputResult {
        self.curser_pos = self.current_input.chars().count();
        self.result(false)
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputResult {
        if modifier.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return self.result(false);
        }
        if let Some(chr) = code.as_char() {
            let pos = self.byte_pos();
            self.current_input.insert(pos, chr);
            self.curser_pos += 1;
            return self.result(true);
        }
        self.result(false)
    }

    fn byte_pos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(input: &mut Inputter, text: &str) -> InputResult {
        let mut last = input.get();
        for c in text.chars() {
            last = input.read(KeyEvent::from(KeyCode::Char(c)));
        }
        last
    }

    #[test]
    fn typing_and_editing() {
        let mut input = Inputter::default();
        let result = type_text(&mut input, "jnae");
        assert!(result.changed);
        assert_eq!(result.input, "jnae");

        input.read(KeyEvent::from(KeyCode::Left));
        input.read(KeyEvent::from(KeyCode::Left));
        input.read(KeyEvent::from(KeyCode::Backspace));
        let result = type_text(&mut input, "");
        assert_eq!(result.input, "jae");
        input.read(KeyEvent::from(KeyCode::Home));
        let result = input.read(KeyEvent::from(KeyCode::Delete));
        assert!(!result.changed);
        let result = type_text(&mut input, "x");
        assert_eq!(result.input, "xjae");
        assert_eq!(result.curser_pos, 1);
    }

    #[test]
    fn multibyte_characters_are_handled_per_char() {
        let mut input = Inputter::default();
        type_text(&mut input, "zoë");
        let result = input.read(KeyEvent::from(KeyCode::Backspace));
        assert_eq!(result.input, "zo");
    }

    #[test]
    fn enter_finishes_and_escape_cancels() {
        let mut input = Inputter::default();
        type_text(&mut input, "abc");
        let result = input.read(KeyEvent::from(KeyCode::Enter));
        assert!(result.finished && !result.canceled);

        input.clear();
        input.set("role=admin");
        assert_eq!(input.get().curser_pos, 10);
        let result = input.read(KeyEvent::from(KeyCode::Esc));
        assert!(result.finished && result.canceled);
        assert!(result.input.is_empty());
    }
}
