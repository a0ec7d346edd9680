//! End-of-session confirm dialog.
//!
//! Three buttons: keep going, squeeze in a short session, or stop. The
//! dialog only tracks which button is highlighted; the engine decides what
//! each choice means.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use ratatui::Frame;

use super::ui;

const BORDER_FG: Color = Color::Rgb(0x5a, 0x56, 0xe0);
const BUTTON_FG: Color = Color::Rgb(0xff, 0xf7, 0xdb);
const ACTIVE_BG: Color = Color::Rgb(0xf2, 0x5d, 0x94);
const INACTIVE_BG: Color = Color::Rgb(0x88, 0x8b, 0x7e);

const BUTTONS: [(&str, ConfirmChoice); 3] = [
    ("Yes", ConfirmChoice::Continue),
    ("Short", ConfirmChoice::ShortSession),
    ("No", ConfirmChoice::Cancel),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    Continue,
    ShortSession,
    Cancel,
}

#[derive(Debug, Default)]
pub struct ConfirmDialog {
    selected: usize,
}

impl ConfirmDialog {
    /// Handle one key press; `Some` means the dialog is answered.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ConfirmChoice> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(ConfirmChoice::Cancel);
        }

        match key.code {
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.selected = (self.selected + 1) % BUTTONS.len();
                None
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.selected = (self.selected + BUTTONS.len() - 1) % BUTTONS.len();
                None
            }
            KeyCode::Enter => Some(BUTTONS[self.selected].1),
            KeyCode::Char('y' | 'Y') => Some(ConfirmChoice::Continue),
            KeyCode::Char('s' | 'S') => Some(ConfirmChoice::ShortSession),
            KeyCode::Char('n' | 'N') => Some(ConfirmChoice::Cancel),
            KeyCode::Char('q') | KeyCode::Esc => Some(ConfirmChoice::Cancel),
            _ => None,
        }
    }

    /// Reset the highlight to the first button for the next prompt.
    pub fn reset(&mut self) {
        self.selected = 0;
    }

    pub fn render(&self, frame: &mut Frame, prompt: &str, idle: Option<&str>) {
        let mut lines = vec![Line::styled(
            prompt.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )];

        if let Some(idle) = idle {
            lines.push(Line::from(""));
            lines.push(Line::styled(
                idle.to_string(),
                Style::default().fg(Color::DarkGray),
            ));
        }

        lines.push(Line::from(""));
        lines.push(self.button_row());

        let content_width = lines
            .iter()
            .map(Line::width)
            .max()
            .unwrap_or(0) as u16;

        // Border plus the dialog padding on each side.
        let width = content_width + 2 + 2 * 6;
        let height = lines.len() as u16 + 2 + 2 * 2;

        let area = frame.area();
        let dialog_area = ui::centered(area, width, height + 2);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_FG))
            .padding(Padding::new(6, 6, 2, 2));

        let dialog = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);

        let mut box_area = dialog_area;
        box_area.height = height.min(box_area.height);
        frame.render_widget(dialog, box_area);

        let help = Paragraph::new(Line::styled(
            "tab toggle · enter submit · y yes · s short · n no",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center);

        if dialog_area.height > height + 1 {
            let mut help_area = dialog_area;
            help_area.y = dialog_area.y + height + 1;
            help_area.height = 1;
            frame.render_widget(help, help_area);
        }
    }

    fn button_row(&self) -> Line<'static> {
        let mut spans = Vec::with_capacity(BUTTONS.len() * 2 - 1);

        for (index, (label, _)) in BUTTONS.iter().enumerate() {
            if index > 0 {
                spans.push(Span::raw("    "));
            }

            let background = if index == self.selected {
                ACTIVE_BG
            } else {
                INACTIVE_BG
            };
            spans.push(Span::styled(
                format!("   {label}   "),
                Style::default().fg(BUTTON_FG).bg(background),
            ));
        }

        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn tab_cycles_through_all_buttons() {
        let mut dialog = ConfirmDialog::default();

        assert_eq!(dialog.handle_key(press(KeyCode::Tab)), None);
        assert_eq!(
            dialog.handle_key(press(KeyCode::Enter)),
            Some(ConfirmChoice::ShortSession)
        );

        dialog.reset();
        assert_eq!(
            dialog.handle_key(press(KeyCode::Enter)),
            Some(ConfirmChoice::Continue)
        );
    }

    #[test]
    fn back_tab_wraps_to_the_last_button() {
        let mut dialog = ConfirmDialog::default();

        assert_eq!(dialog.handle_key(press(KeyCode::BackTab)), None);
        assert_eq!(
            dialog.handle_key(press(KeyCode::Enter)),
            Some(ConfirmChoice::Cancel)
        );
    }

    #[test]
    fn shortcut_keys_answer_directly() {
        let mut dialog = ConfirmDialog::default();

        assert_eq!(
            dialog.handle_key(press(KeyCode::Char('y'))),
            Some(ConfirmChoice::Continue)
        );
        assert_eq!(
            dialog.handle_key(press(KeyCode::Char('s'))),
            Some(ConfirmChoice::ShortSession)
        );
        assert_eq!(
            dialog.handle_key(press(KeyCode::Char('n'))),
            Some(ConfirmChoice::Cancel)
        );
        assert_eq!(
            dialog.handle_key(press(KeyCode::Char('q'))),
            Some(ConfirmChoice::Cancel)
        );
    }

    #[test]
    fn ctrl_c_cancels() {
        let mut dialog = ConfirmDialog::default();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(dialog.handle_key(key), Some(ConfirmChoice::Cancel));
    }
}
