//! Keyboard layout with held keys highlighted

use super::theme::ThemeColors;
use crate::input::{get_key_info, KeyCode};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

/// Standard width of one key cell
const W: u16 = 4;

/// (scancode, cell width) rows of a compact US layout
const ROWS: &[&[(u16, u16)]] = &[
    &[
        (41, W), (2, W), (3, W), (4, W), (5, W), (6, W), (7, W), (8, W), (9, W), (10, W),
        (11, W), (12, W), (13, W), (14, W + 2),
    ],
    &[
        (15, W + 1), (16, W), (17, W), (18, W), (19, W), (20, W), (21, W), (22, W), (23, W),
        (24, W), (25, W), (26, W), (27, W), (43, W + 1),
    ],
    &[
        (58, W + 2), (30, W), (31, W), (32, W), (33, W), (34, W), (35, W), (36, W), (37, W),
        (38, W), (39, W), (40, W), (28, W + 4),
    ],
    &[
        (42, W + 4), (44, W), (45, W), (46, W), (47, W), (48, W), (49, W), (50, W), (51, W),
        (52, W), (53, W), (54, W + 5), (103, W),
    ],
    &[
        (29, W + 1), (125, W), (56, W), (57, (W + 1) * 6 - 1), (100, W), (97, W + 1),
        (105, W), (108, W), (106, W),
    ],
];

/// Visual representation of the held key set
pub struct KeyboardVisual<'a> {
    pressed: &'a [KeyCode],
    colors: ThemeColors,
}

impl<'a> KeyboardVisual<'a> {
    pub fn new(pressed: &'a [KeyCode], colors: ThemeColors) -> Self {
        Self { pressed, colors }
    }

    fn key_style(&self, code: KeyCode) -> Style {
        if self.pressed.contains(&code) {
            Style::default()
                .fg(self.colors.key_text_on)
                .bg(self.colors.key_on)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(self.colors.key_text)
                .bg(self.colors.key_off)
        }
    }
}

impl<'a> Widget for KeyboardVisual<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 40 || area.height < ROWS.len() as u16 {
            buf.set_string(
                area.x,
                area.y,
                "Window too small",
                Style::default().fg(self.colors.dim),
            );
            return;
        }

        let right = area.x + area.width;
        for (row, keys) in ROWS.iter().enumerate() {
            let y = area.y + row as u16;
            let mut x = area.x + 1;
            for &(code, width) in keys.iter() {
                if x + width > right {
                    break;
                }
                let code = KeyCode(code);
                let label = get_key_info(code).label;
                let cell = format!("{:^w$.w$}", label, w = width as usize);
                buf.set_string(x, y, cell, self.key_style(code));
                x += width + 1;
            }
        }
    }
}
