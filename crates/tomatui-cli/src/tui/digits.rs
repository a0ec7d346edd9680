//! Big block-digit rendering for the timer clock.

/// Rows per glyph.
pub const HEIGHT: usize = 7;

const DIGITS: [[&str; HEIGHT]; 10] = [
    [
        "   ▄▄▄▄   ",
        "  ██▀▀██  ",
        " ██    ██ ",
        " ██ ██ ██ ",
        " ██    ██ ",
        "  ██▄▄██  ",
        "   ▀▀▀▀   ",
    ],
    [
        "   ▄▄▄    ",
        "  █▀██    ",
        "    ██    ",
        "    ██    ",
        "    ██    ",
        " ▄▄▄██▄▄▄ ",
        " ▀▀▀▀▀▀▀▀ ",
    ],
    [
        "  ▄▄▄▄▄   ",
        " █▀▀▀▀██▄ ",
        "       ██ ",
        "     ▄█▀  ",
        "   ▄█▀    ",
        " ▄██▄▄▄▄▄ ",
        " ▀▀▀▀▀▀▀▀ ",
    ],
    [
        "  ▄▄▄▄▄   ",
        " █▀▀▀▀██▄ ",
        "      ▄██ ",
        "   █████  ",
        "      ▀██ ",
        " █▄▄▄▄██▀ ",
        "  ▀▀▀▀▀   ",
    ],
    [
        "     ▄▄▄  ",
        "    ▄███  ",
        "   █▀ ██  ",
        " ▄█▀  ██  ",
        " ████████ ",
        "      ██  ",
        "      ▀▀  ",
    ],
    [
        " ▄▄▄▄▄▄▄  ",
        " ██▀▀▀▀▀  ",
        " ██▄▄▄▄   ",
        " █▀▀▀▀██▄ ",
        "       ██ ",
        " █▄▄▄▄██▀ ",
        "  ▀▀▀▀▀   ",
    ],
    [
        "   ▄▄▄▄   ",
        "  ██▀▀▀█  ",
        " ██ ▄▄▄   ",
        " ███▀▀██▄ ",
        " ██    ██ ",
        " ▀██▄▄██▀ ",
        "   ▀▀▀▀   ",
    ],
    [
        " ▄▄▄▄▄▄▄▄ ",
        " ▀▀▀▀▀███ ",
        "     ▄██  ",
        "     ██   ",
        "    ██    ",
        "   ██     ",
        "  ▀▀      ",
    ],
    [
        "   ▄▄▄▄   ",
        " ▄██▀▀██▄ ",
        " ██▄  ▄██ ",
        "  ██████  ",
        " ██▀  ▀██ ",
        " ▀██▄▄██▀ ",
        "   ▀▀▀▀   ",
    ],
    [
        "   ▄▄▄▄   ",
        " ▄██▀▀██▄ ",
        " ██    ██ ",
        " ▀██▄▄███ ",
        "   ▀▀▀ ██ ",
        "  █▄▄▄██  ",
        "   ▀▀▀▀   ",
    ],
];

const COLON: [&str; HEIGHT] = [
    "          ",
    "    ▄▄    ",
    "    ██    ",
    "          ",
    "    ██    ",
    "    ▀▀    ",
    "          ",
];

fn glyph(ch: char) -> Option<&'static [&'static str; HEIGHT]> {
    match ch {
        '0'..='9' => {
            let index = ch as usize - '0' as usize;
            Some(&DIGITS[index])
        }
        ':' => Some(&COLON),
        _ => None,
    }
}

/// Render a clock string like `"25:00"` as [`HEIGHT`] rows of block art.
/// Characters without a glyph are skipped.
pub fn render(text: &str) -> Vec<String> {
    let mut rows = vec![String::new(); HEIGHT];

    for ch in text.chars() {
        if let Some(glyph) = glyph(ch) {
            for (row, part) in rows.iter_mut().zip(glyph.iter()) {
                row.push_str(part);
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_uniform_width() {
        let rows = render("12:45");
        assert_eq!(rows.len(), HEIGHT);

        let width = rows[0].chars().count();
        assert_eq!(width, 5 * 10);
        assert!(rows.iter().all(|row| row.chars().count() == width));
    }

    #[test]
    fn unknown_characters_are_skipped() {
        assert_eq!(render("x"), vec![String::new(); HEIGHT]);
    }

    #[test]
    fn every_glyph_is_ten_columns() {
        for text in ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", ":"] {
            let rows = render(text);
            for row in &rows {
                assert_eq!(row.chars().count(), 10, "glyph {text:?}");
            }
        }
    }
}
