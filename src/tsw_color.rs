// Tile palette
// Picks board colors once per run, matched to what the terminal can display

use ratatui::style::Color;
use term_color_support::ColorSupport;

use crate::tsw_reveal::TileView;

/// Windows Terminal "Campbell" RGB value and closest 256-color index
/// for each ANSI color the board uses
fn campbell(color: Color) -> Option<((u8, u8, u8), u8)> {
    match color {
        Color::Black => Some(((12, 12, 12), 232)),
        Color::Red => Some(((197, 15, 31), 160)),
        Color::Green => Some(((19, 161, 14), 28)),
        Color::Yellow => Some(((193, 156, 0), 178)),
        Color::Blue => Some(((0, 55, 218), 20)),
        Color::Magenta => Some(((136, 23, 152), 90)),
        Color::Cyan => Some(((58, 150, 221), 38)),
        Color::Gray => Some(((204, 204, 204), 250)),
        Color::DarkGray => Some(((118, 118, 118), 243)),
        Color::LightRed => Some(((231, 72, 86), 203)),
        Color::LightGreen => Some(((22, 198, 12), 46)),
        Color::LightBlue => Some(((59, 120, 255), 63)),
        Color::White => Some(((242, 242, 242), 255)),
        _ => None,
    }
}

/// Color depth the palette is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    TrueColor,
    Indexed,
    Basic,
}

impl Depth {
    pub fn detect() -> Depth {
        let support = ColorSupport::stdout();
        if support.has_16m {
            Depth::TrueColor
        } else if support.has_256 {
            Depth::Indexed
        } else {
            Depth::Basic
        }
    }

    /// Map an ANSI color so it looks the same across terminals
    pub fn resolve(self, color: Color) -> Color {
        match (self, campbell(color)) {
            (Depth::TrueColor, Some(((r, g, b), _))) => Color::Rgb(r, g, b),
            (Depth::Indexed, Some((_, index))) => Color::Indexed(index),
            _ => color,
        }
    }
}

/// Colors for every tile state plus the board chrome
#[derive(Debug, Clone)]
pub struct Palette {
    pub board_bg: Color,
    pub hidden: Color,
    pub flag: Color,
    pub mine: Color,
    pub detonated_bg: Color,
    pub hover_bg: Color,
    pub chord_bg: Color,
    pub menu_key: Color,
    pub menu_hover_bg: Color,
    numerals: [Color; 8],
}

impl Palette {
    pub fn new(depth: Depth) -> Self {
        let c = |color| depth.resolve(color);
        Palette {
            board_bg: c(Color::DarkGray),
            hidden: c(Color::Gray),
            flag: c(Color::LightRed),
            mine: c(Color::Black),
            detonated_bg: c(Color::Red),
            hover_bg: c(Color::Blue),
            chord_bg: c(Color::Gray),
            menu_key: c(Color::Yellow),
            menu_hover_bg: c(Color::Cyan),
            numerals: [
                c(Color::LightBlue),
                c(Color::LightGreen),
                c(Color::LightRed),
                c(Color::Blue),
                c(Color::Red),
                c(Color::Cyan),
                c(Color::Magenta),
                c(Color::White),
            ],
        }
    }

    pub fn detect() -> Self {
        Palette::new(Depth::detect())
    }

    /// Foreground for a tile
    pub fn tile_fg(&self, view: TileView) -> Color {
        match view {
            TileView::Hidden => self.hidden,
            TileView::Flagged => self.flag,
            TileView::Mine => self.mine,
            TileView::Numeral(0) => self.board_bg,
            TileView::Numeral(n) => self.numerals[(n as usize - 1).min(7)],
        }
    }
}
