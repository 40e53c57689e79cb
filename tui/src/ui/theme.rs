use ratatui::style::{Color, Modifier, Style};

/// Palette of the dashboard. Dark mode keeps the neon-on-black look; light mode
/// inverts it onto a paper background.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
    pub muted: Color,
    pub accent_cyan: Color,
    pub accent_magenta: Color,
    pub accent_yellow: Color,
    pub accent_red: Color,
    pub highlight: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(0, 0, 0),
            fg: Color::Rgb(57, 255, 20),
            dim: Color::Rgb(0, 190, 0),
            muted: Color::Rgb(80, 90, 80),
            accent_cyan: Color::Rgb(0, 255, 255),
            accent_magenta: Color::Rgb(255, 0, 255),
            accent_yellow: Color::Rgb(255, 255, 0),
            accent_red: Color::Rgb(255, 70, 70),
            highlight: Color::Rgb(0, 30, 0),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(245, 245, 240),
            fg: Color::Rgb(20, 40, 90),
            dim: Color::Rgb(70, 90, 140),
            muted: Color::Rgb(160, 160, 160),
            accent_cyan: Color::Rgb(0, 120, 160),
            accent_magenta: Color::Rgb(160, 0, 140),
            accent_yellow: Color::Rgb(180, 120, 0),
            accent_red: Color::Rgb(200, 30, 30),
            highlight: Color::Rgb(220, 225, 240),
        }
    }

    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Default full-screen style.
    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.dim).bg(self.bg)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn highlight_bg(&self) -> Style {
        Style::default()
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn warn(&self) -> Style {
        Style::default()
            .fg(self.accent_yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error(&self) -> Style {
        Style::default()
            .fg(self.accent_red)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent_cyan(&self) -> Style {
        Style::default()
            .fg(self.accent_cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent_magenta(&self) -> Style {
        Style::default()
            .fg(self.accent_magenta)
            .add_modifier(Modifier::BOLD)
    }

    /// Mixes the foreground into the background; `amount` 0 is invisible, 1 is full strength.
    pub fn fade(&self, amount: f64) -> Color {
        mix(self.bg, self.fg, amount)
    }

    /// Background tint for heatmap cells, `amount` in `0..=1`.
    pub fn heat(&self, amount: f64) -> Color {
        mix(self.bg, self.accent_cyan, amount)
    }
}

fn mix(from: Color, to: Color, amount: f64) -> Color {
    let (Color::Rgb(r0, g0, b0), Color::Rgb(r1, g1, b1)) = (from, to) else {
        return to;
    };
    let t = amount.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    Color::Rgb(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_spans_background_to_foreground() {
        let t = Theme::dark();
        assert_eq!(t.fade(0.0), t.bg);
        assert_eq!(t.fade(1.0), t.fg);
        assert_eq!(t.fade(0.5), Color::Rgb(29, 128, 10));
    }
}
