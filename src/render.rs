//! Terminal surface rendering using vello.
//!
//! ```text
//! ┌ header: site name :: view ─────────────── shortcut legend ┐
//! │ panel: content of the active view                         │
//! ├───────────────────────────────────────────────────────────┤
//! │ output: scrollback                                        │
//! ├───────────────────────────────────────────────────────────┤
//! │ $ input_                                                  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Visual theme: phosphor green on near-black, monospace throughout.

use std::time::Instant;

use chrono::NaiveDate;
use vello::kurbo::{Affine, Point, Rect};
use vello::peniko::{Color, Fill, FontData};
use vello::{Glyph, Scene};

use crate::output::OutputKind;
use crate::panels::{self, LineStyle};
use crate::terminal::Terminal;

// --- Color palette ---

const BG_COLOR: Color = Color::new([0.04, 0.05, 0.04, 1.0]);
const HEADER_BG: Color = Color::new([0.08, 0.14, 0.08, 1.0]);
const RULE: Color = Color::new([0.20, 0.45, 0.22, 1.0]);
const TEXT_PRIMARY: Color = Color::new([0.40, 1.0, 0.45, 1.0]);
const TEXT_BODY: Color = Color::new([0.30, 0.82, 0.36, 1.0]);
const TEXT_DIM: Color = Color::new([0.30, 0.82, 0.36, 0.55]);
const TEXT_ECHO: Color = Color::new([0.85, 0.95, 0.85, 1.0]);
const ACCENT_RED: Color = Color::new([0.95, 0.35, 0.30, 1.0]);
const ACCENT_AMBER: Color = Color::new([0.95, 0.75, 0.25, 1.0]);
const ACCENT_BLUE: Color = Color::new([0.45, 0.70, 1.0, 1.0]);

// --- Layout constants ---

const PAD: f64 = 24.0;
const HEADER_HEIGHT: f64 = 48.0;
const HEADER_FONT: f64 = 18.0;
/// Scrollback rows kept visible when the panel grows.
const MIN_OUTPUT_ROWS: f64 = 3.0;

const LEGEND: &str = "tab next view  esc cancel  ctrl+l clear  \u{2191}\u{2193} history";

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Regions of the surface for a given viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub header: Rect,
    pub panel: Rect,
    pub output: Rect,
    pub input: Rect,
    pub line_h: f64,
}

/// What a pointer position lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Header,
    /// Index into the active view's panel lines.
    PanelLine(usize),
    Output,
    Input,
    Outside,
}

impl Layout {
    /// The panel is sized to hold `panel_rows` lines, shrinking only as far
    /// as needed to leave `MIN_OUTPUT_ROWS` of scrollback.
    pub fn compute(width: f64, height: f64, font_size: f32, panel_rows: usize) -> Self {
        let line_h = font_size as f64 * 1.6;
        let header = Rect::new(0.0, 0.0, width, HEADER_HEIGHT);
        let input_top = (height - line_h - PAD).max(HEADER_HEIGHT);
        let input = Rect::new(0.0, input_top, width, height.max(input_top));
        let middle = (input_top - HEADER_HEIGHT).max(0.0);
        let wanted = PAD + (panel_rows as f64 + 0.5) * line_h;
        let room = (middle - PAD - MIN_OUTPUT_ROWS * line_h).max(0.0);
        let panel_bottom = HEADER_HEIGHT + wanted.min(room);
        let panel = Rect::new(0.0, HEADER_HEIGHT, width, panel_bottom);
        let output = Rect::new(0.0, panel_bottom, width, input_top);
        Self {
            header,
            panel,
            output,
            input,
            line_h,
        }
    }

    /// Number of scrollback lines that fit in the output region.
    pub fn visible_output_lines(&self) -> usize {
        ((self.output.height() - PAD) / self.line_h).floor().max(0.0) as usize
    }

    /// Baseline y of panel line `idx`.
    pub fn panel_baseline(&self, idx: usize) -> f64 {
        self.panel.y0 + PAD / 2.0 + (idx as f64 + 1.0) * self.line_h
    }

    pub fn hit_test(&self, x: f64, y: f64) -> Hit {
        let p = Point::new(x, y);
        if self.header.contains(p) {
            Hit::Header
        } else if self.panel.contains(p) {
            let first = self.panel.y0 + PAD / 2.0 + self.line_h * 0.25;
            if y < first {
                return Hit::Outside;
            }
            Hit::PanelLine(((y - first) / self.line_h).floor() as usize)
        } else if self.output.contains(p) {
            Hit::Output
        } else if self.input.contains(p) {
            Hit::Input
        } else {
            Hit::Outside
        }
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Per-window drawing state.
pub struct TerminalRenderer {
    mono_font: Option<FontData>,
    font_size: f32,
    cursor_blink_ms: u128,
    cursor_visible: bool,
    last_blink: Instant,
}

impl TerminalRenderer {
    pub fn new(mono_font: Option<FontData>, font_size: f32, cursor_blink_ms: u64) -> Self {
        Self {
            mono_font,
            font_size,
            cursor_blink_ms: cursor_blink_ms as u128,
            cursor_visible: true,
            last_blink: Instant::now(),
        }
    }

    pub fn layout(&self, width: f64, height: f64, panel_rows: usize) -> Layout {
        Layout::compute(width, height, self.font_size, panel_rows)
    }

    pub fn line_height(&self) -> f64 {
        self.font_size as f64 * 1.6
    }

    /// Draw the whole surface for `terminal` onto `scene`.
    pub fn render(&mut self, scene: &mut Scene, width: f64, height: f64, terminal: &Terminal, today: NaiveDate) {
        let now = Instant::now();
        if now.duration_since(self.last_blink).as_millis() >= self.cursor_blink_ms {
            self.cursor_visible = !self.cursor_visible;
            self.last_blink = now;
        }

        let panel = panels::panel_lines(terminal, today);
        let layout = self.layout(width, height, panel.len());
        let font_size = self.font_size as f64;

        scene.fill(Fill::NonZero, Affine::IDENTITY, BG_COLOR, None, &Rect::new(0.0, 0.0, width, height));

        // Header bar.
        scene.fill(Fill::NonZero, Affine::IDENTITY, HEADER_BG, None, &layout.header);
        let title = format!("{} :: {}", terminal.config().site.name, terminal.view().label());
        self.draw_text(scene, PAD, 32.0, &title, TEXT_PRIMARY, HEADER_FONT);
        let legend_w = self.measure_text(LEGEND, HEADER_FONT as f32);
        self.draw_text(scene, width - PAD - legend_w, 32.0, LEGEND, TEXT_DIM, HEADER_FONT);

        // View panel.
        for (idx, line) in panel.iter().enumerate() {
            let y = layout.panel_baseline(idx);
            if y > layout.panel.y1 {
                break;
            }
            let (color, size) = match line.style {
                LineStyle::Title => (TEXT_PRIMARY, font_size * 1.2),
                LineStyle::Body => (TEXT_BODY, font_size),
                LineStyle::Dim => (TEXT_DIM, font_size),
                LineStyle::Error => (ACCENT_RED, font_size),
                LineStyle::FallbackLink => (ACCENT_BLUE, font_size),
                LineStyle::RetryButton => (ACCENT_AMBER, font_size),
            };
            self.draw_text(scene, PAD, y, &line.text, color, size);
            if line.style == LineStyle::FallbackLink {
                let w = self.measure_text(&line.text, size as f32);
                let underline = Rect::new(PAD, y + 3.0, PAD + w, y + 4.0);
                scene.fill(Fill::NonZero, Affine::IDENTITY, ACCENT_BLUE, None, &underline);
            }
        }
        self.draw_rule(scene, layout.output.y0, width);

        // Output area, pinned to the bottom unless scrolled back.
        let lines = terminal.output();
        let visible = layout.visible_output_lines();
        let end = lines.len().saturating_sub(terminal.scroll_back());
        let start = end.saturating_sub(visible);
        for (i, line) in lines[start..end].iter().enumerate() {
            let y = layout.output.y0 + PAD / 2.0 + (i as f64 + 1.0) * layout.line_h;
            let color = match line.kind {
                OutputKind::Echo => TEXT_ECHO,
                OutputKind::Info => TEXT_BODY,
                OutputKind::Value => TEXT_PRIMARY,
                OutputKind::Error => ACCENT_RED,
            };
            self.draw_text(scene, PAD, y, &line.text, color, font_size);
        }

        // Scroll indicator.
        if lines.len() > visible && visible > 0 {
            let max_scroll = lines.len() - visible;
            let frac = 1.0 - terminal.scroll_back().min(max_scroll) as f64 / max_scroll as f64;
            let track_h = layout.output.height() - PAD;
            let thumb_h = (track_h * visible as f64 / lines.len() as f64).max(20.0);
            let thumb_y = layout.output.y0 + PAD / 2.0 + frac * (track_h - thumb_h);
            let track_x = width - 10.0;
            let thumb = Rect::new(track_x, thumb_y, track_x + 4.0, thumb_y + thumb_h);
            scene.fill(Fill::NonZero, Affine::IDENTITY, RULE, None, &thumb);
        }

        // Input line.
        self.draw_rule(scene, layout.input.y0, width);
        let input_y = height - PAD;
        let prompt = terminal.config().terminal.prompt.as_str();
        let prompt_color = if terminal.is_focused() { TEXT_PRIMARY } else { TEXT_DIM };
        self.draw_text(scene, PAD, input_y, prompt, prompt_color, font_size);
        let prompt_w = self.measure_text(prompt, self.font_size);
        self.draw_text(scene, PAD + prompt_w, input_y, terminal.input(), TEXT_ECHO, font_size);

        if terminal.is_focused() && self.cursor_visible {
            let cursor_x = PAD + prompt_w + self.measure_text(terminal.input(), self.font_size);
            let cursor = Rect::new(cursor_x, input_y - font_size + 4.0, cursor_x + font_size * 0.55, input_y + 4.0);
            scene.fill(Fill::NonZero, Affine::IDENTITY, TEXT_BODY, None, &cursor);
        }
    }

    fn draw_rule(&self, scene: &mut Scene, y: f64, width: f64) {
        let rule = Rect::new(PAD, y, width - PAD, y + 1.0);
        scene.fill(Fill::NonZero, Affine::IDENTITY, RULE, None, &rule);
    }

    fn draw_text(&self, scene: &mut Scene, x: f64, y: f64, text: &str, color: Color, size: f64) {
        if text.is_empty() {
            return;
        }
        match &self.mono_font {
            Some(font) => {
                let font_size = size as f32;
                let glyphs = layout_glyphs(text, font, font_size, x, y);
                if !glyphs.is_empty() {
                    scene
                        .draw_glyphs(font)
                        .font_size(font_size)
                        .brush(&color)
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
            None => draw_block_text(scene, x, y, text, color, size),
        }
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f64 {
        match &self.mono_font {
            Some(font) => measure_text_width(text, font, font_size),
            None => text.chars().count() as f64 * font_size as f64 * 0.6,
        }
    }
}

/// Fallback when no monospace font is installed: one block per character.
fn draw_block_text(scene: &mut Scene, x: f64, y: f64, text: &str, color: Color, size: f64) {
    let advance = size * 0.6;
    for (i, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let cx = x + i as f64 * advance;
        let block = Rect::new(cx + 1.0, y - size * 0.7, cx + advance - 1.0, y);
        scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &block);
    }
}

// ---------------------------------------------------------------------------
// Glyph layout
// ---------------------------------------------------------------------------

fn layout_glyphs(text: &str, font_data: &FontData, font_size: f32, start_x: f64, start_y: f64) -> Vec<Glyph> {
    let font_ref = match skrifa::FontRef::from_index(font_data.data.as_ref(), font_data.index) {
        Ok(f) => f,
        Err(_) => return vec![],
    };

    use skrifa::MetadataProvider;
    let charmap = font_ref.charmap();
    let glyph_metrics = font_ref.glyph_metrics(
        skrifa::instance::Size::new(font_size),
        skrifa::instance::LocationRef::default(),
    );

    let mut glyphs = Vec::new();
    let mut x = start_x;

    for ch in text.chars() {
        let gid = charmap.map(ch).unwrap_or_default();
        let advance = glyph_metrics.advance_width(gid).unwrap_or(font_size * 0.5) as f64;

        if ch != ' ' {
            glyphs.push(Glyph {
                id: gid.to_u32(),
                x: x as f32,
                y: start_y as f32,
            });
        }

        x += advance;
    }

    glyphs
}

fn measure_text_width(text: &str, font_data: &FontData, font_size: f32) -> f64 {
    let font_ref = match skrifa::FontRef::from_index(font_data.data.as_ref(), font_data.index) {
        Ok(f) => f,
        Err(_) => return text.chars().count() as f64 * font_size as f64 * 0.6,
    };

    use skrifa::MetadataProvider;
    let charmap = font_ref.charmap();
    let glyph_metrics = font_ref.glyph_metrics(
        skrifa::instance::Size::new(font_size),
        skrifa::instance::LocationRef::default(),
    );

    text.chars()
        .map(|ch| {
            let gid = charmap.map(ch).unwrap_or_default();
            glyph_metrics.advance_width(gid).unwrap_or(font_size * 0.5) as f64
        })
        .sum()
}

// --- Font loading ---

/// Load the first monospace font found in the usual system locations.
/// Font stack: Menlo > Monaco > DejaVu Sans Mono > Liberation Mono
pub fn load_mono_font() -> Option<FontData> {
    const NAMES: [&str; 5] = [
        "Menlo",
        "Monaco",
        "DejaVuSansMono",
        "LiberationMono-Regular",
        "Consolas",
    ];
    const DIRS: [&str; 7] = [
        "/System/Library/Fonts/",
        "/System/Library/Fonts/Supplemental/",
        "/Library/Fonts/",
        "/usr/share/fonts/truetype/dejavu/",
        "/usr/share/fonts/truetype/liberation/",
        "/usr/share/fonts/TTF/",
        "C:\\Windows\\Fonts\\",
    ];
    const EXTENSIONS: [&str; 3] = ["ttf", "ttc", "otf"];

    for name in NAMES {
        for dir in DIRS {
            for ext in EXTENSIONS {
                let path = format!("{dir}{name}.{ext}");
                if let Ok(data) = std::fs::read(&path) {
                    tracing::info!(target: "render", "Loaded font {}", path);
                    return Some(FontData::new(data.into(), 0));
                }
            }
        }
    }
    None
}
