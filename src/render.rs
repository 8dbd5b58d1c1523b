use crate::burger::{BURGER_BUTTON_ID, MOBILE_MENU_ID, OPEN_CLASS};
use crate::config::Rgb;
use crate::layout::HEADLINE_CLASS;
use crate::nav::{NAV_HIDDEN_CLASS, NAV_LINKS_CLASS, NAV_TITLE_CLASS};
use crate::orbit::{CENTER_TEXT_ID, SATELLITE_CLASS, SATELLITE_TEXT_CLASS, SHOW_CLASS};
use crate::page::{ElementId, Page, Tag};
use crate::stars::STAR_CANVAS_ID;
use std::io::Write;

/// Page px covered by one terminal cell. Each cell is drawn as two
/// stacked 8x8 px half blocks.
pub const CELL_WIDTH_PX: u32 = 8;
pub const CELL_HEIGHT_PX: u32 = 16;
const HALF_HEIGHT_PX: u32 = CELL_HEIGHT_PX / 2;

const SATELLITE_COLOR: Rgb = (120, 200, 255);
const LABEL_COLOR: Rgb = (170, 200, 230);
const CENTER_COLOR: Rgb = (235, 245, 255);
const NAV_COLOR: Rgb = (210, 220, 235);
const MENU_BG: Rgb = (18, 24, 40);
const MENU_WIDTH: usize = 18;

pub fn viewport_for(cols: u16, rows: u16) -> (u32, u32) {
    (cols as u32 * CELL_WIDTH_PX, rows as u32 * CELL_HEIGHT_PX)
}

#[derive(Clone, Copy, Debug)]
struct HitBox {
    row: usize,
    start: usize,
    end: usize,
    element: ElementId,
}

#[derive(Clone, Copy)]
struct Glyph {
    ch: char,
    fg: Rgb,
    bg: Option<Rgb>,
}

pub struct Renderer {
    bg_color: Rgb,
    cols: usize,
    rows: usize,
    pixels: Vec<Rgb>,
    glyphs: Vec<Option<Glyph>>,
    hits: Vec<HitBox>,
    output_buf: Vec<u8>,
}

impl Renderer {
    pub fn new(bg_color: Rgb) -> Self {
        Self {
            bg_color,
            cols: 0,
            rows: 0,
            pixels: Vec::new(),
            glyphs: Vec::new(),
            hits: Vec::new(),
            output_buf: Vec::new(),
        }
    }

    /// Topmost element drawn at a terminal cell during the last render.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<ElementId> {
        let (col, row) = (col as usize, row as usize);
        self.hits
            .iter()
            .rev()
            .find(|h| h.row == row && (h.start..h.end).contains(&col))
            .map(|h| h.element)
    }

    pub fn render<W: Write>(&mut self, page: &Page, out: &mut W) -> std::io::Result<()> {
        self.compose(page);
        self.emit(out)
    }

    fn compose(&mut self, page: &Page) {
        self.cols = (page.window.inner_width / CELL_WIDTH_PX) as usize;
        self.rows = (page.window.inner_height / CELL_HEIGHT_PX) as usize;
        self.pixels.clear();
        self.pixels.resize(self.cols * self.rows * 2, self.bg_color);
        self.glyphs.clear();
        self.glyphs.resize(self.cols * self.rows, None);
        self.hits.clear();
        if self.cols == 0 || self.rows == 0 {
            return;
        }

        self.draw_stars(page);
        self.draw_headlines(page);
        self.draw_orbit(page);
        self.draw_nav(page);
        self.draw_menu(page);
    }

    fn draw_stars(&mut self, page: &Page) {
        let Some(canvas) = page
            .get_by_id(STAR_CANVAS_ID)
            .and_then(|id| page.element(id).canvas())
        else {
            return;
        };
        let (width, height) = (canvas.width() as f32, canvas.height() as f32);
        for (x, y, radius, color) in canvas.circles() {
            if !(0.0..width).contains(&x) || !(0.0..height).contains(&y) {
                continue;
            }
            let px = (x / CELL_WIDTH_PX as f32) as usize;
            let py = (y / HALF_HEIGHT_PX as f32) as usize;
            if px >= self.cols || py >= self.rows * 2 {
                continue;
            }
            // sub-pixel stars: small ones read dimmer
            let weight = color.a * radius.min(1.0);
            let lit = blend(self.bg_color, (color.r, color.g, color.b), weight);
            let cell = &mut self.pixels[py * self.cols + px];
            *cell = (cell.0.max(lit.0), cell.1.max(lit.1), cell.2.max(lit.2));
        }
    }

    fn draw_headlines(&mut self, page: &Page) {
        let scrolled = (page.window.scroll_y / CELL_HEIGHT_PX as f32) as usize;
        for id in page.query_all_class(HEADLINE_CLASS) {
            let Some(row) = (self.rows / 3).checked_sub(scrolled) else {
                continue;
            };
            if row == 0 {
                continue;
            }
            let text = page.element(id).text();
            let start = self.centered(text);
            self.put_text(row, start, text, CENTER_COLOR, None);
        }
    }

    fn draw_orbit(&mut self, page: &Page) {
        let (w, h) = (page.window.inner_width as f32, page.window.inner_height as f32);
        for sat in page.query_all_class(SATELLITE_CLASS) {
            let Some(transform) = page.element(sat).transform() else {
                continue;
            };
            let theta = transform.rotate_deg.to_radians();
            let x = w / 2.0 + transform.translate_x * theta.cos();
            let y = h / 2.0 + transform.translate_x * theta.sin();
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let col = (x / CELL_WIDTH_PX as f32) as usize;
            let row = (y / CELL_HEIGHT_PX as f32) as usize;
            if row >= self.rows || col >= self.cols {
                continue;
            }

            let label = page
                .find_descendant_class(sat, SATELLITE_TEXT_CLASS)
                .map(|l| page.element(l).text())
                .unwrap_or("");
            self.put_text(row, col, "●", SATELLITE_COLOR, None);
            let end = self.put_text(row, col + 2, label, LABEL_COLOR, None);
            self.hits.push(HitBox {
                row,
                start: col,
                end: end.max(col + 1),
                element: sat,
            });
        }

        if let Some(center) = page.get_by_id(CENTER_TEXT_ID) {
            let el = page.element(center);
            if el.has_class(SHOW_CLASS) && !el.text().is_empty() {
                let start = self.centered(el.text());
                self.put_text(self.rows / 2, start, el.text(), CENTER_COLOR, None);
            }
        }
    }

    fn draw_nav(&mut self, page: &Page) {
        if let Some(title) = page.query_class(NAV_TITLE_CLASS) {
            if !page.has_class(title, NAV_HIDDEN_CLASS) {
                self.put_text(0, 2, page.element(title).text(), NAV_COLOR, None);
            }
        }

        let burger_col = self.cols.saturating_sub(3);
        if let Some(button) = page.get_by_id(BURGER_BUTTON_ID) {
            let end = self.put_text(0, burger_col, page.element(button).text(), NAV_COLOR, None);
            self.hits.push(HitBox {
                row: 0,
                start: burger_col,
                end,
                element: button,
            });
        }

        let Some(links) = page.query_class(NAV_LINKS_CLASS) else {
            return;
        };
        if page.has_class(links, NAV_HIDDEN_CLASS) {
            return;
        }
        let anchors = page.descendants_with_tag(links, Tag::Anchor);
        let width: usize = anchors
            .iter()
            .map(|&a| page.element(a).text().chars().count() + 2)
            .sum();
        let mut col = burger_col.saturating_sub(width + 1);
        for anchor in anchors {
            let end = self.put_text(0, col, page.element(anchor).text(), NAV_COLOR, None);
            self.hits.push(HitBox {
                row: 0,
                start: col,
                end,
                element: anchor,
            });
            col = end + 2;
        }
    }

    fn draw_menu(&mut self, page: &Page) {
        let Some(menu) = page.get_by_id(MOBILE_MENU_ID) else {
            return;
        };
        if !page.has_class(menu, OPEN_CLASS) {
            return;
        }
        let start = self.cols.saturating_sub(MENU_WIDTH);
        for (i, anchor) in page.descendants_with_tag(menu, Tag::Anchor).into_iter().enumerate() {
            let row = i + 1;
            if row >= self.rows {
                break;
            }
            let line = format!(" {} {:<width$}", i + 1, page.element(anchor).text(), width = MENU_WIDTH - 3);
            let end = self.put_text(row, start, &line, NAV_COLOR, Some(MENU_BG));
            self.hits.push(HitBox {
                row,
                start,
                end,
                element: anchor,
            });
        }
    }

    fn centered(&self, text: &str) -> usize {
        (self.cols / 2).saturating_sub(text.chars().count() / 2)
    }

    /// Lay out `text` on one row, clipped at the right edge. Returns the
    /// column after the last character written.
    fn put_text(&mut self, row: usize, col: usize, text: &str, fg: Rgb, bg: Option<Rgb>) -> usize {
        if row >= self.rows {
            return col;
        }
        let mut x = col;
        for ch in text.chars() {
            if x >= self.cols {
                break;
            }
            self.glyphs[row * self.cols + x] = Some(Glyph { ch, fg, bg });
            x += 1;
        }
        x
    }

    fn emit<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_bg: Option<Rgb> = None;
        let mut prev_fg: Option<Rgb> = None;
        for y in 0..self.rows {
            for x in 0..self.cols {
                let top = self.pixels[2 * y * self.cols + x];
                let bot = self.pixels[(2 * y + 1) * self.cols + x];
                let (bg, fg, ch) = match self.glyphs[y * self.cols + x] {
                    Some(glyph) => (glyph.bg.unwrap_or(self.bg_color), glyph.fg, glyph.ch),
                    None => (top, bot, '▄'),
                };

                if prev_bg != Some(bg) {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
                    prev_bg = Some(bg);
                }
                if prev_fg != Some(fg) {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
                    prev_fg = Some(fg);
                }
                let mut utf8 = [0u8; 4];
                self.output_buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_bg = None;
            prev_fg = None;
            if y + 1 < self.rows {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

fn blend(base: Rgb, over: Rgb, alpha: f32) -> Rgb {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |b: u8, o: u8| (b as f32 * (1.0 - a) + o as f32 * a) as u8;
    (mix(base.0, over.0), mix(base.1, over.1), mix(base.2, over.2))
}
