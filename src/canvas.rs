//! Drawing surface abstraction.
//!
//! Game code draws through [`Canvas`]; [`Screen`] forwards to macroquad and
//! [`Recorder`] keeps a list of operations so draw order can be checked
//! without a window.

use macroquad::prelude::*;
use std::collections::HashMap;

use crate::level::Background;
use crate::sheet::SpriteRef;

pub trait Canvas {
    /// Fill `rect`, or the whole surface when `None`.
    fn fill(&mut self, color: Color, rect: Option<Rect>);
    /// Draw a sheet region with its top-left at `dest`.
    fn blit(&mut self, sprite: &SpriteRef, dest: Vec2);
    /// Draw a precomposed map background at the origin.
    fn background(&mut self, background: &Background);
    fn ellipse(&mut self, color: Color, rect: Rect);
    fn outline(&mut self, color: Color, rect: Rect, thickness: f32);
    /// Text with its top-left at `pos`.
    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color);
}

/// The real window.
pub struct Screen {
    textures: HashMap<String, Texture2D>,
    font: Option<Font>,
}

impl Screen {
    pub fn new(textures: HashMap<String, Texture2D>, font: Option<Font>) -> Self {
        Self { textures, font }
    }
}

impl Canvas for Screen {
    fn fill(&mut self, color: Color, rect: Option<Rect>) {
        match rect {
            Some(r) => draw_rectangle(r.x, r.y, r.w, r.h, color),
            None => clear_background(color),
        }
    }

    fn blit(&mut self, sprite: &SpriteRef, dest: Vec2) {
        let Some(tex) = self.textures.get(&sprite.sheet) else {
            return;
        };
        draw_texture_ex(
            tex,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                source: Some(sprite.source),
                ..Default::default()
            },
        );
    }

    fn background(&mut self, background: &Background) {
        draw_texture(background.texture(), 0.0, 0.0, WHITE);
    }

    fn ellipse(&mut self, color: Color, rect: Rect) {
        let c = rect.center();
        draw_ellipse(c.x, c.y, rect.w / 2.0, rect.h / 2.0, 0.0, color);
    }

    fn outline(&mut self, color: Color, rect: Rect, thickness: f32) {
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, thickness, color);
    }

    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color) {
        // macroquad positions text by its baseline
        draw_text_ex(
            text,
            pos.x,
            pos.y + size * 0.75,
            TextParams {
                font: self.font.as_ref(),
                font_size: size as u16,
                color,
                ..Default::default()
            },
        );
    }
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill(Color, Option<Rect>),
    Blit(SpriteRef, Vec2),
    Background,
    Ellipse(Color, Rect),
    Outline(Color, Rect),
    Text(String, Vec2),
}

/// Canvas that only remembers what was drawn.
#[derive(Debug, Default)]
pub struct Recorder {
    pub ops: Vec<DrawOp>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheet names of every blit, in order.
    pub fn blitted_sheets(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Blit(s, _) => Some(s.sheet.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Index of the first op matching `pred`.
    pub fn position(&self, pred: impl Fn(&DrawOp) -> bool) -> Option<usize> {
        self.ops.iter().position(pred)
    }
}

impl Canvas for Recorder {
    fn fill(&mut self, color: Color, rect: Option<Rect>) {
        self.ops.push(DrawOp::Fill(color, rect));
    }

    fn blit(&mut self, sprite: &SpriteRef, dest: Vec2) {
        self.ops.push(DrawOp::Blit(sprite.clone(), dest));
    }

    fn background(&mut self, _background: &Background) {
        self.ops.push(DrawOp::Background);
    }

    fn ellipse(&mut self, color: Color, rect: Rect) {
        self.ops.push(DrawOp::Ellipse(color, rect));
    }

    fn outline(&mut self, color: Color, rect: Rect, _thickness: f32) {
        self.ops.push(DrawOp::Outline(color, rect));
    }

    fn text(&mut self, text: &str, pos: Vec2, _size: f32, _color: Color) {
        self.ops.push(DrawOp::Text(text.to_owned(), pos));
    }
}
