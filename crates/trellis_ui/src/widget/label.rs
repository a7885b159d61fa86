//! Text display with word wrapping.

use std::fmt;
use std::rc::Rc;

use trellis_core::{Alignment, LayoutParameters, Vec2};

use crate::render::{Font, SpriteBatch};
use crate::style::Color;
use crate::view::{View, ViewState};

/// Appended to the last line when `max_lines` cuts text off.
const ELLIPSIS: &str = " ...";

/// Draws text, breaking lines on spaces to fit the available width.
///
/// Explicit newlines always break. Leading spaces are kept as written.
pub struct Label {
    state: ViewState,
    font: Rc<dyn Font>,
    text: String,
    max_lines: usize,
    color: Color,
    horizontal_alignment: Alignment,
    lines: Vec<String>,
    content_dirty: bool,
}

impl Label {
    /// Creates a content-sized label.
    #[must_use]
    pub fn new(font: Rc<dyn Font>, text: impl Into<String>) -> Self {
        Self {
            state: ViewState::new("Label"),
            font,
            text: text.into(),
            max_lines: 0,
            color: Color::BLACK,
            horizontal_alignment: Alignment::Start,
            lines: Vec::new(),
            content_dirty: true,
        }
    }

    /// Sets the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutParameters) -> Self {
        self.state.set_layout(layout);
        self
    }

    /// Limits the number of lines; 0 means unlimited.
    #[must_use]
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.set_max_lines(max_lines);
        self
    }

    /// Current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Changes the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.content_dirty = true;
        }
    }

    /// Changes the font.
    pub fn set_font(&mut self, font: Rc<dyn Font>) {
        self.font = font;
        self.content_dirty = true;
    }

    /// Maximum line count; 0 means unlimited.
    #[must_use]
    pub const fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Changes the maximum line count.
    pub fn set_max_lines(&mut self, max_lines: usize) {
        if max_lines != self.max_lines {
            self.max_lines = max_lines;
            self.content_dirty = true;
        }
    }

    /// Text color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Changes the text color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Changes how each line is placed within the content width.
    pub fn set_horizontal_alignment(&mut self, alignment: Alignment) {
        self.horizontal_alignment = alignment;
    }

    /// Lines from the last measure.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Greedy line breaking. Returns the widest line's width.
    fn break_lines(&mut self, available_width: f32) -> f32 {
        self.lines.clear();
        let font = Rc::clone(&self.font);
        let spacing = font.measure(" ").x;
        let mut max_width = 0.0_f32;

        for raw_line in self.text.replace("\r\n", "\n").split('\n') {
            let mut line = String::new();
            let mut remaining = available_width;
            let mut first_word = true;
            for word in raw_line.split(' ') {
                let word_width = font.measure(word).x;
                if first_word || remaining >= word_width + spacing {
                    if !first_word {
                        line.push(' ');
                        remaining -= spacing;
                    }
                } else {
                    max_width = max_width.max(font.measure(&line).x);
                    self.lines.push(std::mem::take(&mut line));
                    if self.max_lines > 0 && self.lines.len() == self.max_lines {
                        if let Some(last) = self.lines.last_mut() {
                            last.push_str(ELLIPSIS);
                        }
                        return max_width;
                    }
                    remaining = available_width;
                }
                line.push_str(word);
                remaining -= word_width;
                first_word = false;
            }
            max_width = max_width.max(font.measure(&line).x);
            self.lines.push(line);
            if self.max_lines > 0 && self.lines.len() == self.max_lines {
                break;
            }
        }
        max_width
    }

    fn aligned_left(&self, line: &str) -> f32 {
        let width = self.font.measure(line).x;
        self.horizontal_alignment.align(width, self.state.content_size().x)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Label")
            .field("state", &self.state)
            .field("text", &self.text)
            .field("max_lines", &self.max_lines)
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl View for Label {
    fn state(&self) -> &ViewState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn on_measure(&mut self, available: Vec2) -> Vec2 {
        let layout = *self.state.layout();
        let limits = layout.limits(available);
        let max_width = self.break_lines(limits.x);
        #[allow(clippy::cast_precision_loss)]
        let height = self.lines.len() as f32 * self.font.line_height();
        layout.resolve(available, Vec2::new(max_width, height))
    }

    fn on_draw_content(&self, batch: &mut dyn SpriteBatch) {
        let line_height = self.font.line_height();
        let mut y = 0.0;
        for line in &self.lines {
            let x = self.aligned_left(line);
            batch.draw_string(&*self.font, line, Vec2::new(x, y), self.color);
            y += line_height;
        }
    }

    fn is_content_dirty(&self) -> bool {
        self.content_dirty
    }

    fn reset_content_dirty(&mut self) {
        self.content_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{MonospaceFont, RenderCommand, UiRenderer};
    use trellis_core::Length;

    fn font() -> Rc<dyn Font> {
        Rc::new(MonospaceFont::new(3, 10.0, 20.0))
    }

    #[test]
    fn test_single_line_size() {
        let mut label = Label::new(font(), "hello");
        label.measure(Vec2::new(500.0, 500.0));
        assert_eq!(label.state().content_size(), Vec2::new(50.0, 20.0));
        assert_eq!(label.lines(), ["hello"]);
    }

    #[test]
    fn test_wraps_on_spaces() {
        let mut label = Label::new(font(), "aaa bbb ccc")
            .with_layout(LayoutParameters::new(Length::Px(75.0), Length::Content));
        label.measure(Vec2::new(500.0, 500.0));
        assert_eq!(label.lines(), ["aaa bbb", "ccc"]);
        assert_eq!(label.state().content_size(), Vec2::new(75.0, 40.0));
    }

    #[test]
    fn test_explicit_newlines_and_overlong_words() {
        let mut label = Label::new(font(), "abcdefghij\r\nxy")
            .with_layout(LayoutParameters::new(Length::Px(50.0), Length::Content));
        label.measure(Vec2::new(500.0, 500.0));
        assert_eq!(label.lines(), ["abcdefghij", "xy"]);
    }

    #[test]
    fn test_max_lines_truncates_with_ellipsis() {
        let mut label = Label::new(font(), "one two three four")
            .with_layout(LayoutParameters::new(Length::Px(40.0), Length::Content))
            .with_max_lines(2);
        label.measure(Vec2::new(500.0, 500.0));
        assert_eq!(label.lines(), ["one", "two ..."]);
        assert_eq!(label.state().content_size().y, 40.0);
    }

    #[test]
    fn test_text_change_marks_dirty_and_draws_aligned() {
        let mut label = Label::new(font(), "ab")
            .with_layout(LayoutParameters::new(Length::Px(100.0), Length::Content));
        label.measure(Vec2::new(500.0, 500.0));
        label.set_text("ab");
        assert!(!label.is_dirty());
        label.set_text("abcd");
        assert!(label.is_dirty());
        label.measure(Vec2::new(500.0, 500.0));
        label.set_horizontal_alignment(Alignment::End);

        let mut renderer = UiRenderer::new();
        label.draw(&mut renderer);
        assert_eq!(
            renderer.commands(),
            [RenderCommand::Text {
                font_id: 3,
                text: "abcd".to_string(),
                position: Vec2::new(60.0, 0.0),
                color: Color::BLACK,
            }]
        );
    }
}
