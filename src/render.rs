use crate::{
    error::ClientError,
    model::{Board, BoardConfig, Score, Stone},
    session::Phase
};
use handlebars::Handlebars;
use serde::Serialize;
use std::io::Write;
use tracing::warn;

/// Read-only view handed to renderers after every applied frame.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub config: &'a BoardConfig,
    pub board: &'a Board,
    pub turn: Stone,
    pub score: Score,
    pub phase: Phase
}

pub trait RenderSink {
    fn render(&mut self, snapshot: Snapshot<'_>);
}

const BOARD_TEMPLATE: &str = "\
{{#if finished}}game over{{else}}{{turn}} to play{{/if}} | you: {{you}} | \
{{black}} {{black_score}} - {{white}} {{white_score}}
{{grid}}";

#[derive(Serialize)]
struct BoardTemplateData {
    finished: bool,
    turn: String,
    you: String,
    black: String,
    white: String,
    black_score: u32,
    white_score: u32,
    grid: String
}

fn glyph(stone: Stone) -> char {
    match stone {
        Stone::Empty => '.',
        Stone::Black => 'X',
        Stone::White => 'O'
    }
}

fn colour_name(config: &BoardConfig, stone: Stone) -> String {
    match config.colour_of(stone) {
        Some(name) => name.to_string(),
        None => "spectator".to_string()
    }
}

/// Draws the board as text, one line per row.
pub struct TextRenderer<W: Write> {
    templates: Handlebars<'static>,
    out: W
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Result<TextRenderer<W>, ClientError> {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(true);
        templates.register_escape_fn(handlebars::no_escape);
        templates.register_template_string("board", BOARD_TEMPLATE)?;
        Ok(TextRenderer {
            templates,
            out
        })
    }
    pub fn draw(&self, snapshot: Snapshot<'_>) -> Result<String, ClientError> {
        let config = snapshot.config;
        let data = BoardTemplateData {
            finished: snapshot.phase == Phase::Finished,
            turn: colour_name(config, snapshot.turn),
            you: colour_name(config, config.local_colour),
            black: colour_name(config, Stone::Black),
            white: colour_name(config, Stone::White),
            black_score: snapshot.score.black,
            white_score: snapshot.score.white,
            grid: snapshot.board.rows()
                .map(|row| row.iter().map(|&stone| glyph(stone)).chain(['\n']).collect::<String>())
                .collect()
        };
        Ok(self.templates.render("board", &data)?)
    }
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for TextRenderer<W> {
    fn render(&mut self, snapshot: Snapshot<'_>) {
        let text = match self.draw(snapshot) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "failed to render board");
                return
            }
        };
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!(error = %e, "failed to write board");
        }
    }
}
