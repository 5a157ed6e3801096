//! Overlay document — XHTML fragment consumed by the broadcast browser source.
//!
//! Layout per side: set count, color swatch, team name, serve marker, ended
//! sets, live points. Followed by the optional lineup and highlight blocks.

use match_engine::{Highlight, MatchState, RosterEntry, SetScore, SideState};

use crate::color::{is_transparent, Rgb};

const INDENT: &str = "    ";
const NBSP: char = '\u{00A0}';

/// Rendered overlay. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDocument(String);

impl OverlayDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for OverlayDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Minimal `&`, `<`, `>`, `"` escaping for text and attribute values.
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Default)]
pub struct OverlayBuilder {
    lines: Vec<String>,
    depth: usize,
}

impl OverlayBuilder {
    fn line(&mut self, text: String) {
        self.lines.push(format!("{}{}", INDENT.repeat(self.depth), text));
    }

    /// `<div{attrs}>` and descend.
    pub fn open(&mut self, attrs: &str) -> &mut Self {
        self.line(format!("<div{attrs}>"));
        self.depth += 1;
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line("</div>".to_string());
        self
    }

    /// `<div{attrs}>text</div>`; `text` is escaped here.
    pub fn leaf(&mut self, attrs: &str, text: &str) -> &mut Self {
        self.line(format!("<div{attrs}>{}</div>", escape_text(text)));
        self
    }

    pub fn finish(self) -> OverlayDocument {
        OverlayDocument(self.lines.join("\n"))
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

pub fn render_overlay(state: &MatchState) -> OverlayDocument {
    let mut doc = OverlayBuilder::default();
    doc.open(r#" xmlns="http://www.w3.org/1999/xhtml""#);

    doc.open(r#" id="scoreboard" class="scoreboard""#);
    scoreboard_side(&mut doc, "home", &state.home, &state.set_scores, state.match_ended);
    scoreboard_side(&mut doc, "away", &state.away, &state.set_scores, state.match_ended);
    doc.close();

    if let Some(roster) = &state.roster {
        doc.open(r#" id="lineup" class="lineup""#);
        lineup_side(&mut doc, "home", &state.home.name, &roster.home);
        lineup_side(&mut doc, "away", &state.away.name, &roster.away);
        doc.close();
    }

    if let Some(highlight) = &state.highlight {
        highlight_block(&mut doc, highlight);
    }

    doc.close();
    doc.finish()
}

fn swatch_style(color: Option<&str>) -> String {
    if is_transparent(color) {
        return String::new();
    }
    format!(r#" style="background: {};""#, Rgb::from_token(color).css())
}

fn scoreboard_side(
    doc: &mut OverlayBuilder,
    key: &str,
    side: &SideState,
    set_scores: &[SetScore],
    match_ended: bool,
) {
    let nbsp = NBSP.to_string();
    let serve_class = if side.is_serving { "serve serving" } else { "serve" };

    doc.open(&format!(r#" class="{key}""#));
    doc.leaf(&format!(r#" id="{key}_set" class="set""#), &side.sets_won.to_string());
    doc.leaf(
        &format!(r#" id="{key}_color" class="color"{}"#, swatch_style(side.color.as_deref())),
        &nbsp,
    );
    doc.leaf(&format!(r#" id="{key}_team" class="team" contenteditable="true""#), &side.name);
    doc.leaf(&format!(r#" id="{key}_serve" class="{serve_class}""#), &nbsp);

    let ended: Vec<(usize, i64)> = set_scores
        .iter()
        .enumerate()
        .filter_map(|(idx, set)| {
            let (home, away) = set.complete()?;
            Some((idx + 1, if key == "home" { home } else { away }))
        })
        .collect();
    if !ended.is_empty() {
        doc.open(r#" class="ended-sets""#);
        for (set_no, goals) in ended {
            doc.leaf(
                &format!(r#" id="{key}_ended_{set_no}" class="ended" data-set="{set_no}""#),
                &goals.to_string(),
            );
        }
        doc.close();
    }

    if !match_ended {
        doc.leaf(&format!(r#" id="{key}_score" class="score""#), &side.current_points.to_string());
    }
    doc.close();
}

fn lineup_side(doc: &mut OverlayBuilder, key: &str, team_name: &str, players: &[RosterEntry]) {
    doc.open(&format!(r#" class="{key}_team""#));
    doc.leaf(&format!(r#" id="{key}_team_name" class="team_name""#), team_name);
    doc.open(&format!(r#" id="{key}_lineup" class="{key}_lineup""#));
    for player in players {
        let class = if player.libero { "player libero" } else { "player" };
        doc.open(&format!(r#" class="{class}""#));
        doc.leaf(r#" class="number""#, &player.number);
        doc.leaf(r#" class="name""#, &player.name);
        doc.close();
    }
    doc.close();
    doc.close();
}

fn highlight_block(doc: &mut OverlayBuilder, highlight: &Highlight) {
    doc.open(r#" id="highlight" class="highlight""#);
    doc.leaf(r#" class="highlight_desc""#, &highlight.description);
    doc.leaf(
        r#" class="highlight_player""#,
        &format!("{} {}", highlight.player_number, highlight.player_name),
    );
    doc.close();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_indents_nested_blocks() {
        let mut doc = OverlayBuilder::default();
        doc.open(r#" id="a""#).leaf(r#" class="b""#, "x < y").close();
        assert_eq!(
            doc.finish().as_str(),
            "<div id=\"a\">\n    <div class=\"b\">x &lt; y</div>\n</div>"
        );
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_text(r#"A&B "C" <D>"#), "A&amp;B &quot;C&quot; &lt;D&gt;");
        assert_eq!(escape_text("Åsa"), "Åsa");
    }

    #[test]
    fn transparent_swatch_has_no_style() {
        assert_eq!(swatch_style(Some("transparent")), "");
        assert_eq!(swatch_style(Some("xyz")), r#" style="background: rgb(128, 128, 128);""#);
        assert_eq!(swatch_style(None), r#" style="background: rgb(128, 128, 128);""#);
        assert_eq!(swatch_style(Some("#0A0")), r#" style="background: rgb(0, 170, 0);""#);
    }
}
