use pgn_reader::{Nag, Outcome, RawComment, Reader, SanPlus, Skip, Visitor};
use regex::Regex;
use shakmaty::{Chess, Position};
use smallvec::SmallVec;
use std::ops::ControlFlow;
use std::sync::LazyLock;

use super::error::ModelError;
use super::provider::Evaluation;

type MoveList = SmallVec<[String; 128]>;

static EVAL_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%eval\s+(#)?([+-]?\d+(?:\.\d+)?)").expect("eval annotation regex is valid")
});

/// Mainline of a movetext, replayed on a board.
#[derive(Debug, Default)]
pub(crate) struct ParsedMovetext {
    /// Legal prefix of the mainline, as canonical SAN.
    pub sans: Vec<String>,
    /// `[%eval]` annotations aligned to `sans`.
    pub evals: Vec<Option<Evaluation>>,
    pub outcome: Option<String>,
    /// Set when the mainline was cut short.
    pub error: Option<ModelError>,
}

impl ParsedMovetext {
    pub fn has_evals(&self) -> bool {
        self.evals.iter().any(Option::is_some)
    }
}

/// Parses bare SAN lists (`e4 e5 Nf3`) and PGN movetext alike. Comments, NAGs
/// and variations are dropped. The mainline ends at the first token that is
/// not SAN or not legal in the current position; the result marker is still
/// read after that.
pub(crate) fn parse_movetext_mainline(movetext: &str) -> ParsedMovetext {
    if movetext.trim().is_empty() {
        return ParsedMovetext::default();
    }

    let unreadable = first_unreadable_token(movetext);
    let mut reader = Reader::new(movetext.as_bytes());
    let mut visitor = MainlineVisitor {
        max_plies: unreadable.as_ref().map(|(plies, _)| *plies),
        ..MainlineVisitor::default()
    };

    let read_failed = match reader.read_game(&mut visitor) {
        Ok(Some(())) => false,
        Ok(None) | Err(_) => true,
    };

    let mut parsed = visitor.finish();
    if parsed.error.is_none()
        && let Some((plies, token)) = unreadable
    {
        parsed.error = Some(ModelError::MalformedMove {
            ply: plies + 1,
            token,
        });
    }
    if read_failed && parsed.error.is_none() && !parsed.sans.is_empty() {
        parsed.error = Some(ModelError::MalformedMove {
            ply: parsed.sans.len() + 1,
            token: String::new(),
        });
    }
    parsed
}

/// Whitespace-separated mainline tokens, without tags, comments and
/// variations.
fn mainline_tokens(movetext: &str) -> Vec<&str> {
    let bytes = movetext.as_bytes();
    let skip_to = |from: usize, end: u8| {
        bytes[from..]
            .iter()
            .position(|&b| b == end)
            .map_or(bytes.len(), |offset| from + offset)
    };

    let mut tokens = Vec::new();
    let mut start = None;
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() || matches!(b, b'{' | b';' | b'[' | b'(' | b')') {
            if let Some(from) = start.take()
                && depth == 0
            {
                tokens.push(&movetext[from..i]);
            }
            match b {
                b'{' => i = skip_to(i, b'}'),
                b';' => i = skip_to(i, b'\n'),
                b'[' => i = skip_to(i, b']'),
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        } else if start.is_none() {
            start = Some(i);
        }
        i += 1;
    }
    if let Some(from) = start
        && depth == 0
    {
        tokens.push(&movetext[from..]);
    }
    tokens
}

/// The SAN part of a mainline token, or `None` for move numbers, NAGs,
/// move glyphs and result markers.
fn san_part(token: &str) -> Option<String> {
    if token.starts_with('$') || matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*" | "e.p.") {
        return None;
    }
    let unnumbered = token.trim_start_matches(|c: char| c.is_ascii_digit());
    let san = if unnumbered.starts_with('.') {
        unnumbered.trim_start_matches('.')
    } else {
        token
    };
    let san = san.trim_end_matches(['!', '?']);
    if san.is_empty() {
        return None;
    }
    // Castling written with zeros.
    Some(if san.starts_with("0-0") {
        san.replace('0', "O")
    } else {
        san.to_string()
    })
}

/// Number of SAN tokens before the first token that does not read as SAN,
/// and that token.
fn first_unreadable_token(movetext: &str) -> Option<(usize, String)> {
    let mut plies = 0;
    for token in mainline_tokens(movetext) {
        let Some(san) = san_part(token) else {
            continue;
        };
        if SanPlus::from_ascii(san.as_bytes()).is_err() {
            return Some((plies, token.to_string()));
        }
        plies += 1;
    }
    None
}

fn parse_eval_annotation(comment: &str) -> Option<Evaluation> {
    let caps = EVAL_ANNOTATION.captures(comment)?;
    let value = caps.get(2)?.as_str();
    if caps.get(1).is_some() {
        return value.parse().ok().map(Evaluation::Mate);
    }
    let pawns: f64 = value.parse().ok()?;
    Some(Evaluation::Centipawns((pawns * 100.0).round() as i32))
}

#[derive(Default)]
struct MainlineVisitor {
    position: Chess,
    sans: MoveList,
    evals: SmallVec<[Option<Evaluation>; 128]>,
    outcome: Option<String>,
    error: Option<ModelError>,
    /// Moves after this many plies are not read as SAN.
    max_plies: Option<usize>,
    truncated: bool,
}

impl MainlineVisitor {
    fn finish(self) -> ParsedMovetext {
        ParsedMovetext {
            sans: self.sans.into_vec(),
            evals: self.evals.into_vec(),
            outcome: self.outcome,
            error: self.error,
        }
    }
}

impl Visitor for MainlineVisitor {
    type Tags = ();
    type Movetext = ();
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.position = Chess::default();
        self.sans.clear();
        self.evals.clear();
        self.outcome = None;
        self.error = None;
        self.truncated = false;
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(())
    }

    fn san(
        &mut self,
        _movetext: &mut Self::Movetext,
        san_plus: SanPlus,
    ) -> ControlFlow<Self::Output> {
        if self.truncated || self.max_plies.is_some_and(|max| self.sans.len() >= max) {
            self.truncated = true;
            return ControlFlow::Continue(());
        }
        match san_plus.san.to_move(&self.position) {
            Ok(m) => {
                self.position.play_unchecked(m);
                self.sans.push(san_plus.to_string());
                self.evals.push(None);
                ControlFlow::Continue(())
            }
            Err(_) => {
                self.error = Some(ModelError::MalformedMove {
                    ply: self.sans.len() + 1,
                    token: san_plus.to_string(),
                });
                self.truncated = true;
                ControlFlow::Continue(())
            }
        }
    }

    fn nag(&mut self, _: &mut Self::Movetext, _: Nag) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        _: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        if self.truncated {
            return ControlFlow::Continue(());
        }
        let text = String::from_utf8_lossy(comment.as_bytes());
        if let Some(eval) = parse_eval_annotation(&text)
            && let Some(slot) = self.evals.last_mut()
        {
            *slot = Some(eval);
        }
        ControlFlow::Continue(())
    }

    fn partial_comment(
        &mut self,
        _: &mut Self::Movetext,
        _: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn outcome(
        &mut self,
        _movetext: &mut Self::Movetext,
        outcome: Outcome,
    ) -> ControlFlow<Self::Output> {
        self.outcome = Some(outcome.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _movetext: Self::Movetext) -> Self::Output {}
}
