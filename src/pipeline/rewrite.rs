//! Rule rewriter: literal legal phrases → plain language, then emphasis.
//!
//! ## Provenance tracking
//!
//! A section is held as a list of pieces, each remembering whether its text
//! came from the user's input or from a rule's replacement. That single bit
//! enforces both ordering invariants without any string re-scanning tricks:
//!
//! - plain-language rules only look at **input** pieces, so a replacement is
//!   never rewritten again (running the rewriter twice is a no-op);
//! - emphasis rules only look at **rewritten** pieces, so a user who happens
//!   to type "You use the app at your own risk." does not get highlighted.
//!
//! ## Rule Order
//!
//! All plain-language rules run first, in table order, each replacing the
//! first occurrence of its pattern. Emphasis rules run strictly afterwards, in
//! table order, each marking the first occurrence of its phrase in the
//! transformed text.

use crate::output::Span;
use crate::rules::{EmphasisRule, Rule, RuleSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Input,
    Rewritten,
}

#[derive(Debug, Clone)]
struct Piece {
    text: String,
    origin: Origin,
    emphasized: bool,
}

impl Piece {
    fn input(text: &str) -> Self {
        Self {
            text: text.to_string(),
            origin: Origin::Input,
            emphasized: false,
        }
    }

    fn rewritten(text: &str, emphasized: bool) -> Self {
        Self {
            text: text.to_string(),
            origin: Origin::Rewritten,
            emphasized,
        }
    }
}

/// Rewrite one section and return its trimmed, emphasis-annotated spans.
///
/// Never fails: a rule without a match leaves the text unchanged.
pub fn rewrite_section(section: &str, rules: &RuleSet) -> Vec<Span> {
    let mut pieces = vec![Piece::input(section)];

    for rule in rules.rules() {
        pieces = apply_rule(pieces, rule);
    }
    for emphasis in rules.emphasis() {
        pieces = apply_emphasis(pieces, emphasis);
    }

    finish(pieces)
}

// ── Pass 1: plain-language substitutions ─────────────────────────────────────

fn apply_rule(pieces: Vec<Piece>, rule: &Rule) -> Vec<Piece> {
    let mut out = Vec::with_capacity(pieces.len() + 2);
    let mut done = false;

    for piece in pieces {
        if done || piece.origin != Origin::Input {
            out.push(piece);
            continue;
        }
        match rule.regex().find(&piece.text) {
            Some(m) => {
                out.push(Piece::input(&piece.text[..m.start()]));
                out.push(Piece::rewritten(rule.replacement(), false));
                out.push(Piece::input(&piece.text[m.end()..]));
                done = true;
            }
            None => out.push(piece),
        }
    }

    out
}

// ── Pass 2: emphasis over rewritten text ─────────────────────────────────────

fn apply_emphasis(pieces: Vec<Piece>, rule: &EmphasisRule) -> Vec<Piece> {
    let mut out = Vec::with_capacity(pieces.len() + 2);
    let marked = rule.emphasized_range();
    let mut done = false;

    for piece in pieces {
        if done || piece.origin != Origin::Rewritten || piece.emphasized {
            out.push(piece);
            continue;
        }
        match piece.text.find(rule.phrase()) {
            Some(start) => {
                let (lead, tail) = (start + marked.start, start + marked.end);
                out.push(Piece::rewritten(&piece.text[..lead], false));
                out.push(Piece::rewritten(&piece.text[lead..tail], true));
                out.push(Piece::rewritten(&piece.text[tail..], false));
                done = true;
            }
            None => out.push(piece),
        }
    }

    out
}

// ── Finish: merge, trim ──────────────────────────────────────────────────────

fn finish(pieces: Vec<Piece>) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        if piece.text.is_empty() {
            continue;
        }
        match spans.last_mut() {
            Some(prev) if prev.emphasized == piece.emphasized => prev.text.push_str(&piece.text),
            _ => spans.push(Span {
                text: piece.text,
                emphasized: piece.emphasized,
            }),
        }
    }

    while let Some(first) = spans.first_mut() {
        let trimmed = first.text.trim_start();
        if trimmed.is_empty() {
            spans.remove(0);
        } else {
            first.text = trimmed.to_string();
            break;
        }
    }
    while let Some(last) = spans.last_mut() {
        let trimmed = last.text.trim_end();
        if trimmed.is_empty() {
            spans.pop();
        } else {
            last.text = trimmed.to_string();
            break;
        }
    }

    spans
}
