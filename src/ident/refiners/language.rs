//! Language guessing for content nothing else could classify.
//!
//! Text is scored against keyword indicators per script or programming
//! language with one Aho-Corasick pass. A file-name extension agreeing
//! with a language adds a bonus. Text without code indicators is promoted
//! to `text/plain` when it was otherwise unknown or reads as natural
//! language. Binary content keeps the fallback tag.

use crate::core::identification::{IdentificationResult, UNKNOWN_TAG};
use crate::error::Result;
use crate::ident::config::LanguageConfig;
use crate::ident::io::Subject;
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const TEXT_TAG: &str = "text/plain";
pub const JSON_TAG: &str = "text/json";

/// Guesses a tag for otherwise unclassified content.
pub trait LanguageGuesser {
    /// Replacement tag; `fallback` when nothing better is found.
    fn guess(
        &self,
        subject: &Subject<'_>,
        current: &IdentificationResult,
        fallback: &str,
    ) -> Result<String>;
}

/// Candidate languages in tie-break order; earlier wins a tie.
const LANGUAGES: &[(&str, &[&str])] = &[
    ("code/hta", &["<hta:application"]),
    ("code/wsf", &["<job", "<package>", "<script language="]),
    ("code/php", &["<?php", "$_get", "$_post", "$_server", "->", "echo "]),
    ("code/html", &["<html", "<body", "<div", "<head", "<a href", "<!doctype html"]),
    ("code/xml", &["<?xml", "xmlns", "</"]),
    (
        "code/ps1",
        &[
            "$env:",
            "-executionpolicy",
            "invoke-expression",
            "new-object",
            "write-host",
            "param(",
            "[system.",
            "-nop",
        ],
    ),
    (
        "code/vbs",
        &["dim ", "end sub", "end function", "wscript.", "createobject(", "msgbox", "on error resume next"],
    ),
    (
        "code/batch",
        &["@echo off", "goto ", "%~dp0", "rem ", "if exist", "setlocal", "%errorlevel%"],
    ),
    (
        "code/python",
        &["def ", "import ", "self.", "elif ", "print(", "__name__", "lambda ", "#!/usr/bin/env python"],
    ),
    ("code/perl", &["use strict", "my $", "sub ", "=~", "#!/usr/bin/perl"]),
    ("code/ruby", &["require '", "puts ", "attr_accessor", ".each do", "end\n"]),
    ("code/shell", &["#!/bin/sh", "#!/bin/bash", "fi\n", "then\n", "esac", "export ", "$("]),
    (
        "code/csharp",
        &["using system", "namespace ", "console.writeline", "static void main"],
    ),
    (
        "code/java",
        &["import java.", "public static void main", "system.out.println", "extends ", "public class "],
    ),
    ("code/c", &["#include <", "int main(", "printf(", "malloc(", "#define ", "sizeof("]),
    (
        "code/javascript",
        &["function ", "var ", "let ", "const ", "document.", "window.", "=>", "console.log", "===", "eval("],
    ),
];

/// A single keyword contributes at most this much.
const MAX_HITS_PER_KEYWORD: u32 = 3;
const EXTENSION_BONUS: u32 = 2;

struct Indicators {
    matcher: AhoCorasick,
    /// keyword index → languages (indices into LANGUAGES) it counts for
    owners: Vec<Vec<usize>>,
}

static INDICATORS: Lazy<Indicators> = Lazy::new(|| {
    let mut keywords: Vec<&str> = Vec::new();
    let mut owners: Vec<Vec<usize>> = Vec::new();
    for (lang, words) in LANGUAGES.iter().enumerate() {
        for &w in words.1 {
            match keywords.iter().position(|k| *k == w) {
                Some(i) => owners[i].push(lang),
                None => {
                    keywords.push(w);
                    owners.push(vec![lang]);
                }
            }
        }
    }
    let matcher = AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::Standard)
        .build(&keywords)
        .expect("valid language indicator automaton");
    Indicators { matcher, owners }
});

/// Language implied by a file name, via its guessed MIME type.
fn extension_language(subject: &Subject<'_>) -> Option<&'static str> {
    let mime = mime_guess::from_path(subject.path()?).first()?;
    let m = mime.essence_str();
    let lang = if m.contains("python") {
        "code/python"
    } else if m.contains("javascript") {
        "code/javascript"
    } else if m.contains("php") {
        "code/php"
    } else if m.contains("perl") {
        "code/perl"
    } else if m.contains("ruby") {
        "code/ruby"
    } else if m.contains("x-sh") {
        "code/shell"
    } else if m == "text/html" {
        "code/html"
    } else if m.ends_with("/xml") {
        "code/xml"
    } else if m.contains("java") {
        "code/java"
    } else if m == "text/x-c" {
        "code/c"
    } else if m.contains("vbscript") {
        "code/vbs"
    } else if m.contains("msdos-program") || m.contains("bat") {
        "code/batch"
    } else {
        return None;
    };
    Some(lang)
}

/// Leading text, or `None` for binary content.
pub fn as_text(sample: &[u8]) -> Option<&str> {
    if sample.is_empty() || sample.contains(&0) {
        return None;
    }
    let text = match std::str::from_utf8(sample) {
        Ok(t) => t,
        // tolerate a sequence cut off at the end of the sample
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&sample[..e.valid_up_to()]).ok()?,
        Err(_) => return None,
    };
    let total = text.chars().count();
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t' | '\x0c'))
        .count();
    (printable * 100 >= total * 90).then_some(text)
}

/// Indicator score per language tag.
pub fn score_languages(text: &str) -> BTreeMap<&'static str, u32> {
    let ind = &*INDICATORS;
    let mut hits = vec![0u32; ind.owners.len()];
    for m in ind.matcher.find_overlapping_iter(text) {
        let h = &mut hits[m.pattern().as_usize()];
        *h = (*h + 1).min(MAX_HITS_PER_KEYWORD);
    }
    let mut scores = BTreeMap::new();
    for (kw, count) in hits.iter().enumerate().filter(|(_, c)| **c > 0) {
        for &lang in &ind.owners[kw] {
            *scores.entry(LANGUAGES[lang].0).or_insert(0) += count;
        }
    }
    scores
}

/// Default keyword-scoring guesser.
#[derive(Debug, Clone, Default)]
pub struct HeuristicLanguageGuesser {
    cfg: LanguageConfig,
}

impl HeuristicLanguageGuesser {
    pub fn new(cfg: LanguageConfig) -> Self {
        Self { cfg }
    }

    /// Best code language for `text` with an optional extension hint.
    pub fn best_language(&self, text: &str, hint: Option<&str>) -> Option<&'static str> {
        let mut scores = score_languages(text);
        if let Some(h) = hint {
            if let Some(s) = scores.get_mut(h) {
                *s += EXTENSION_BONUS;
            }
        }
        let mut best: Option<(&'static str, u32)> = None;
        for &(tag, _) in LANGUAGES {
            let s = scores.get(tag).copied().unwrap_or(0);
            if s >= self.cfg.min_score && best.map_or(true, |(_, b)| s > b) {
                best = Some((tag, s));
            }
        }
        debug!(?best, ?hint, "language scores");
        best.map(|(t, _)| t)
    }

    fn guess_text(&self, text: &str, hint: Option<&str>, fallback: &str) -> String {
        let trimmed = text.trim_start();
        if (trimmed.starts_with('{') || trimmed.starts_with('['))
            && serde_json::from_str::<serde_json::Value>(text).is_ok()
        {
            return JSON_TAG.to_string();
        }
        if let Some(lang) = self.best_language(text, hint) {
            return lang.to_string();
        }
        if fallback == UNKNOWN_TAG || fallback == TEXT_TAG {
            return TEXT_TAG.to_string();
        }
        match whatlang::detect(text) {
            Some(info) if info.is_reliable() => {
                debug!(lang = ?info.lang(), "natural language text");
                TEXT_TAG.to_string()
            }
            _ => fallback.to_string(),
        }
    }
}

impl LanguageGuesser for HeuristicLanguageGuesser {
    fn guess(
        &self,
        subject: &Subject<'_>,
        _current: &IdentificationResult,
        fallback: &str,
    ) -> Result<String> {
        let sample = subject.read_at(0, self.cfg.sample_size)?;
        let Some(text) = as_text(&sample) else {
            return Ok(fallback.to_string());
        };
        Ok(self.guess_text(text, extension_language(subject), fallback))
    }
}

/// Guessed tag with failures folded into `fallback`.
pub fn guess_language(
    guesser: &dyn LanguageGuesser,
    subject: &Subject<'_>,
    current: &IdentificationResult,
    fallback: &str,
) -> String {
    match guesser.guess(subject, current, fallback) {
        Ok(tag) => tag,
        Err(e) => {
            warn!("language guess failed, keeping {}: {}", fallback, e);
            fallback.to_string()
        }
    }
}
