//! Free-text vibe parsing.
//!
//! Each cascade below is a list of mutually exclusive keyword groups tested
//! in order; the first group that matches decides the cascade. Matching is
//! whole-word and case-insensitive. After the cascades, a setting phrase
//! ("morning", "gym", "road trip", ...) may supply a preset as the base layer
//! underneath the keyword values.

use once_cell::sync::Lazy;
use regex::Regex;

use super::presets::{Activity, COFFEE_CONTEXT, TimeOfDay};
use super::AudioTargets;

fn words(alternatives: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).expect("vibe keyword pattern is valid")
}

static HIGH_ENERGY: Lazy<Regex> = Lazy::new(|| words("hype|pump|intense|powerful|explosive|wild"));
static UPBEAT: Lazy<Regex> = Lazy::new(|| words("energetic|upbeat|lively|dynamic"));
static MELLOW: Lazy<Regex> = Lazy::new(|| words("chill|relaxed|mellow|calm|peaceful|soft"));
static AMBIENT: Lazy<Regex> = Lazy::new(|| words("ambient|dreamy|floating"));

static JOYFUL: Lazy<Regex> =
    Lazy::new(|| words(r"happy|joy|euphoric|celebrat\w*|cheerful|bright"));
static SORROWFUL: Lazy<Regex> =
    Lazy::new(|| words(r"sad|melanchol\w*|depress\w*|lonely|heartbreak|cry"));
static FURIOUS: Lazy<Regex> = Lazy::new(|| words("angry|rage|furious|aggressive"));
static TENDER: Lazy<Regex> = Lazy::new(|| words("romantic|love|sensual|intimate"));

static DANCEFLOOR: Lazy<Regex> = Lazy::new(|| words("dance|dancing|groove|groovy|funky|disco"));
static SWAYING: Lazy<Regex> = Lazy::new(|| words("sway|bob|movement"));

static ACOUSTIC: Lazy<Regex> = Lazy::new(|| words("acoustic|unplugged|folk|organic"));
static ELECTRONIC: Lazy<Regex> = Lazy::new(|| words("electronic|synth|techno|house|edm"));

static INSTRUMENTAL: Lazy<Regex> =
    Lazy::new(|| words(r"instrumental|no\s+vocals|without\s+words|background"));

static FAST: Lazy<Regex> = Lazy::new(|| words("fast|quick|rapid|racing"));
static SLOW: Lazy<Regex> = Lazy::new(|| words(r"slow|slowdown|laid\s+back"));

/// Setting phrases in priority order, each with the preset it implies
static CONTEXTS: Lazy<Vec<(Regex, AudioTargets)>> = Lazy::new(|| {
    vec![
        (words("morning|sunrise|breakfast|dawn"), TimeOfDay::Morning.targets()),
        (words("afternoon|midday|lunch"), TimeOfDay::Afternoon.targets()),
        (words(r"late\s+night|midnight|coding\s+session|night"), TimeOfDay::Night.targets()),
        (words("sunset|evening|dusk"), TimeOfDay::Evening.targets()),
        (words("workout|gym|exercise|running|training|lifting"), Activity::Workout.targets()),
        (words("focus|study|studying|concentration|work"), Activity::Focus.targets()),
        (words("party|club|pregame"), Activity::Party.targets()),
        (words("sleep|sleeping|bedtime|lullaby"), Activity::Sleep.targets()),
        (words(r"road\s+trip|driving|drive"), Activity::Commute.targets()),
        (words("coffee|cafe|café|jazz"), COFFEE_CONTEXT),
    ]
});

const ELECTRONIC_ENERGY_BOOST: f64 = 0.2;
const ELECTRONIC_ENERGY_BASE: f64 = 0.5;

/// Turn a free-text description into audio targets
pub fn parse_vibe(text: &str) -> AudioTargets {
    let keywords = keyword_targets(text);

    match context_layer(text) {
        Some(base) => AudioTargets::layered([base, keywords]),
        None => keywords,
    }
}

fn keyword_targets(text: &str) -> AudioTargets {
    let mut targets = AudioTargets::NONE;

    if HIGH_ENERGY.is_match(text) {
        targets.energy = Some(0.9);
    } else if UPBEAT.is_match(text) {
        targets.energy = Some(0.75);
    } else if MELLOW.is_match(text) {
        targets.energy = Some(0.3);
    } else if AMBIENT.is_match(text) {
        targets.energy = Some(0.2);
    }

    // Anger and romance imply an energy level and replace the energy cascade
    if JOYFUL.is_match(text) {
        targets.valence = Some(0.8);
    } else if SORROWFUL.is_match(text) {
        targets.valence = Some(0.2);
    } else if FURIOUS.is_match(text) {
        targets.valence = Some(0.2);
        targets.energy = Some(0.9);
    } else if TENDER.is_match(text) {
        targets.valence = Some(0.6);
        targets.energy = Some(0.4);
    }

    if DANCEFLOOR.is_match(text) {
        targets.danceability = Some(0.85);
    } else if SWAYING.is_match(text) {
        targets.danceability = Some(0.65);
    }

    if ACOUSTIC.is_match(text) {
        targets.acousticness = Some(0.8);
    } else if ELECTRONIC.is_match(text) {
        targets.acousticness = Some(0.1);
        let energy = targets.energy.unwrap_or(ELECTRONIC_ENERGY_BASE) + ELECTRONIC_ENERGY_BOOST;
        targets.energy = Some(energy.min(1.0));
    }

    if INSTRUMENTAL.is_match(text) {
        targets.instrumentalness = Some(0.8);
    }

    if FAST.is_match(text) {
        targets.tempo = Some(140.0);
    } else if SLOW.is_match(text) {
        targets.tempo = Some(80.0);
    }

    targets
}

fn context_layer(text: &str) -> Option<AudioTargets> {
    CONTEXTS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, preset)| *preset)
}
