//! Static knowledge about the PyMOL command language.
//!
//! A [`Lexicon`] is built once at startup and shared by reference (or `Arc`)
//! between the extractor, validator and corrector. It has no interior
//! mutability, so sharing it across threads needs no locking.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Loading,
    Visualization,
    Selection,
    Analysis,
    Rendering,
    Transformation,
    Styling,
    General,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Loading => "loading",
            Category::Visualization => "visualization",
            Category::Selection => "selection",
            Category::Analysis => "analysis",
            Category::Rendering => "rendering",
            Category::Transformation => "transformation",
            Category::Styling => "styling",
            Category::General => "general",
        };
        f.write_str(name)
    }
}

/// Recognized verbs, in the order used when scanning for suggestions.
const VERBS: &[&str] = &[
    "fetch", "load", "show", "hide", "color", "select", "create", "delete", "zoom", "orient",
    "center", "rotate", "translate", "ray", "png", "save", "cartoon", "sticks", "spheres",
    "surface", "mesh", "lines", "dots", "align", "super", "distance", "angle", "dihedral", "set",
    "bg_color", "group", "ungroup", "enable", "disable", "refresh", "reinitialize", "mset",
    "mview", "mplay", "mstop", "mclear", "frame", "movie", "remove", "extract", "copy", "symexp",
    "split_states", "morph", "interpolate", "smooth", "rock", "turn", "move", "clip",
];

const CATEGORIES: &[(Category, &[&str])] = &[
    (Category::Loading, &["load", "fetch", "read_pdbstr"]),
    (Category::Visualization, &["show", "hide", "color", "set", "bg_color"]),
    (Category::Selection, &["select", "create", "group"]),
    (Category::Analysis, &["distance", "angle", "dihedral", "align", "super"]),
    (Category::Rendering, &["ray", "png", "pse", "session"]),
    (Category::Transformation, &["rotate", "translate", "zoom", "orient"]),
    (Category::Styling, &["cartoon", "sticks", "spheres", "surface", "mesh"]),
];

const COLORS: &[&str] = &[
    "red", "green", "blue", "yellow", "orange", "purple", "cyan", "magenta", "white", "black",
    "gray", "grey", "brown", "pink", "lime", "olive", "navy", "teal", "silver", "maroon", "aqua",
    "fuchsia",
];

const TYPOS: &[(&str, &str)] = &[
    ("cartoom", "cartoon"),
    ("cartton", "cartoon"),
    ("stiks", "sticks"),
    ("sphres", "spheres"),
    ("surfce", "surface"),
    ("colr", "color"),
    ("selet", "select"),
    ("fetc", "fetch"),
    ("lod", "load"),
    ("sho", "show"),
    ("hid", "hide"),
    ("zoo", "zoom"),
    ("oriet", "orient"),
    ("ceter", "center"),
];

#[derive(Debug, Clone)]
pub struct Lexicon {
    verbs: Vec<&'static str>,
    verb_set: HashSet<&'static str>,
    categories: HashMap<&'static str, Category>,
    colors: HashSet<&'static str>,
    typos: HashMap<&'static str, &'static str>,
}

impl Lexicon {
    pub fn standard() -> Self {
        let mut categories = HashMap::new();
        for (category, verbs) in CATEGORIES {
            for verb in *verbs {
                categories.entry(*verb).or_insert(*category);
            }
        }

        Self {
            verbs: VERBS.to_vec(),
            verb_set: VERBS.iter().copied().collect(),
            categories,
            colors: COLORS.iter().copied().collect(),
            typos: TYPOS.iter().copied().collect(),
        }
    }

    pub fn is_verb(&self, verb: &str) -> bool {
        self.verb_set.contains(verb)
    }

    /// Recognized verbs in their declared order.
    pub fn verbs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.verbs.iter().copied()
    }

    /// Category tag of a verb. Recognized verbs without a tag are `General`.
    pub fn category(&self, verb: &str) -> Option<Category> {
        match self.categories.get(verb) {
            Some(category) => Some(*category),
            None if self.is_verb(verb) => Some(Category::General),
            None => None,
        }
    }

    pub fn verbs_in(&self, category: Category) -> Vec<&'static str> {
        if category == Category::General {
            return self
                .verbs()
                .filter(|v| !self.categories.contains_key(v))
                .collect();
        }
        CATEGORIES
            .iter()
            .filter(|(c, _)| *c == category)
            .flat_map(|(_, verbs)| verbs.iter().copied())
            .collect()
    }

    /// Named colors are accepted as-is, anything else only as a `0x` hex literal.
    pub fn is_color(&self, color: &str) -> bool {
        self.colors.contains(color) || color.starts_with("0x")
    }

    pub fn typo_fix(&self, verb: &str) -> Option<&'static str> {
        self.typos.get(verb).copied()
    }

    /// Canonical spelling of a verb. Already-correct verbs come back unchanged.
    pub fn canonical<'a>(&self, verb: &'a str) -> &'a str {
        match self.typos.get(verb) {
            Some(fixed) => fixed,
            None => verb,
        }
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::standard()
    }
}

/// Number of differing characters over the overlapping prefix of two words.
pub fn positional_mismatches(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).filter(|(x, y)| x != y).count()
}

/// Number of equal characters over the overlapping prefix of two words.
pub fn positional_matches(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).filter(|(x, y)| x == y).count()
}

pub fn length_gap(a: &str, b: &str) -> usize {
    a.chars().count().abs_diff(b.chars().count())
}
