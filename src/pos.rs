use std::fmt;

/// Grammatical category assigned to a word occurrence.
///
/// Categories the templates know about get their own variant. Anything else a
/// tagger reports is kept verbatim in `Other` and only matches a template slot
/// carrying the exact same label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pos {
    Det,
    Adj,
    N,
    V,
    Prep,
    Conj,
    Adv,
    Pron,
    Other(String),
}

impl Pos {
    /// Parse a category label, case-insensitively.
    ///
    /// Accepts the short names used in template files (`Det`, `N`, ...), the
    /// long names (`determiner`, `noun`, ...) and the universal tag names
    /// (`adp`, `cconj`, `propn`, ...).
    pub fn parse(label: &str) -> Pos {
        let lower = label.trim().to_lowercase();
        match lower.as_str() {
            "det" | "determiner" => Pos::Det,
            "adj" | "adjective" => Pos::Adj,
            "n" | "noun" | "propn" => Pos::N,
            "v" | "verb" => Pos::V,
            "prep" | "preposition" | "adp" => Pos::Prep,
            "conj" | "conjunction" | "cconj" | "sconj" => Pos::Conj,
            "adv" | "adverb" => Pos::Adv,
            "pron" | "pronoun" => Pos::Pron,
            _ => Pos::Other(lower),
        }
    }

    /// Map a Penn Treebank tag (as produced by nlprule) to a category.
    pub fn from_penn(tag: &str) -> Option<Pos> {
        match tag {
            "NN" | "NNS" | "NNP" | "NNPS" => Some(Pos::N),
            "VB" | "VBD" | "VBG" | "VBN" | "VBP" | "VBZ" => Some(Pos::V),
            "JJ" | "JJR" | "JJS" => Some(Pos::Adj),
            "RB" | "RBR" | "RBS" => Some(Pos::Adv),
            "IN" => Some(Pos::Prep),
            "DT" => Some(Pos::Det),
            "CC" => Some(Pos::Conj),
            "PRP" | "PRP$" | "WP" | "WP$" => Some(Pos::Pron),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Pos::Det => "Det",
            Pos::Adj => "Adj",
            Pos::N => "N",
            Pos::V => "V",
            Pos::Prep => "Prep",
            Pos::Conj => "Conj",
            Pos::Adv => "Adv",
            Pos::Pron => "Pron",
            Pos::Other(label) => label,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
