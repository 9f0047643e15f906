// ABOUTME: Word source for random route host names.
// ABOUTME: Random routes look like `appname-adjective-noun`.

const ADJECTIVES: &[&str] = &[
    "brave", "calm", "daring", "eager", "fierce", "gentle", "happy", "jolly", "keen", "lively",
    "merry", "nimble", "proud", "quiet", "rapid", "shiny", "sturdy", "swift", "tidy", "witty",
];

const NOUNS: &[&str] = &[
    "badger", "bison", "crane", "dingo", "eland", "ferret", "gecko", "heron", "ibex", "jackal",
    "koala", "lemur", "marmot", "newt", "okapi", "panda", "quokka", "raven", "tapir", "wombat",
];

pub trait RandomWords: Send + Sync {
    fn adjective(&self) -> String;
    fn noun(&self) -> String;
}

/// Picks uniformly from built-in word lists with the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordList;

impl WordList {
    pub fn new() -> Self {
        Self
    }

    fn pick(&self, words: &'static [&'static str]) -> String {
        words[rand::random_range(0..words.len())].to_string()
    }
}

impl RandomWords for WordList {
    fn adjective(&self) -> String {
        self.pick(ADJECTIVES)
    }

    fn noun(&self) -> String {
        self.pick(NOUNS)
    }
}

/// Always returns the same pair.
#[derive(Debug, Clone)]
pub struct FixedWords {
    pub adjective: String,
    pub noun: String,
}

impl FixedWords {
    pub fn new(adjective: &str, noun: &str) -> Self {
        Self {
            adjective: adjective.to_string(),
            noun: noun.to_string(),
        }
    }
}

impl RandomWords for FixedWords {
    fn adjective(&self) -> String {
        self.adjective.clone()
    }

    fn noun(&self) -> String {
        self.noun.clone()
    }
}
