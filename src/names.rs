//! Fallback display names for players who join without one.

use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "Swift", "Curious", "Sneaky", "Brave", "Clever", "Dizzy", "Eager",
    "Fuzzy", "Grumpy", "Hasty", "Jolly", "Lucky", "Nimble", "Quiet",
    "Rapid", "Witty",
];

const ANIMALS: &[&str] = &[
    "Badger", "Beaver", "Dingo", "Ferret", "Gecko", "Heron", "Ibex",
    "Jackal", "Koala", "Lemur", "Marmot", "Narwhal", "Otter", "Panda",
    "Quokka", "Wombat",
];

/// Pair a random adjective with a random animal. Collisions across players
/// are tolerated, not prevented.
pub fn generate_name() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let animal = ANIMALS[rng.random_range(0..ANIMALS.len())];
    format!("{adjective} {animal}")
}

/// The trimmed requested name if non-empty, else a generated one.
pub fn resolve_name(requested: &str) -> String {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        generate_name()
    } else {
        trimmed.to_string()
    }
}
