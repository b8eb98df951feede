//! Fixed mnemonic wordlist
//!
//! Changing any entry breaks checksum compatibility between app versions, so
//! the list is frozen per [`WORDLIST_VERSION`].

/// Version of [`WORDLIST`]; bump together with any change to the list
pub const WORDLIST_VERSION: u8 = 1;

/// 256 distinct lowercase words, one per byte value, sorted
pub const WORDLIST: [&str; 256] = [
    "acid", "acorn", "actor", "adobe", "agent", "alarm", "album", "alien", "alley",
    "amber", "angle", "ankle", "apple", "apron", "arena", "armor", "arrow", "aspen",
    "atlas", "attic", "audio", "autumn", "bacon", "badge", "bagel", "baker", "bamboo",
    "banjo", "barley", "basil", "beach", "beacon", "berry", "bison", "blade", "blaze",
    "blend", "bloom", "bonus", "brave", "bread", "brick", "bridge", "brook", "broom",
    "cabin", "cable", "cactus", "camel", "candle", "canoe", "canyon", "cargo", "carpet",
    "cedar", "chalk", "charm", "cherry", "chess", "chief", "cider", "cinema", "citrus",
    "clamp", "cliff", "clover", "cobra", "comet", "coral", "cotton", "cradle", "crane",
    "daisy", "dance", "delta", "denim", "desert", "dingo", "dolphin", "donkey", "dragon",
    "drama", "dream", "drum", "dune", "eagle", "easel", "echo", "elbow", "elder", "ember",
    "emerald", "engine", "epoch", "fabric", "falcon", "feather", "fern", "ferry", "fiber",
    "field", "fjord", "flame", "flint", "flute", "focus", "forest", "fossil", "fox",
    "frost", "fudge", "galaxy", "garden", "garlic", "gecko", "ginger", "glacier", "globe",
    "gravel", "grove", "guitar", "habit", "hammer", "harbor", "harvest", "hazel",
    "helmet", "honey", "horizon", "husky", "igloo", "indigo", "iris", "island", "ivory",
    "jacket", "jaguar", "jasmine", "jelly", "jewel", "jungle", "kayak", "kernel",
    "kettle", "kitten", "koala", "label", "ladder", "lagoon", "lantern", "lemon", "lilac",
    "linen", "lizard", "lobster", "locket", "lotus", "lunar", "magnet", "mango", "maple",
    "marble", "meadow", "melon", "meteor", "mint", "mirror", "nectar", "needle", "nickel",
    "noodle", "nugget", "oasis", "ocean", "olive", "onion", "opal", "orbit", "orchid",
    "otter", "oxygen", "paddle", "panda", "paper", "parrot", "pebble", "pepper", "piano",
    "pilot", "planet", "plaza", "pocket", "polar", "poppy", "prism", "pumpkin", "puzzle",
    "quartz", "quiver", "rabbit", "radar", "radio", "raven", "reef", "ribbon", "river",
    "robin", "rocket", "saddle", "salmon", "sandal", "satin", "scarf", "shadow", "shell",
    "sierra", "silver", "sketch", "sonar", "spiral", "sponge", "spruce", "squid", "stone",
    "sugar", "summit", "tango", "temple", "thunder", "tiger", "timber", "toast", "topaz",
    "torch", "tulip", "tundra", "turtle", "unicorn", "urchin", "valley", "velvet",
    "violin", "vortex", "wafer", "walnut", "walrus", "whale", "willow", "window",
    "wizard", "yacht", "yogurt", "zebra", "zenith", "zephyr", "zipper",
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn words_are_unique() {
        let unique: HashSet<_> = WORDLIST.iter().collect();
        assert_eq!(unique.len(), WORDLIST.len());
    }

    #[test]
    fn words_are_lowercase_ascii() {
        for word in WORDLIST {
            assert!(!word.is_empty());
            assert!(word.chars().all(|c| c.is_ascii_lowercase()), "bad word: {word}");
        }
    }

    #[test]
    fn words_are_sorted() {
        assert!(WORDLIST.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn frozen_anchors() {
        assert_eq!(WORDLIST[0], "acid");
        assert_eq!(WORDLIST[128], "horizon");
        assert_eq!(WORDLIST[255], "zipper");
    }
}
