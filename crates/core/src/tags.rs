//! Content tag catalog and directive compilation.
//!
//! Each selectable tag carries a fixed directive paragraph that is injected
//! into the generation prompt as a mandatory instruction block.

/// Tag grouping shown in the create form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCategory {
    Characters,
    Setting,
    Theme,
}

/// A selectable content tag and its prompt directive.
#[derive(Debug, Clone, Copy)]
pub struct TagDefinition {
    /// Stable id stored in the story context.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    pub category: TagCategory,
    /// Instruction paragraph injected verbatim when the tag is selected.
    pub directive: &'static str,
}

pub const TAG_DEFINITIONS: [TagDefinition; 18] = [
    // Characters
    TagDefinition {
        id: "animals",
        name: "Animals",
        category: TagCategory::Characters,
        directive: "ANIMALS: All main characters must be animals (no human protagonists). \
            Describe their animal traits, like fur, feathers, scales, and how they move. \
            The setting should feel like their natural world. Use animal sounds and \
            behaviors naturally in the story.",
    },
    TagDefinition {
        id: "fairies",
        name: "Fairies",
        category: TagCategory::Characters,
        directive: "FAIRIES: The story features fairies, pixies, or magical winged creatures \
            as main characters or important helpers. Include wings, sparkles, small size, \
            and gentle magic. The world has enchanted elements like glowing flowers, hidden \
            groves, or magical dust.",
    },
    TagDefinition {
        id: "pirates",
        name: "Pirates",
        category: TagCategory::Characters,
        directive: "PIRATES: The story takes place on a ship, an island, or the high seas. \
            Main characters are pirates or sea adventurers. Include treasure, maps, sailing, \
            and friendly pirate tropes (parrots, treasure chests, gentle swashbuckling). \
            Keep it playful, not scary.",
    },
    TagDefinition {
        id: "robots",
        name: "Robots",
        category: TagCategory::Characters,
        directive: "ROBOTS: The story features robots or friendly machines as characters. \
            They can be helpers, friends, or explorers. Include gentle technology, like \
            beeps, whirrs, and helpful gadgets. The world can mix nature with friendly \
            tech. Keep robots kind and curious.",
    },
    TagDefinition {
        id: "dinosaurs",
        name: "Dinosaurs",
        category: TagCategory::Characters,
        directive: "DINOSAURS: The story features friendly dinosaurs as main characters. \
            All dinosaurs are gentle, kind, and curious, never scary or aggressive. Include \
            big and small dinosaurs, describe their scales, long necks, or tiny arms. Use \
            dinosaur vocabulary (roar, stomp, nest, eggs) in a playful way. Keep it \
            wondrous and cozy.",
    },
    TagDefinition {
        id: "unicorns",
        name: "Unicorns",
        category: TagCategory::Characters,
        directive: "UNICORNS: The story features unicorns or horse-like magical creatures \
            as main characters. Include sparkles, rainbows, gentle horns, and soft magic. \
            Unicorns are kind, helpful, and dreamy. Describe their flowing manes, glowing \
            presence, and gentle nature. Keep it whimsical and delightful.",
    },
    // Setting
    TagDefinition {
        id: "forest",
        name: "Forest",
        category: TagCategory::Setting,
        directive: "FOREST: The story takes place in a forest, woodland, or among trees. \
            Include trees, mushrooms, streams, leaves, and woodland creatures. The forest \
            can be magical or cozy. Describe the sounds (rustling leaves, birds) and the \
            feeling of being among trees.",
    },
    TagDefinition {
        id: "ocean",
        name: "Ocean",
        category: TagCategory::Setting,
        directive: "OCEAN: The story takes place by the sea, under the water, or on the \
            shore. Include waves, shells, fish, sand, or underwater scenes. Use ocean \
            vocabulary like tide, coral, seaweed, and dolphins naturally. Keep it calm and \
            wondrous, not stormy or frightening.",
    },
    TagDefinition {
        id: "space",
        name: "Space",
        category: TagCategory::Setting,
        directive: "SPACE: The story takes place in space, on another planet, or in a \
            rocket. Include stars, planets, moons, or zero-gravity moments. Use space \
            vocabulary (stars, galaxy, astronaut, rocket) naturally. Keep it wondrous, not \
            scary.",
    },
    TagDefinition {
        id: "castle",
        name: "Castle",
        category: TagCategory::Setting,
        directive: "CASTLE: The story takes place in or around a castle. Include towers, \
            courtyards, knights, royalty, or friendly castle life. The castle can be cozy, \
            magical, or adventurous. Describe stone walls, tapestries, and castle sounds. \
            Keep it gentle and storybook-like.",
    },
    TagDefinition {
        id: "farm",
        name: "Farm",
        category: TagCategory::Setting,
        directive: "FARM: The story takes place on a farm or in the countryside. Include \
            farm animals, barns, fields, tractors, or gardens. Describe the sounds and \
            smells of the farm. Characters can be farmers, animals, or children visiting. \
            Keep it warm and cozy.",
    },
    // Theme
    TagDefinition {
        id: "friendship",
        name: "Friendship",
        category: TagCategory::Theme,
        directive: "FRIENDSHIP: The central theme is friendship: making friends, helping a \
            friend, or loyalty. The story must resolve around a friendship moment: meeting \
            a new friend, helping a friend in need, or celebrating together. The moral \
            should be about kindness and connection.",
    },
    TagDefinition {
        id: "bravery",
        name: "Bravery",
        category: TagCategory::Theme,
        directive: "BRAVERY: The central theme is bravery: a character faces a fear or \
            challenge and overcomes it. The challenge should be age-appropriate (trying \
            something new, standing up for a friend, going to bed without fear). The moral \
            should celebrate courage in small, relatable ways.",
    },
    TagDefinition {
        id: "magic",
        name: "Magic",
        category: TagCategory::Theme,
        directive: "MAGIC: The story includes magical elements: spells, wands, enchanted \
            objects, or magical creatures. Magic should be gentle, wondrous, and used for \
            good. Describe magic with sensory details (sparkles, glows, soft \
            transformations). Keep it simple and delightful.",
    },
    TagDefinition {
        id: "discovery",
        name: "Discovery",
        category: TagCategory::Theme,
        directive: "DISCOVERY: The central theme is discovery: exploring, learning \
            something new, or finding something wonderful. The story follows a character's \
            curiosity and what they find. Include moments of wonder, surprise, or gentle \
            revelation. The moral celebrates curiosity and learning.",
    },
    TagDefinition {
        id: "family",
        name: "Family",
        category: TagCategory::Theme,
        directive: "FAMILY: The central theme is family: parents, siblings, grandparents, \
            or loved ones. The story celebrates being together, helping at home, or a \
            special family moment. Include warm family interactions, cozy routines, or a \
            family adventure. The moral is about love, belonging, and connection with \
            family.",
    },
    TagDefinition {
        id: "kindness",
        name: "Kindness",
        category: TagCategory::Theme,
        directive: "KINDNESS: The central theme is kindness: helping others, sharing, or \
            being nice. A character does something kind and it makes a difference. Include \
            gentle acts of generosity, empathy, or care. The moral celebrates how kindness \
            spreads and makes everyone feel good.",
    },
    TagDefinition {
        id: "silly",
        name: "Silly",
        category: TagCategory::Theme,
        directive: "SILLY: The story has a playful, funny tone. Include silly moments: \
            funny sounds, mixed-up words, gentle surprises, or playful chaos. Characters \
            can be goofy or make silly mistakes that turn out okay. Keep humor gentle and \
            age-appropriate. The story should make kids smile and giggle.",
    },
];

/// Directive text for a single tag, matched by id or display name
/// (case-insensitive). Unknown tags yield an empty string.
pub fn tag_directive(tag_id_or_name: &str) -> &'static str {
    let normalized = tag_id_or_name.trim().to_lowercase();
    TAG_DEFINITIONS
        .iter()
        .find(|t| t.id == normalized || t.name.to_lowercase() == normalized)
        .map(|t| t.directive)
        .unwrap_or("")
}

/// Build the full tag-directives block for the prompt: known directives in
/// input order, separated by blank lines. Unknown ids are silently dropped;
/// the result is empty if no tag resolves.
pub fn build_tag_directives_block(selected: &[String]) -> String {
    let directives: Vec<&str> = selected
        .iter()
        .map(|id| tag_directive(id))
        .filter(|d| !d.is_empty())
        .collect();
    directives.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_tags_concatenate_in_selection_order() {
        let block = build_tag_directives_block(&ids(&["animals", "forest"]));
        let animals_at = block.find("ANIMALS:").unwrap();
        let forest_at = block.find("FOREST:").unwrap();
        assert!(animals_at < forest_at);
        assert!(block.contains("\n\n"));
    }

    #[test]
    fn unknown_tag_is_silently_dropped() {
        let block = build_tag_directives_block(&ids(&["animals", "volcanoes", "forest"]));
        assert!(block.contains("ANIMALS:"));
        assert!(block.contains("FOREST:"));
        assert!(!block.contains("volcanoes"));
        // Same output as if the unknown tag was never selected.
        assert_eq!(block, build_tag_directives_block(&ids(&["animals", "forest"])));
    }

    #[test]
    fn no_resolvable_tags_yields_empty_block() {
        assert_eq!(build_tag_directives_block(&[]), "");
        assert_eq!(build_tag_directives_block(&ids(&["volcanoes"])), "");
    }

    #[test]
    fn display_name_lookup_is_case_insensitive() {
        assert_eq!(tag_directive("Dinosaurs"), tag_directive("dinosaurs"));
        assert!(!tag_directive("DINOSAURS").is_empty());
    }

    #[test]
    fn every_tag_has_a_nonempty_directive() {
        for tag in &TAG_DEFINITIONS {
            assert!(!tag.directive.is_empty(), "tag {} missing directive", tag.id);
        }
    }
}
