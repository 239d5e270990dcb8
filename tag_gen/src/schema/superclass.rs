/* Expansion of superclass shorthands in dependency class lists. */

use tag_types::superclass_members;

/// Token meaning "any class".
pub const ANY_CLASS: &str = "*";

/// Expand superclasses into their concrete members, keeping first-seen order.
/// The superclass itself stays in the list; tags can be instances of it.
/// Returns an empty list for "any class".
pub fn expand_classes(classes: &[String]) -> Vec<String> {
    if classes.iter().any(|c| c == ANY_CLASS) {
        return Vec::new();
    }
    let mut out: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !out.iter().any(|c| c == name) {
            out.push(name.to_string());
        }
    };
    for class in classes {
        push(class);
        if let Some(members) = superclass_members(class) {
            for member in members {
                push(member);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unit_expands_to_members() {
        assert_eq!(expand_classes(&names(&["unit"])), names(&["unit", "biped", "vehicle"]));
    }

    #[test]
    fn overlapping_superclasses_union() {
        let expanded = expand_classes(&names(&["item", "weapon", "unit"]));
        assert_eq!(
            expanded,
            names(&["item", "weapon", "equipment", "garbage", "unit", "biped", "vehicle"])
        );
    }

    #[test]
    fn any_and_unknown_tokens() {
        assert!(expand_classes(&names(&["*"])).is_empty());
        assert_eq!(expand_classes(&names(&["sound"])), names(&["sound"]));
        assert_eq!(expand_classes(&names(&["mystery"])), names(&["mystery"]));
    }
}
