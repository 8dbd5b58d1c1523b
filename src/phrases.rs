use std::collections::HashMap;
use std::sync::LazyLock;

static PHRASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("Energy", "Boost Your Drive"),
        ("Focus", "Sharpen Your Mind"),
        ("Purpose", "Is purpose important?"),
        ("Strength", "Build Resilience"),
        ("Peace", "Inner Peace"),
        ("Clarity", "Removing Doubt"),
        ("Harmony", "Live in Sync"),
        ("Vitality", "Thrive with Vigor"),
        ("Joy", "Spark Happiness"),
        ("Growth", "Evolve Every Day"),
        ("Challenges", "Lessons from conflict"),
    ])
});

/// Centre text for a satellite label; empty when the label is unmapped.
pub fn phrase_for(label: &str) -> &'static str {
    PHRASES.get(label.trim()).copied().unwrap_or("")
}

/// Every mapped label, sorted.
pub fn labels() -> Vec<&'static str> {
    let mut labels: Vec<_> = PHRASES.keys().copied().collect();
    labels.sort_unstable();
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_map_to_phrases() {
        assert_eq!(phrase_for("Energy"), "Boost Your Drive");
        assert_eq!(phrase_for(" Challenges "), "Lessons from conflict");
        assert_eq!(labels().len(), 11);
    }

    #[test]
    fn unknown_label_is_empty() {
        assert_eq!(phrase_for("Nonsense"), "");
        assert_eq!(phrase_for(""), "");
    }
}
