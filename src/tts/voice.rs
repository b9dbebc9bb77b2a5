use super::types::{ContentCategory, Gender, VoiceInfo};

/// Picks an on-device voice for the category: female voices for
/// affirmations, male for tips, then the platform default, then the first.
pub fn select_voice(voices: &[VoiceInfo], category: ContentCategory) -> Option<&VoiceInfo> {
    let (gender, keywords): (Gender, &[&str]) = match category {
        ContentCategory::Affirmations => (Gender::Female, &["female", "woman"][..]),
        ContentCategory::Tips => (Gender::Male, &["male", "man"][..]),
    };

    voices
        .iter()
        .find(|v| v.gender == Some(gender) || name_matches(&v.name, keywords, category))
        .or_else(|| voices.iter().find(|v| v.is_default))
        .or_else(|| voices.first())
}

fn name_matches(name: &str, keywords: &[&str], category: ContentCategory) -> bool {
    let name = name.to_lowercase();
    // "female"/"woman" contain "male"/"man"; tips must not pick those up.
    if category == ContentCategory::Tips && (name.contains("female") || name.contains("woman")) {
        return false;
    }
    keywords.iter().any(|k| name.contains(k))
}
