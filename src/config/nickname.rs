//! Nickname resolution and the random fallback generator.
//!
//! Random nicknames use the format `AdjectiveNounNN` (e.g. `NeonFox42`).

use rand::RngExt;

const ADJECTIVES: &[&str] = &[
    "Shadow", "Neon", "Cyber", "Lunar", "Solar", "Frost", "Storm", "Dark", "Pixel", "Ghost",
    "Hyper", "Turbo", "Cosmic", "Iron", "Silent", "Rogue", "Atomic", "Rapid", "Zero", "Nova",
    "Onyx", "Cobalt", "Azure", "Hex", "Wired", "Chrome", "Prism",
];

const NOUNS: &[&str] = &[
    "Fox", "Wolf", "Hawk", "Raven", "Lynx", "Viper", "Shark", "Panda", "Tiger", "Cobra", "Owl",
    "Crab", "Otter", "Hound", "Crow", "Bear", "Moth", "Newt", "Crane", "Bison", "Byte", "Node",
];

/// Longest accepted nickname is one byte less than this.
pub const NICK_LEN: usize = 64;

/// Generate a random nickname like `NeonFox42`.
pub fn generate_nickname() -> String {
    let mut rng = rand::rng();
    let adj = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    let num: u8 = rng.random_range(0..100);
    format!("{}{}{}", adj, noun, num)
}

/// Pick the user name: explicit flag, then `$USER`, then a random nickname.
pub fn resolve_user(flag: Option<String>, env_user: Option<String>) -> String {
    flag.or(env_user)
        .filter(|u| !u.is_empty())
        .unwrap_or_else(generate_nickname)
}

/// Pick the nickname: explicit flag, then `$IRCNICK`, then the user name.
///
/// Candidates that are too long are skipped, except an explicit flag, which
/// is an error.
pub fn resolve_nick(flag: Option<String>, env_nick: Option<String>, user: &str) -> Option<String> {
    if let Some(nick) = flag {
        return (nick.len() < NICK_LEN && !nick.is_empty()).then_some(nick);
    }
    env_nick
        .into_iter()
        .chain(std::iter::once(user.to_string()))
        .find(|n| !n.is_empty() && n.len() < NICK_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_nick_shape() {
        let nick = generate_nickname();
        assert!(nick.len() < NICK_LEN);
        assert!(nick.chars().next().unwrap().is_ascii_uppercase());
    }

    #[test]
    fn test_nick_fallback_order() {
        assert_eq!(resolve_nick(Some("a".into()), Some("b".into()), "c").as_deref(), Some("a"));
        assert_eq!(resolve_nick(None, Some("b".into()), "c").as_deref(), Some("b"));
        assert_eq!(resolve_nick(None, None, "c").as_deref(), Some("c"));
        assert_eq!(resolve_nick(None, Some("x".repeat(NICK_LEN)), "c").as_deref(), Some("c"));
        assert_eq!(resolve_nick(Some("x".repeat(NICK_LEN)), None, "c"), None);
    }

    #[test]
    fn test_user_fallback() {
        assert_eq!(resolve_user(Some("u".into()), Some("env".into())), "u");
        assert_eq!(resolve_user(None, Some("env".into())), "env");
        assert!(!resolve_user(None, None).is_empty());
    }
}
