//! URL → game mode classification.
//!
//! Pure and total: every input, including garbage, yields a `GameMode`.

use regex::Regex;

pub const DEFAULT_GAME_HOST: &str = "geoguessr.com";
pub const NOT_IN_GAME_LABEL: &str = "Not in a game";

/// What the user is doing, as shown on the presence display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameMode {
    label: String,
    small_icon_key: String,
    small_icon_text: String,
    is_playing: bool,
}

impl GameMode {
    pub fn new(
        label: impl Into<String>,
        small_icon_key: impl Into<String>,
        small_icon_text: impl Into<String>,
        is_playing: bool,
    ) -> Self {
        Self {
            label: label.into(),
            small_icon_key: small_icon_key.into(),
            small_icon_text: small_icon_text.into(),
            is_playing,
        }
    }

    pub fn not_in_game() -> Self {
        Self::new(NOT_IN_GAME_LABEL, "", "", false)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn small_icon_key(&self) -> &str {
        &self.small_icon_key
    }

    pub fn small_icon_text(&self) -> &str {
        &self.small_icon_text
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }
}

/// Classifies URLs of the form `https://www.<host>(/<locale>)?/<main>(/<sub>)?`.
///
/// The match is anchored at the start, so a game URL quoted inside another
/// URL is not a game page.
#[derive(Debug, Clone)]
pub struct ModeClassifier {
    pattern: Regex,
}

impl ModeClassifier {
    pub fn for_host(host: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"^https://www\.{}(?:/[a-z]{{2}})?/([a-z-]+)(?:/([a-zA-Z0-9-]+))?",
            regex::escape(host)
        ))?;
        Ok(Self { pattern })
    }

    pub fn classify(&self, url: &str) -> GameMode {
        let Some(captures) = self.pattern.captures(url) else {
            return GameMode::not_in_game();
        };
        let main = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let sub = captures.get(2).map(|m| m.as_str());

        tracing::debug!(main, sub = ?sub, "Classifying game path");
        mode_for_path(main, sub)
    }
}

fn mode_for_path(main: &str, sub: Option<&str>) -> GameMode {
    match (main, sub) {
        ("singleplayer", Some("game")) | ("game", _) => {
            GameMode::new("Singleplayer Game", "singleplayer", "Singleplayer Game", true)
        }
        ("maps", _) => GameMode::new("Selecting a map", "", "", false),
        ("duels", Some(_)) => GameMode::new("Duels Game", "ranked", "Ranked Duels Game", true),
        ("duels", None) => GameMode::new("Duels", "ranked", "Ranked Duels", true),
        ("team-duels", Some(_)) => GameMode::new(
            "Team Duels Game",
            "rankedteams",
            "Ranked Team Duels Game",
            true,
        ),
        ("team-duels", None) => {
            GameMode::new("Team Duels", "rankedteams", "Team Duels (Ranked)", true)
        }
        ("teams", Some(_)) => GameMode::new("Team Duels Game", "teamduels", "Team Duels Game", true),
        ("teams", None) => GameMode::new("Team Duels", "teamduels", "Team Duels", true),
        ("multiplayer", sub) => multiplayer_lobby(sub),
        ("battle-royale", Some(_)) => GameMode::new(
            "Battle Royale Game",
            "br-distance",
            "Battle Royale Distance Game",
            true,
        ),
        ("battle-royale", None) => GameMode::new(
            "Battle Royale Distance",
            "br-distance",
            "Battle Royale Distance",
            true,
        ),
        _ => GameMode::not_in_game(),
    }
}

// Lobby pages: never "playing".
fn multiplayer_lobby(sub: Option<&str>) -> GameMode {
    match sub {
        Some("teams") => GameMode::new("Team Duels", "rankedteams", "Team Duels (Ranked)", false),
        Some("battle-royale-distance") => GameMode::new(
            "Battle Royale Distance",
            "br-distance",
            "Battle Royale Distance",
            false,
        ),
        Some("battle-royale-countries") => GameMode::new(
            "Battle Royale Countries",
            "br-countries",
            "Battle Royale Countries",
            false,
        ),
        Some("unranked-teams") => GameMode::new(
            "Unranked Team Duels",
            "teamduels",
            "Unranked Team Duels",
            false,
        ),
        _ => GameMode::new("Duels", "ranked", "Ranked Duels", false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(url: &str) -> GameMode {
        ModeClassifier::for_host(DEFAULT_GAME_HOST)
            .expect("pattern compiles")
            .classify(url)
    }

    fn example() -> ModeClassifier {
        ModeClassifier::for_host("example.com").expect("pattern compiles")
    }

    fn assert_mode(url: &str, label: &str, icon: &str, text: &str, playing: bool) {
        let mode = classify(url);
        assert_eq!(mode, GameMode::new(label, icon, text, playing), "url: {url}");
    }

    #[test]
    fn duels_lobby_and_game() {
        let classifier = example();
        assert_eq!(
            classifier.classify("https://www.example.com/duels"),
            GameMode::new("Duels", "ranked", "Ranked Duels", true)
        );
        assert_eq!(
            classifier.classify("https://www.example.com/duels/abc123"),
            GameMode::new("Duels Game", "ranked", "Ranked Duels Game", true)
        );
    }

    #[test]
    fn battle_royale_countries_lobby() {
        let mode = example().classify("https://www.example.com/multiplayer/battle-royale-countries");
        assert_eq!(mode.label(), "Battle Royale Countries");
        assert_eq!(mode.small_icon_key(), "br-countries");
        assert!(!mode.is_playing());
    }

    #[test]
    fn locale_prefix_is_skipped() {
        let mode = example().classify("https://www.example.com/en/maps");
        assert_eq!(mode, GameMode::new("Selecting a map", "", "", false));
    }

    #[test]
    fn unrelated_site_is_not_in_game() {
        let mode = example().classify("https://unrelated.site/foo");
        assert_eq!(mode, GameMode::not_in_game());
    }

    #[test]
    fn other_hosts_do_not_match() {
        assert_eq!(
            classify("https://www.example.com/duels"),
            GameMode::not_in_game()
        );
        assert_eq!(
            example().classify("https://www.geoguessr.com/duels"),
            GameMode::not_in_game()
        );
    }

    #[test]
    fn embedded_game_url_is_not_a_game_page() {
        assert_eq!(
            classify("https://search.example/?q=https://www.geoguessr.com/duels"),
            GameMode::not_in_game()
        );
    }

    #[test]
    fn host_is_escaped() {
        assert_eq!(
            classify("https://www.geoguessrxcom/duels"),
            GameMode::not_in_game()
        );
    }

    #[test]
    fn singleplayer_paths() {
        assert_mode(
            "https://www.geoguessr.com/singleplayer/game",
            "Singleplayer Game",
            "singleplayer",
            "Singleplayer Game",
            true,
        );
        assert_mode(
            "https://www.geoguessr.com/game/Xy12ab",
            "Singleplayer Game",
            "singleplayer",
            "Singleplayer Game",
            true,
        );
        assert_mode(
            "https://www.geoguessr.com/game",
            "Singleplayer Game",
            "singleplayer",
            "Singleplayer Game",
            true,
        );
        // singleplayer without the game segment is a menu
        assert_eq!(
            classify("https://www.geoguessr.com/singleplayer"),
            GameMode::not_in_game()
        );
        assert_eq!(
            classify("https://www.geoguessr.com/singleplayer/settings"),
            GameMode::not_in_game()
        );
    }

    #[test]
    fn team_modes() {
        assert_mode(
            "https://www.geoguessr.com/team-duels",
            "Team Duels",
            "rankedteams",
            "Team Duels (Ranked)",
            true,
        );
        assert_mode(
            "https://www.geoguessr.com/team-duels/8f2c",
            "Team Duels Game",
            "rankedteams",
            "Ranked Team Duels Game",
            true,
        );
        assert_mode(
            "https://www.geoguessr.com/teams",
            "Team Duels",
            "teamduels",
            "Team Duels",
            true,
        );
        assert_mode(
            "https://www.geoguessr.com/de/teams/lobby-1",
            "Team Duels Game",
            "teamduels",
            "Team Duels Game",
            true,
        );
    }

    #[test]
    fn multiplayer_lobbies_are_not_playing() {
        assert_mode(
            "https://www.geoguessr.com/multiplayer",
            "Duels",
            "ranked",
            "Ranked Duels",
            false,
        );
        assert_mode(
            "https://www.geoguessr.com/multiplayer/teams",
            "Team Duels",
            "rankedteams",
            "Team Duels (Ranked)",
            false,
        );
        assert_mode(
            "https://www.geoguessr.com/multiplayer/battle-royale-distance",
            "Battle Royale Distance",
            "br-distance",
            "Battle Royale Distance",
            false,
        );
        assert_mode(
            "https://www.geoguessr.com/multiplayer/unranked-teams",
            "Unranked Team Duels",
            "teamduels",
            "Unranked Team Duels",
            false,
        );
        assert_mode(
            "https://www.geoguessr.com/multiplayer/something-new",
            "Duels",
            "ranked",
            "Ranked Duels",
            false,
        );
    }

    #[test]
    fn battle_royale() {
        assert_mode(
            "https://www.geoguessr.com/battle-royale",
            "Battle Royale Distance",
            "br-distance",
            "Battle Royale Distance",
            true,
        );
        assert_mode(
            "https://www.geoguessr.com/battle-royale/Abc-123",
            "Battle Royale Game",
            "br-distance",
            "Battle Royale Distance Game",
            true,
        );
    }

    #[test]
    fn query_and_fragment_do_not_leak_into_segments() {
        assert_mode(
            "https://www.geoguessr.com/duels?tab=ranked",
            "Duels",
            "ranked",
            "Ranked Duels",
            true,
        );
        assert_mode(
            "https://www.geoguessr.com/duels/abc#round-2",
            "Duels Game",
            "ranked",
            "Ranked Duels Game",
            true,
        );
    }

    #[test]
    fn bare_locale_is_not_a_mode() {
        assert_eq!(
            classify("https://www.geoguessr.com/en"),
            GameMode::not_in_game()
        );
    }

    #[test]
    fn total_over_odd_input() {
        let inputs = [
            "",
            " ",
            "https://",
            "https://www.geoguessr.com",
            "https://www.geoguessr.com/",
            "http://www.geoguessr.com/duels",
            "https://geoguessr.com/duels",
            "not a url at all",
            "https://www.geoguessr.com/ü/duels",
            "https://www.geoguessr.com/MAPS",
            "\u{0}\u{7f}%%%",
        ];
        for input in inputs {
            assert_eq!(classify(input), GameMode::not_in_game(), "input: {input:?}");
        }

        let long = format!("https://www.geoguessr.com/{}", "a".repeat(100_000));
        assert_eq!(classify(&long), GameMode::not_in_game());
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(classify("https://www.geoguessr.com/maps"), classify("https://www.geoguessr.com/fr/maps"));
        assert_ne!(
            GameMode::new("Duels", "ranked", "Ranked Duels", true),
            GameMode::new("Duels", "ranked", "Ranked Duels", false)
        );
    }
}
