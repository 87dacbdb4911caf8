//! Player death, paid revival, and free respawn.

use std::fmt;

use ar_core::{Content, Player, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Currency a paid revive is charged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// Regular gold.
    Gold,
    /// Premium currency.
    Diamonds,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Currency {
    fn name(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Diamonds => "diamonds",
        }
    }

    fn balance(self, player: &mut Player) -> &mut u64 {
        match self {
            Self::Gold => &mut player.gold,
            Self::Diamonds => &mut player.diamonds,
        }
    }
}

/// Tunables for getting a dead player back on their feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevivalConfig {
    /// Seconds a player must stay dead before a free respawn.
    pub respawn_delay_secs: f64,
    /// Currency charged for an in-place revive.
    pub revive_currency: Currency,
    /// Price of an in-place revive.
    pub revive_cost: u64,
    /// Used when the player's respawn map is unset or unknown.
    pub fallback_map_id: String,
    /// Arrival point on the fallback map.
    pub fallback_position: Position,
}

impl Default for RevivalConfig {
    fn default() -> Self {
        Self {
            respawn_delay_secs: 10.0,
            revive_currency: Currency::Gold,
            revive_cost: 100,
            fallback_map_id: "map_castle_1".to_string(),
            fallback_position: Position::new(50.0, 50.0),
        }
    }
}

impl RevivalConfig {
    /// Set the free respawn delay in seconds.
    pub fn with_respawn_delay(mut self, secs: f64) -> Self {
        self.respawn_delay_secs = secs;
        self
    }

    /// Set the price of an in-place revive.
    pub fn with_revive_cost(mut self, currency: Currency, cost: u64) -> Self {
        self.revive_currency = currency;
        self.revive_cost = cost;
        self
    }
}

/// Mark the player dead where they stand. No teleport happens here.
pub fn kill_player(player: &mut Player, now: DateTime<Utc>) {
    player.stats.hp = 0;
    player.reset_transient();
    player.death_time = Some(now);
}

/// Pay to come back at full health in place.
pub fn revive_player(player: &mut Player, config: &RevivalConfig) -> MechResult<()> {
    if player.is_alive() {
        return Err(MechError::PlayerAlive);
    }
    let currency = config.revive_currency;
    let balance = currency.balance(player);
    if *balance < config.revive_cost {
        return Err(MechError::InsufficientCurrency {
            currency: currency.name(),
            need: config.revive_cost,
            have: *balance,
        });
    }
    *balance -= config.revive_cost;
    player.stats.heal_full();
    player.death_time = None;
    player.reset_transient();
    Ok(())
}

/// Come back for free at the respawn map once the delay has passed.
/// Returns the map the player left, if the respawn moved them.
pub fn respawn_player(
    player: &mut Player,
    content: &Content,
    config: &RevivalConfig,
    now: DateTime<Utc>,
) -> MechResult<Option<String>> {
    if player.is_alive() {
        return Err(MechError::PlayerAlive);
    }
    if let Some(died) = player.death_time {
        let elapsed = (now - died).num_milliseconds() as f64 / 1000.0;
        if elapsed < config.respawn_delay_secs {
            return Err(MechError::RespawnNotReady {
                remaining_secs: config.respawn_delay_secs - elapsed,
            });
        }
    }

    let (map_id, position) = match player
        .respawn_map_id
        .as_deref()
        .and_then(|id| content.map(id))
    {
        Some(map) => (map.id.clone(), map.respawn_point),
        None => (config.fallback_map_id.clone(), config.fallback_position),
    };

    let left = (player.current_map_id != map_id).then(|| player.current_map_id.clone());
    player.current_map_id = map_id;
    player.position = position;
    player.stats.heal_full();
    player.death_time = None;
    player.reset_transient();
    Ok(left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ar_core::{MapKind, MapTemplate, PlayerClass, PlayerState};
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn dead_player() -> Player {
        let mut p = Player::new(
            "Aria",
            PlayerClass::Warrior,
            "map_forest_1",
            Position::new(10.0, 10.0),
        );
        p.state = PlayerState::Combat;
        kill_player(&mut p, t0());
        p
    }

    #[test]
    fn death_stays_in_place() {
        let p = dead_player();
        assert_eq!(p.stats.hp, 0);
        assert_eq!(p.state, PlayerState::Idle);
        assert!(p.combat_target.is_none());
        assert_eq!(p.current_map_id, "map_forest_1");
        assert_eq!(p.position, Position::new(10.0, 10.0));
        assert_eq!(p.death_time, Some(t0()));
    }

    #[test]
    fn respawn_waits_for_delay() {
        let mut p = dead_player();
        let err = respawn_player(
            &mut p,
            &Content::new(),
            &RevivalConfig::default(),
            t0() + Duration::seconds(4),
        )
        .unwrap_err();
        match err {
            MechError::RespawnNotReady { remaining_secs } => {
                assert!((remaining_secs - 6.0).abs() < 1e-9)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn respawn_goes_to_castle_respawn_point() {
        let mut castle = MapTemplate::new("map_castle_2", "Highkeep");
        castle.kind = MapKind::Castle;
        castle.respawn_point = Position::new(20.0, 30.0);
        let content = Content::new().with_map(castle);

        let mut p = dead_player();
        p.respawn_map_id = Some("map_castle_2".into());
        let left = respawn_player(
            &mut p,
            &content,
            &RevivalConfig::default(),
            t0() + Duration::seconds(10),
        )
        .unwrap();

        assert_eq!(left.as_deref(), Some("map_forest_1"));
        assert_eq!(p.current_map_id, "map_castle_2");
        assert_eq!(p.position, Position::new(20.0, 30.0));
        assert_eq!(p.stats.hp, p.stats.max_hp);
        assert!(p.death_time.is_none());
    }

    #[test]
    fn respawn_falls_back_to_default_castle() {
        let mut p = dead_player();
        respawn_player(
            &mut p,
            &Content::new(),
            &RevivalConfig::default(),
            t0() + Duration::seconds(11),
        )
        .unwrap();
        assert_eq!(p.current_map_id, "map_castle_1");
        assert_eq!(p.position, Position::new(50.0, 50.0));
    }

    #[test]
    fn revive_costs_currency() {
        let config = RevivalConfig::default();
        let mut p = dead_player();
        p.gold = 99;
        assert!(matches!(
            revive_player(&mut p, &config),
            Err(MechError::InsufficientCurrency { need: 100, have: 99, .. })
        ));
        p.gold = 150;
        revive_player(&mut p, &config).unwrap();
        assert_eq!(p.gold, 50);
        assert_eq!(p.stats.hp, p.stats.max_hp);
        assert_eq!(p.current_map_id, "map_forest_1");
    }

    #[test]
    fn living_players_cannot_revive() {
        let mut p = Player::new("Aria", PlayerClass::Warrior, "m", Position::default());
        assert!(matches!(
            revive_player(&mut p, &RevivalConfig::default()),
            Err(MechError::PlayerAlive)
        ));
    }

    #[test]
    fn diamond_revive() {
        let config = RevivalConfig::default().with_revive_cost(Currency::Diamonds, 5);
        let mut p = dead_player();
        p.diamonds = 5;
        revive_player(&mut p, &config).unwrap();
        assert_eq!(p.diamonds, 0);
    }
}
