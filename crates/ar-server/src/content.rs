//! Loading designer-authored content tables from a directory of JSON files.
//!
//! Each table is a JSON array of templates: `items.json`, `monsters.json`,
//! `maps.json` and `missions.json`. `enhancement.json` is an optional object
//! overriding the upgrade table.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use ar_core::{
    Content, DropEntry, ItemTemplate, MapTemplate, MissionKind, MissionTemplate, MonsterTemplate,
};
use ar_mechanics::EnhancementConfig;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

pub const ITEMS_FILE: &str = "items.json";
pub const MONSTERS_FILE: &str = "monsters.json";
pub const MAPS_FILE: &str = "maps.json";
pub const MISSIONS_FILE: &str = "missions.json";
pub const ENHANCEMENT_FILE: &str = "enhancement.json";

#[derive(Debug, Clone)]
pub struct LoadedContent {
    pub content: Content,
    pub enhancement: EnhancementConfig,
}

/// Read every table in `dir`. Only `maps.json` is mandatory; other missing
/// tables load as empty.
pub fn load_dir(dir: &Path) -> Result<LoadedContent> {
    if !dir.is_dir() {
        bail!("content directory '{}' does not exist", dir.display());
    }

    let maps: Vec<MapTemplate> = read_table(dir, MAPS_FILE)?;
    if maps.is_empty() {
        bail!("no maps defined in '{}'", dir.join(MAPS_FILE).display());
    }
    let items: Vec<ItemTemplate> = read_table(dir, ITEMS_FILE)?;
    let monsters: Vec<MonsterTemplate> = read_table(dir, MONSTERS_FILE)?;
    let missions: Vec<MissionTemplate> = read_table(dir, MISSIONS_FILE)?;

    let content = items.into_iter().fold(Content::new(), Content::with_item);
    let content = monsters.into_iter().fold(content, Content::with_monster);
    let content = maps.into_iter().fold(content, Content::with_map);
    let content = missions.into_iter().fold(content, Content::with_mission);

    for warning in integrity_warnings(&content) {
        warn!("{warning}");
    }

    let enhancement = read_enhancement(dir)?;
    info!(
        items = content.items.len(),
        monsters = content.monsters.len(),
        maps = content.maps.len(),
        missions = content.missions.len(),
        "content loaded"
    );
    Ok(LoadedContent {
        content,
        enhancement,
    })
}

fn read_table<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>> {
    let path = dir.join(file);
    if !path.exists() {
        warn!(path = %path.display(), "content table missing, treating as empty");
        return Ok(Vec::new());
    }
    let text =
        fs::read_to_string(&path).with_context(|| format!("reading '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing '{}'", path.display()))
}

fn read_enhancement(dir: &Path) -> Result<EnhancementConfig> {
    let path = dir.join(ENHANCEMENT_FILE);
    if !path.exists() {
        return Ok(EnhancementConfig::default());
    }
    let text =
        fs::read_to_string(&path).with_context(|| format!("reading '{}'", path.display()))?;
    EnhancementConfig::from_json(&text).with_context(|| format!("parsing '{}'", path.display()))
}

/// Dangling references between tables, sorted by owner. The engine skips
/// them at runtime, so they are reported but never rejected.
pub fn integrity_warnings(content: &Content) -> Vec<String> {
    let mut warnings = Vec::new();

    let mut maps: Vec<&MapTemplate> = content.maps.values().collect();
    maps.sort_by(|a, b| a.id.cmp(&b.id));
    for map in maps {
        for spawn in &map.spawns {
            if content.monster(&spawn.template_id).is_none() {
                warnings.push(format!(
                    "map '{}' spawns unknown monster '{}'",
                    map.id, spawn.template_id
                ));
            }
        }
        for portal in &map.portals {
            if content.map(&portal.target_map_id).is_none() {
                warnings.push(format!(
                    "portal '{}' on map '{}' leads to unknown map '{}'",
                    portal.id, map.id, portal.target_map_id
                ));
            }
        }
        for node in &map.resources {
            check_drops(content, &format!("resource '{}'", node.id), &node.drops, &mut warnings);
        }
    }

    let mut monsters: Vec<&MonsterTemplate> = content.monsters.values().collect();
    monsters.sort_by(|a, b| a.id.cmp(&b.id));
    for monster in monsters {
        check_drops(content, &format!("monster '{}'", monster.id), &monster.drops, &mut warnings);
    }

    let mut missions: Vec<&MissionTemplate> = content.missions.values().collect();
    missions.sort_by(|a, b| a.id.cmp(&b.id));
    for mission in missions {
        let known = match mission.kind {
            MissionKind::Kill => content.monster(&mission.target_id).is_some(),
            MissionKind::Collect => content.item(&mission.target_id).is_some(),
        };
        if !known {
            warnings.push(format!(
                "mission '{}' targets unknown id '{}'",
                mission.id, mission.target_id
            ));
        }
        let unknown_map = mission
            .map_id
            .as_ref()
            .filter(|map_id| content.map(map_id).is_none());
        if let Some(map_id) = unknown_map {
            warnings.push(format!(
                "mission '{}' is set on unknown map '{map_id}'",
                mission.id
            ));
        }
    }

    warnings
}

fn check_drops(content: &Content, owner: &str, drops: &[DropEntry], warnings: &mut Vec<String>) {
    for drop in drops {
        if content.item(&drop.item_id).is_none() {
            warnings.push(format!("{owner} drops unknown item '{}'", drop.item_id));
        }
    }
}
