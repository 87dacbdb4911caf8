use std::path::Path;

use anyhow::{Context, Result};
use ar_persistence::{PersistConfig, PlayerStore};
use comfy_table::{ContentArrangement, Table};

pub fn run(data_dir: &Path) -> Result<()> {
    let config = PersistConfig::default().with_data_dir(data_dir);
    if !config.path().exists() {
        println!("  No saved players in '{}'.", data_dir.display());
        return Ok(());
    }

    let store = PlayerStore::new(&config)?;
    let mut players = store
        .load()
        .with_context(|| format!("reading '{}'", store.path().display()))?;
    players.sort_by(|a, b| a.name.cmp(&b.name));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Class", "Level", "Map", "HP", "Gold"]);
    for player in &players {
        table.add_row(vec![
            player.name.clone(),
            format!("{:?}", player.class).to_lowercase(),
            player.level.to_string(),
            player.current_map_id.clone(),
            format!("{}/{}", player.stats.hp, player.stats.max_hp),
            player.gold.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} players", players.len());
    Ok(())
}
