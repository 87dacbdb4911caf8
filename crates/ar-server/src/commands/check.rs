use std::path::Path;

use anyhow::{Result, bail};
use ar_core::MapTemplate;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use crate::content;

pub fn run(dir: &Path, strict: bool) -> Result<()> {
    let loaded = content::load_dir(dir)?;
    let content = &loaded.content;

    let mut maps: Vec<&MapTemplate> = content.maps.values().collect();
    maps.sort_by(|a, b| a.id.cmp(&b.id));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Map", "Name", "Kind", "Level", "Spawns", "Resources", "Portals"]);
    for map in maps {
        table.add_row(vec![
            map.id.clone(),
            map.name.clone(),
            format!("{:?}", map.kind).to_lowercase(),
            map.level_requirement.to_string(),
            map.spawns.len().to_string(),
            map.resources.len().to_string(),
            map.portals.len().to_string(),
        ]);
    }
    println!("{table}");
    println!();
    println!(
        "  {} maps, {} monsters, {} items, {} missions",
        content.maps.len(),
        content.monsters.len(),
        content.items.len(),
        content.missions.len()
    );

    let warnings = content::integrity_warnings(content);
    if warnings.is_empty() {
        println!("  {}", "All references resolve.".green());
        return Ok(());
    }

    for warning in &warnings {
        println!("  {}   {warning}", "WARN".yellow().bold());
    }
    println!(
        "  {} dangling reference{}",
        warnings.len(),
        if warnings.len() == 1 { "" } else { "s" }
    );
    if strict {
        bail!("content check failed");
    }
    Ok(())
}
