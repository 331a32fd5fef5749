//! `presets` subcommand — list the built-in palette.

use super::{PresetJson, Result, color, kv, kv_width};

pub(super) fn cmd_presets(json: bool) -> Result<()> {
    let presets: Vec<PresetJson> = color::PRESETS
        .iter()
        .map(|p| PresetJson {
            name: p.name,
            hex: color::to_hex(p.color),
        })
        .collect();

    if json {
        return super::print_json(&presets);
    }

    let labels: Vec<String> = presets.iter().map(|p| format!("{}:", p.name)).collect();
    let keys: Vec<&str> = labels.iter().map(String::as_str).collect();
    let w = kv_width(&keys, &[]);
    for (label, preset) in labels.iter().zip(&presets) {
        kv(label, &preset.hex, w);
    }
    Ok(())
}
