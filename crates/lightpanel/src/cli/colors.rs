//! `colors` subcommand — list and edit custom color slots.

use lightpanel_lib::slots::MAX_SLOTS;

use super::{
    ColorsAction, ColorsOutput, EngineCommand, Options, Result, SlotJson, color, kv, kv_width,
    open_editor,
};

pub(super) fn cmd_colors(opts: &Options, action: ColorsAction) -> Result<()> {
    let config = super::load_config(opts);
    let mut engine = open_editor(opts, &config)?;

    let cmd = match action {
        ColorsAction::List => None,
        ColorsAction::Add { color } => Some(EngineCommand::AddCustomColor(color)),
        ColorsAction::Set { slot, color } => Some(EngineCommand::UpdateCustomColor(
            usize::from(slot) - 1,
            color,
        )),
        ColorsAction::Remove { slot } => {
            Some(EngineCommand::RemoveCustomColor(usize::from(slot) - 1))
        }
        ColorsAction::Reset => Some(EngineCommand::ResetCustomColors),
    };
    if let Some(cmd) = cmd {
        engine.apply(cmd)?;
    }

    let colors = engine.state().custom_colors();
    let slots: Vec<SlotJson> = colors
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, &c)| SlotJson {
            slot: i + 1,
            hex: color::to_hex(c),
        })
        .collect();

    if opts.json {
        return super::print_json(&ColorsOutput {
            count: slots.len(),
            slots,
        });
    }

    let labels: Vec<String> = slots.iter().map(|s| format!("Slot {}:", s.slot)).collect();
    let keys: Vec<&str> = labels.iter().map(String::as_str).collect();
    let w = kv_width(&keys, &[]);
    for (label, slot) in labels.iter().zip(&slots) {
        kv(label, &slot.hex, w);
    }
    println!();
    println!("{} of {MAX_SLOTS} slots used", slots.len());
    Ok(())
}
