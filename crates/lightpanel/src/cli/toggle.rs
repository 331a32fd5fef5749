//! `set` subcommand — switch a saved toggle on or off.

use clap::ValueEnum;

use super::{EngineCommand, Options, Result, Toggle, ToggleOutput, on_off, open_editor};

pub(super) fn cmd_set(opts: &Options, setting: Toggle, enabled: bool) -> Result<()> {
    let config = super::load_config(opts);
    let mut engine = open_editor(opts, &config)?;

    let cmd = match setting {
        Toggle::Rotate => EngineCommand::SetRotateColors(enabled),
        Toggle::Strobe => EngineCommand::SetStrobeEffect(enabled),
        Toggle::Flag => EngineCommand::SetFlagMode(enabled),
        Toggle::HorizontalSplit => EngineCommand::SetHorizontalSplit(enabled),
        Toggle::Muted => EngineCommand::SetMuted(enabled),
    };
    engine.apply(cmd)?;

    let name = setting
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default();
    if opts.json {
        return super::print_json(&ToggleOutput {
            setting: name,
            enabled,
        });
    }
    println!("{name}: {}", on_off(enabled));
    Ok(())
}
