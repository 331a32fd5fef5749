//! `mask` subcommand — show and edit the mask shape selection.

use super::{
    EngineCommand, MaskAction, MaskOutput, Options, Result, kv, kv_width, open_editor,
};

pub(super) fn cmd_mask(opts: &Options, action: MaskAction) -> Result<()> {
    let config = super::load_config(opts);
    let mut engine = open_editor(opts, &config)?;

    match action {
        MaskAction::Show => {}
        MaskAction::Toggle { shape } => engine.apply(EngineCommand::ToggleMask(shape))?,
        MaskAction::Size { percent } => {
            engine.apply(EngineCommand::SetMaskSize(i64::from(percent)))?
        }
    }

    let state = engine.state();
    let output = MaskOutput {
        shapes: state.masks().tags(),
        size: state.config().mask_size,
        size_css: engine.render().mask_size_css(),
    };
    if opts.json {
        return super::print_json(&output);
    }

    let w = kv_width(&["Shapes:", "Size:", "Outline:"], &[]);
    kv("Shapes:", output.shapes.join(", "), w);
    kv("Size:", format_args!("{}%", output.size), w);
    kv("Outline:", output.size_css.as_deref().unwrap_or("(no mask)"), w);
    Ok(())
}
