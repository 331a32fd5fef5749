//! `resolve` subcommand — print the frame for the saved settings.

use super::{Color, EngineCommand, Options, RenderFrame, Result, kv, kv_width, open_editor};

pub(super) fn cmd_resolve(
    opts: &Options,
    color: Option<Color>,
    brightness: Option<u8>,
) -> Result<()> {
    let config = super::load_config(opts);
    let mut engine = open_editor(opts, &config)?;
    if let Some(c) = color {
        engine.apply(EngineCommand::SetSelection(c))?;
    }
    if let Some(b) = brightness {
        engine.apply(EngineCommand::SetBrightness(b))?;
    }

    let descriptor = engine.render();
    let frame = RenderFrame::from(&descriptor);
    if opts.json {
        return super::print_json(&frame);
    }

    let w = kv_width(&["Color:", "Output:", "Mask:", "Gradient:"], &[]);
    kv("Color:", &frame.hex, w);
    kv("Output:", &frame.color_string, w);
    match &frame.mask_size_css {
        Some(size) => kv("Mask:", format_args!("{} ({size})", frame.mask_shape), w),
        None => kv("Mask:", "none", w),
    }
    match descriptor.gradient() {
        Some(g) => kv(
            "Gradient:",
            format_args!("{} bands of {:.2}%", g.bands.len(), g.band_width_pct()),
            w,
        ),
        None => kv("Gradient:", "off", w),
    }
    Ok(())
}
