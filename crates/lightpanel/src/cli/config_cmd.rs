//! `config` subcommand — show configuration, file paths and saved values.

use super::{
    Config, ConfigOutput, Options, PersistedJson, Result, Settings, color, kv, kv_indent,
    kv_width, on_off,
};

pub(super) fn cmd_config(opts: &Options) -> Result<()> {
    let config = super::load_config(opts);
    let config_path = opts.config_path.clone().or_else(Config::path);
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());

    let settings_path = super::settings_file(opts, &config);
    let settings_exists = settings_path.as_ref().is_some_and(|p| p.exists());

    let store = super::open_store(opts, &config);
    let saved = Settings::load(&store);

    if opts.json {
        return super::print_json(&ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings_file: settings_path.as_ref().map(|p| p.display().to_string()),
            settings_file_exists: settings_exists,
            persisted: PersistedJson::from(&saved),
            config,
        });
    }

    let w = kv_width(
        &["Config file:", "Settings file:"],
        &[
            "default_color:",
            "brightness:",
            "blink_interval_ms:",
            "click_volume:",
            "notes:",
            "click_decay_ms:",
            "controls_timeout_ms:",
            "hold_threshold_ms:",
            "press_feedback_delay_ms:",
            "custom_colors:",
            "mask_shapes:",
            "mask_size:",
            "horizontal_split:",
        ],
    );

    match &config_path {
        Some(p) if config_exists => kv("Config file:", format_args!("{} (loaded)", p.display()), w),
        Some(p) => kv(
            "Config file:",
            format_args!("{} (not found, using defaults)", p.display()),
            w,
        ),
        None => kv("Config file:", "(no config directory)", w),
    }
    match &settings_path {
        Some(_) if !opts.persist => kv("Settings file:", store.describe(), w),
        Some(p) if settings_exists => kv("Settings file:", p.display(), w),
        Some(p) => kv("Settings file:", format_args!("{} (not yet saved)", p.display()), w),
        None => kv("Settings file:", "(no config directory)", w),
    }
    println!();

    println!("Config:");
    let color_display = match color::parse_color(&config.default_color) {
        Ok(c) => format!("{} -> {}", config.default_color, color::to_hex(c)),
        Err(_) => format!("{} (invalid)", config.default_color),
    };
    kv_indent("default_color:", &color_display, w);
    kv_indent("brightness:", format_args!("{}%", config.brightness), w);
    let interval = match config.blink_interval_ms {
        0 => "0 (steady)".to_string(),
        ms => format!("{ms} ms"),
    };
    kv_indent("blink_interval_ms:", interval, w);
    kv_indent("click_volume:", config.click_volume, w);
    kv_indent(
        "notes:",
        format_args!("{} Hz / {} Hz", config.high_note_hz, config.low_note_hz),
        w,
    );
    kv_indent("click_decay_ms:", config.click_decay_ms, w);
    kv_indent("controls_timeout_ms:", config.controls_timeout_ms, w);
    kv_indent("hold_threshold_ms:", config.hold_threshold_ms, w);
    kv_indent("press_feedback_delay_ms:", config.press_feedback_delay_ms, w);
    if let Err(errors) = config.validate() {
        for e in &errors {
            println!("  ! {e}");
        }
    }
    println!();

    println!("Saved:");
    let persisted = PersistedJson::from(&saved);
    kv_indent("custom_colors:", persisted.custom_colors.join(" "), w);
    kv_indent("mask_shapes:", persisted.mask_shapes.join(", "), w);
    kv_indent("mask_size:", format_args!("{}%", persisted.mask_size), w);
    kv_indent("muted:", on_off(persisted.muted), w);
    kv_indent("rotate_colors:", on_off(persisted.rotate_colors), w);
    kv_indent("strobe_effect:", on_off(persisted.strobe_effect), w);
    kv_indent("flag_mode:", on_off(persisted.flag_mode), w);
    kv_indent("horizontal_split:", on_off(persisted.horizontal_split), w);
    Ok(())
}
