use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::{ShellError, render_helpers::Color};

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Activate desktop surfaces on their first commit instead of only staging them.
    pub activate_by_default: bool,
    pub curtain_color: Color,
    /// Initial value of the pending-registration keep mode.
    pub keep_pending: bool,
    pub shell_client_command: Option<String>,
    pub outputs: Vec<OutputConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub name: String,
    pub enabled: bool,
    pub width: u16,
    pub height: u16,
    pub x: i32,
    pub y: i32,
}

impl OutputConfig {
    pub fn geometry(&self) -> Rectangle<i32, Logical> {
        Rectangle::new(
            Point::from((self.x, self.y)),
            Size::from((i32::from(self.width), i32::from(self.height))),
        )
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            activate_by_default: false,
            curtain_color: Color::BLACK,
            keep_pending: false,
            shell_client_command: None,
            outputs: Vec::new(),
        }
    }
}

pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: RuntimeConfig,
}

pub fn load_or_create_default(explicit: Option<PathBuf>) -> Result<LoadedConfig, ShellError> {
    let path = match explicit {
        Some(path) => path,
        None => config_path()?,
    };
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                ShellError::Config(format!(
                    "failed to create config directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
        fs::write(&path, default_config_template()).map_err(|err| {
            ShellError::Config(format!(
                "failed to write default config {}: {err}",
                path.display()
            ))
        })?;
        tracing::info!(path = %path.display(), "created default ivi-shell.ini");
    }

    let config = load_from_path(&path)?;
    Ok(LoadedConfig { path, config })
}

pub fn load_from_path(path: &Path) -> Result<RuntimeConfig, ShellError> {
    if !path.exists() {
        return Err(ShellError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).map_err(|err| {
        ShellError::Config(format!("failed to read config {}: {err}", path.display()))
    })?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<RuntimeConfig, ShellError> {
    let values = parse_ini_values(content)?;
    let mut config = RuntimeConfig::default();

    config.activate_by_default = parse_bool_flexible(
        &values,
        "shell.activate-by-default",
        config.activate_by_default,
    )?;
    config.keep_pending = parse_bool_flexible(&values, "shell.keep-pending", config.keep_pending)?;
    if let Some(raw) = values.get("shell.curtain-color") {
        config.curtain_color = parse_color(raw, "shell.curtain-color")?;
    }
    config.shell_client_command = values
        .get("shell-client.command")
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty());
    config.outputs = parse_output_configs(&values)?;

    Ok(config)
}

fn config_path() -> Result<PathBuf, ShellError> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Ok(PathBuf::from(xdg).join("ivi-shell").join("ivi-shell.ini"));
    }

    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home)
            .join(".config")
            .join("ivi-shell")
            .join("ivi-shell.ini"));
    }

    Err(ShellError::Config(
        "unable to resolve config path: HOME and XDG_CONFIG_HOME are unset".to_owned(),
    ))
}

/// Flattens an ini document into `section.key` pairs. Repeated `[output]`
/// sections become `output.<index>.key`.
fn parse_ini_values(content: &str) -> Result<HashMap<String, String>, ShellError> {
    let mut values = HashMap::new();
    let mut section = String::new();
    let mut output_index = 0usize;

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let Some(name) = rest.strip_suffix(']') else {
                return Err(ShellError::Config(format!(
                    "line {}: unterminated section header `{line}`",
                    lineno + 1
                )));
            };
            let name = name.trim();
            if name == "output" {
                section = format!("output.{output_index}");
                output_index += 1;
            } else {
                section = name.to_owned();
            }
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ShellError::Config(format!(
                "line {}: expected `key=value`, got `{line}`",
                lineno + 1
            )));
        };
        if section.is_empty() {
            return Err(ShellError::Config(format!(
                "line {}: `{}` is outside of any section",
                lineno + 1,
                key.trim()
            )));
        }
        values.insert(
            format!("{section}.{}", key.trim()),
            value.trim().to_owned(),
        );
    }

    Ok(values)
}

fn parse_output_configs(
    values: &HashMap<String, String>,
) -> Result<Vec<OutputConfig>, ShellError> {
    let mut grouped = BTreeMap::<usize, HashMap<String, String>>::new();

    for (key, value) in values {
        let Some(rest) = key.strip_prefix("output.") else {
            continue;
        };
        let Some((raw_index, field)) = rest.split_once('.') else {
            return Err(ShellError::Config(format!(
                "invalid output key `{key}`: expected format output.<index>.<field>"
            )));
        };
        let index = raw_index.parse::<usize>().map_err(|err| {
            ShellError::Config(format!(
                "invalid output key `{key}`: index is not a number ({err})"
            ))
        })?;
        grouped
            .entry(index)
            .or_default()
            .insert(field.to_owned(), value.clone());
    }

    let mut outputs = Vec::with_capacity(grouped.len());

    for (index, fields) in grouped {
        let name = fields
            .get("name")
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| {
                ShellError::Config(format!("output section #{index} is missing `name`"))
            })?;

        let mode_raw = fields.get("mode").ok_or_else(|| {
            ShellError::Config(format!("output `{name}` is missing `mode`"))
        })?;
        let (width, height) = parse_output_mode(mode_raw, &format!("output.{name}.mode"))?;

        let (x, y) = match fields.get("position") {
            Some(raw) => parse_position(raw, &format!("output.{name}.position"))?,
            None => (0, 0),
        };

        let enabled = parse_bool_flexible(&fields, "enabled", true)?;

        outputs.push(OutputConfig {
            name: name.to_owned(),
            enabled,
            width,
            height,
            x,
            y,
        });
    }

    Ok(outputs)
}

fn parse_output_mode(raw: &str, key: &str) -> Result<(u16, u16), ShellError> {
    let mode = raw.trim();
    if mode.is_empty() {
        return Err(ShellError::Config(format!(
            "invalid value for {key}: mode must not be empty"
        )));
    }

    // A refresh suffix is accepted and ignored; mode-setting is done by the backend.
    let size_part = match mode.split_once('@') {
        Some((size, _refresh)) => size.trim(),
        None => mode,
    };

    let split_size = size_part
        .split_once('x')
        .or_else(|| size_part.split_once('X'))
        .ok_or_else(|| {
            ShellError::Config(format!(
                "invalid value for {key}: expected `<width>x<height>` or `<width>x<height>@<refresh>`"
            ))
        })?;

    let width = parse_u16_flexible(split_size.0.trim(), key)?;
    let height = parse_u16_flexible(split_size.1.trim(), key)?;
    if width == 0 || height == 0 {
        return Err(ShellError::Config(format!(
            "invalid value for {key}: output size must be non-zero"
        )));
    }

    Ok((width, height))
}

fn parse_position(raw: &str, key: &str) -> Result<(i32, i32), ShellError> {
    let (x, y) = raw.split_once(',').ok_or_else(|| {
        ShellError::Config(format!(
            "invalid value for {key}: {raw} (expected `<x>,<y>`)"
        ))
    })?;
    Ok((parse_i32_flexible(x.trim(), key)?, parse_i32_flexible(y.trim(), key)?))
}

fn parse_color(raw: &str, key: &str) -> Result<Color, ShellError> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_prefix('#'))
        .unwrap_or(trimmed);
    let argb = u32::from_str_radix(hex, 16).map_err(|err| {
        ShellError::Config(format!("invalid value for {key}: {raw} ({err})"))
    })?;
    // Six hex digits carry no alpha; treat them as opaque.
    let argb = if hex.len() <= 6 { argb | 0xff00_0000 } else { argb };
    Ok(Color::from_argb(argb))
}

fn parse_u16_flexible(raw: &str, key: &str) -> Result<u16, ShellError> {
    if let Ok(number) = raw.parse::<u16>() {
        return Ok(number);
    }

    let parsed = raw
        .parse::<f64>()
        .map_err(|err| ShellError::Config(format!("invalid value for {key}: {raw} ({err})")))?;
    if !parsed.is_finite() || parsed < 0.0 || parsed > u16::MAX as f64 || parsed.fract() != 0.0 {
        return Err(ShellError::Config(format!(
            "invalid value for {key}: {raw} (expected non-negative integer <= {})",
            u16::MAX
        )));
    }

    Ok(parsed as u16)
}

fn parse_i32_flexible(raw: &str, key: &str) -> Result<i32, ShellError> {
    if let Ok(number) = raw.parse::<i32>() {
        return Ok(number);
    }

    let parsed = raw
        .parse::<f64>()
        .map_err(|err| ShellError::Config(format!("invalid value for {key}: {raw} ({err})")))?;
    if !parsed.is_finite()
        || parsed < i32::MIN as f64
        || parsed > i32::MAX as f64
        || parsed.fract() != 0.0
    {
        return Err(ShellError::Config(format!(
            "invalid value for {key}: {raw} (expected integer)"
        )));
    }

    Ok(parsed as i32)
}

fn parse_bool_flexible(
    values: &HashMap<String, String>,
    key: &str,
    default: bool,
) -> Result<bool, ShellError> {
    let Some(raw) = values.get(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ShellError::Config(format!(
            "invalid value for {key}: {raw} (expected bool or 0/1)"
        ))),
    }
}

fn default_config_template() -> &'static str {
    r#"# ivi-shell configuration

[shell]
# Show desktop applications as soon as they commit, on the output holding
# the background (or the output reserved for them as remote).
activate-by-default=false
# Colour of the curtain shown on outputs with nothing else to display.
curtain-color=0xff000000
# Keep set_app_property registrations after they have been used.
keep-pending=false

#[shell-client]
#command=/usr/bin/homescreen

#[output]
#name=HDMI-A-1
#mode=1920x1080
#position=0,0
"#
}
