//! Text scripts of shell events, one per line, for the headless driver.
//!
//! ```text
//! output HDMI-A-1 0 0 1920 1080
//! bind-shell 1
//! surface 10 client=1
//! commit 10 0 0 1920 1080 maximized
//! background 10 HDMI-A-1
//! ready
//! property nav popup HDMI-A-1 x=100 y=50
//! surface 20 client=2 app=nav
//! commit 20 0 0 400 300
//! ```

use anyhow::{Context, Result, anyhow, bail};
use smithay::utils::{Logical, Rectangle};

use crate::{
    handlers::Event,
    scene::rect,
    surface::{ClientId, SurfaceHandle, SurfaceState},
};

pub fn parse_script(script: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for (lineno, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = parse_line(line).with_context(|| format!("line {}: `{line}`", lineno + 1))?;
        events.push(event);
    }
    Ok(events)
}

pub fn parse_line(line: &str) -> Result<Event> {
    let mut words = line.split_whitespace();
    let command = words.next().ok_or_else(|| anyhow!("empty line"))?;
    let args: Vec<&str> = words.collect();
    let (positional, options) = split_options(&args);

    let event = match command {
        "output" => {
            expect_args(&positional, 5)?;
            Event::OutputAdded {
                name: positional[0].to_owned(),
                geometry: parse_rect(&positional[1..5])?,
            }
        }
        "output-remove" => {
            expect_args(&positional, 1)?;
            Event::OutputRemoved {
                name: positional[0].to_owned(),
            }
        }
        "bind-shell" => {
            expect_args(&positional, 1)?;
            Event::BindShell {
                client: parse_client(positional[0])?,
            }
        }
        "shell-gone" => Event::ShellGone,
        "ready" => Event::Ready,
        "surface" => {
            expect_args(&positional, 1)?;
            let client = option(&options, "client")
                .ok_or_else(|| anyhow!("surface needs client=<id>"))?;
            Event::SurfaceAdded {
                surface: parse_handle(positional[0])?,
                client: parse_client(client)?,
                app_id: option(&options, "app").map(str::to_owned),
            }
        }
        "app-id" => {
            expect_args(&positional, 2)?;
            Event::SurfaceAppId {
                surface: parse_handle(positional[0])?,
                app_id: Some(positional[1].to_owned()),
            }
        }
        "commit" => {
            if positional.len() < 5 {
                bail!("commit needs <surface> <x> <y> <width> <height> [maximized] [fullscreen]");
            }
            let mut state = SurfaceState {
                geometry: parse_rect(&positional[1..5])?,
                ..SurfaceState::default()
            };
            for flag in &positional[5..] {
                match *flag {
                    "maximized" => state.maximized = true,
                    "fullscreen" => state.fullscreen = true,
                    other => bail!("unknown commit flag `{other}`"),
                }
            }
            Event::SurfaceCommitted {
                surface: parse_handle(positional[0])?,
                state,
            }
        }
        "destroy" => {
            expect_args(&positional, 1)?;
            Event::SurfaceRemoved {
                surface: parse_handle(positional[0])?,
            }
        }
        "background" => {
            expect_args(&positional, 2)?;
            Event::SetBackground {
                surface: parse_handle(positional[0])?,
                output: positional[1].to_owned(),
            }
        }
        "panel" => {
            expect_args(&positional, 3)?;
            Event::SetPanel {
                surface: parse_handle(positional[0])?,
                output: positional[1].to_owned(),
                edge: parse_edge(positional[2])?,
            }
        }
        "activate" => {
            expect_args(&positional, 2)?;
            Event::ActivateApp {
                app_id: positional[0].to_owned(),
                output: positional[1].to_owned(),
            }
        }
        "deactivate" => {
            expect_args(&positional, 1)?;
            Event::DeactivateApp {
                app_id: positional[0].to_owned(),
            }
        }
        "property" => {
            expect_args(&positional, 3)?;
            let clip = match option(&options, "clip") {
                Some(raw) => {
                    let parts: Vec<&str> = raw.split(',').collect();
                    Some(parse_rect(&parts)?)
                }
                None => None,
            };
            Event::SetAppProperty {
                app_id: positional[0].to_owned(),
                role: parse_app_role(positional[1])?,
                x: option(&options, "x").map(parse_number).transpose()?.unwrap_or(0),
                y: option(&options, "y").map(parse_number).transpose()?.unwrap_or(0),
                clip,
                output: positional[2].to_owned(),
            }
        }
        "property-mode" => {
            expect_args(&positional, 1)?;
            let keep_pending = match positional[0] {
                "keep" => true,
                "consume" => false,
                other => bail!("unknown property mode `{other}`, expected keep or consume"),
            };
            Event::SetAppPropertyMode { keep_pending }
        }
        "bind-desktop" => {
            expect_args(&positional, 1)?;
            Event::BindDesktopClient {
                client: parse_client(positional[0])?,
            }
        }
        "desktop-gone" => {
            expect_args(&positional, 1)?;
            Event::DesktopClientGone {
                client: parse_client(positional[0])?,
            }
        }
        other => bail!("unknown command `{other}`"),
    };
    Ok(event)
}

fn split_options<'a>(args: &[&'a str]) -> (Vec<&'a str>, Vec<(&'a str, &'a str)>) {
    let mut positional = Vec::new();
    let mut options = Vec::new();
    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) => options.push((key, value)),
            None => positional.push(*arg),
        }
    }
    (positional, options)
}

fn option<'a>(options: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| *value)
}

fn expect_args(positional: &[&str], count: usize) -> Result<()> {
    if positional.len() != count {
        bail!(
            "expected {count} argument(s), got {}",
            positional.len()
        );
    }
    Ok(())
}

fn parse_number(raw: &str) -> Result<i32> {
    raw.parse::<i32>()
        .with_context(|| format!("`{raw}` is not a number"))
}

fn parse_rect(parts: &[&str]) -> Result<Rectangle<i32, Logical>> {
    let [x, y, w, h] = parts else {
        bail!("expected <x> <y> <width> <height>");
    };
    Ok(rect(
        parse_number(x)?,
        parse_number(y)?,
        parse_number(w)?,
        parse_number(h)?,
    ))
}

fn parse_handle(raw: &str) -> Result<SurfaceHandle> {
    raw.parse::<u64>()
        .map(SurfaceHandle)
        .with_context(|| format!("`{raw}` is not a surface id"))
}

fn parse_client(raw: &str) -> Result<ClientId> {
    raw.parse::<u64>()
        .map(ClientId)
        .with_context(|| format!("`{raw}` is not a client id"))
}

fn parse_edge(raw: &str) -> Result<u32> {
    Ok(match raw {
        "top" => 0,
        "bottom" => 1,
        "left" => 2,
        "right" => 3,
        // Raw wire values go through unchanged, invalid ones included.
        other => other
            .parse::<u32>()
            .with_context(|| format!("unknown edge `{other}`"))?,
    })
}

fn parse_app_role(raw: &str) -> Result<u32> {
    Ok(match raw {
        "popup" => 0,
        "fullscreen" => 1,
        "split-vertical" => 2,
        "split-horizontal" => 3,
        "remote" => 4,
        other => other
            .parse::<u32>()
            .with_context(|| format!("unknown application role `{other}`"))?,
    })
}
