use foundation::{LabelIndex, PointIndex};
use gpu::RenderMode;
use layers::ColoringMode;
use serde::Serialize;

/// A discrete input the session reacts to.
///
/// Text form, one per line: `hover 3`, `click none`, `noise off`,
/// `select 2`, `color label`, `mode sprites`, `ready 400 300`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum InputEvent {
    Hover { point: Option<PointIndex> },
    Click { point: Option<PointIndex> },
    ToggleNoise { show: bool },
    SelectCluster { label: Option<LabelIndex> },
    SetColoringMode { mode: ColoringMode },
    SetRenderMode { mode: RenderMode },
    SpriteSheetReady { width_px: u32, height_px: u32 },
}

fn parse_optional<T: std::str::FromStr>(word: &str) -> Result<Option<T>, String> {
    if word == "none" {
        return Ok(None);
    }
    word.parse()
        .map(Some)
        .map_err(|_| format!("expected a number or `none`, got {word:?}"))
}

fn parse_toggle(word: &str) -> Result<bool, String> {
    match word {
        "on" | "true" | "show" => Ok(true),
        "off" | "false" | "hide" => Ok(false),
        other => Err(format!("expected on/off, got {other:?}")),
    }
}

impl std::str::FromStr for InputEvent {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["hover", p] => Ok(InputEvent::Hover {
                point: parse_optional(p)?,
            }),
            ["click", p] => Ok(InputEvent::Click {
                point: parse_optional(p)?,
            }),
            ["noise", v] => Ok(InputEvent::ToggleNoise {
                show: parse_toggle(v)?,
            }),
            ["select", l] => Ok(InputEvent::SelectCluster {
                label: parse_optional(l)?,
            }),
            ["color", m] => Ok(InputEvent::SetColoringMode { mode: m.parse()? }),
            ["mode", m] => Ok(InputEvent::SetRenderMode { mode: m.parse()? }),
            ["ready", w, h] => Ok(InputEvent::SpriteSheetReady {
                width_px: w.parse().map_err(|_| format!("bad width {w:?}"))?,
                height_px: h.parse().map_err(|_| format!("bad height {h:?}"))?,
            }),
            _ => Err(format!("unrecognized input: {line:?}")),
        }
    }
}

/// Parses a script, skipping blank lines and `#` comments.
///
/// Errors carry the 1-based line number.
pub fn parse_script(script: &str) -> Result<Vec<InputEvent>, String> {
    script
        .lines()
        .enumerate()
        .filter(|(_, l)| {
            let t = l.trim();
            !t.is_empty() && !t.starts_with('#')
        })
        .map(|(i, l)| l.parse().map_err(|e| format!("line {}: {e}", i + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_input_kind() {
        let script = "
            # warm up
            hover 3
            click none
            noise off
            select -1
            color default
            mode sprites
            ready 400 300
        ";
        assert_eq!(
            parse_script(script),
            Ok(vec![
                InputEvent::Hover { point: Some(3) },
                InputEvent::Click { point: None },
                InputEvent::ToggleNoise { show: false },
                InputEvent::SelectCluster { label: Some(-1) },
                InputEvent::SetColoringMode {
                    mode: ColoringMode::Default
                },
                InputEvent::SetRenderMode {
                    mode: RenderMode::Sprites
                },
                InputEvent::SpriteSheetReady {
                    width_px: 400,
                    height_px: 300
                },
            ])
        );
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_script("hover 1\nclick -2\n").expect_err("negative point");
        assert!(err.starts_with("line 2:"), "{err}");
        assert!("jump 3".parse::<InputEvent>().is_err());
        assert!("noise maybe".parse::<InputEvent>().is_err());
    }
}
