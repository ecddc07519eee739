use serde::Serialize;

use crate::bridge::{HoverInfo, SpritePreview};

/// The hover panel: text fields plus a canvas for the sprite preview.
///
/// Implemented outside this workspace (DOM, egui, ...); the session only
/// decides what to show.
pub trait HoverPanel {
    fn show(&mut self, info: &HoverInfo);
    fn draw_sprite(&mut self, preview: &SpritePreview);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PanelCommand {
    Show { info: HoverInfo },
    DrawSprite { preview: SpritePreview },
}

/// Headless panel that records what it was asked to display.
#[derive(Debug, Default)]
pub struct RecordingPanel {
    commands: Vec<PanelCommand>,
}

impl RecordingPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PanelCommand] {
        &self.commands
    }

    pub fn drain(&mut self) -> Vec<PanelCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn last_sprite(&self) -> Option<&SpritePreview> {
        self.commands.iter().rev().find_map(|c| match c {
            PanelCommand::DrawSprite { preview } => Some(preview),
            PanelCommand::Show { .. } => None,
        })
    }

    pub fn last_info(&self) -> Option<&HoverInfo> {
        self.commands.iter().rev().find_map(|c| match c {
            PanelCommand::Show { info } => Some(info),
            PanelCommand::DrawSprite { .. } => None,
        })
    }
}

impl HoverPanel for RecordingPanel {
    fn show(&mut self, info: &HoverInfo) {
        self.commands.push(PanelCommand::Show { info: info.clone() });
    }

    fn draw_sprite(&mut self, preview: &SpritePreview) {
        self.commands.push(PanelCommand::DrawSprite { preview: *preview });
    }
}
