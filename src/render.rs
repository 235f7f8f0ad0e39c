use crate::types::{HudView, RuntimeEvent, Snapshot};

/// Presentation sink driven by the engine. The core only pushes into it and
/// never reads anything back.
pub trait Renderer {
    /// Entities with their visual state plus the HUD values.
    fn draw_frame(&mut self, frame: &Snapshot);
    fn floating_text(&mut self, x: f32, y: f32, text: &str);
    fn show_message(&mut self, text: &str);
}

/// Forwards the presentation side of drained events: score deltas become
/// floating text, `Message` events become banners.
pub fn forward_events(renderer: &mut dyn Renderer, events: &[RuntimeEvent]) {
    for event in events {
        match event {
            RuntimeEvent::ItemCollected { x, y, points, .. } if *points > 0 => {
                renderer.floating_text(*x, *y, &format!("+{points}"));
            }
            RuntimeEvent::EnemyDefeated { x, y, points, .. } => {
                renderer.floating_text(*x, *y, &format!("+{points}"));
            }
            RuntimeEvent::Message { text } => renderer.show_message(text),
            _ => {}
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw_frame(&mut self, _frame: &Snapshot) {}
    fn floating_text(&mut self, _x: f32, _y: f32, _text: &str) {}
    fn show_message(&mut self, _text: &str) {}
}

/// Keeps what it was asked to draw.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    pub frames: usize,
    pub last_hud: Option<HudView>,
    pub floating: Vec<(f32, f32, String)>,
    pub messages: Vec<String>,
}

impl Renderer for RecordingRenderer {
    fn draw_frame(&mut self, frame: &Snapshot) {
        self.frames += 1;
        self.last_hud = Some(frame.hud.clone());
    }

    fn floating_text(&mut self, x: f32, y: f32, text: &str) {
        self.floating.push((x, y, text.to_string()));
    }

    fn show_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::{forward_events, RecordingRenderer};
    use crate::types::{ItemKind, RuntimeEvent};

    #[test]
    fn score_deltas_and_messages_are_forwarded() {
        let mut renderer = RecordingRenderer::default();
        let events = vec![
            RuntimeEvent::ItemCollected {
                item_id: 1,
                kind: ItemKind::Dot,
                x: 75.0,
                y: 175.0,
                points: 15,
            },
            RuntimeEvent::ItemCollected {
                item_id: 2,
                kind: ItemKind::Bone,
                x: 0.0,
                y: 0.0,
                points: 0,
            },
            RuntimeEvent::PowerModeChanged { active: true },
            RuntimeEvent::Message {
                text: "Extra Life!".to_string(),
            },
        ];
        forward_events(&mut renderer, &events);
        assert_eq!(renderer.floating, vec![(75.0, 175.0, "+15".to_string())]);
        assert_eq!(renderer.messages, vec!["Extra Life!".to_string()]);
    }
}
