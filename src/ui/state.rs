use crate::config::RoseConfig;

const DEFAULT_FPS_CAP: u32 = 60;

pub struct UiState {
    pub show_panel: bool,
    pub show_help: bool,
    pub vsync_enabled: bool,

    pub fps_cap_enabled: bool,
    pub fps_cap: u32,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_panel: true,
            show_help: true,
            vsync_enabled: true,
            fps_cap_enabled: false,
            fps_cap: DEFAULT_FPS_CAP,
        }
    }
}

impl UiState {
    pub fn from_config(config: &RoseConfig, hide_panel: bool) -> Self {
        Self {
            show_panel: config.ui.show_panel && !hide_panel,
            vsync_enabled: config.render.vsync,
            fps_cap_enabled: config.ui.fps_cap > 0,
            fps_cap: if config.ui.fps_cap > 0 {
                config.ui.fps_cap
            } else {
                DEFAULT_FPS_CAP
            },
            ..Self::default()
        }
    }
}

/// Per-frame numbers shown in the side panel.
#[derive(Clone, Debug, Default)]
pub struct RoseStats {
    pub fps: f32,
    pub vertices: usize,
    pub triangles: usize,
    pub petals: usize,
    pub sepals: usize,
    pub pointer: [f32; 2],
    /// Pitch, yaw.
    pub rotation: [f32; 2],
    pub dropped_events: u64,
    pub gpu_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_config_disables_cap() {
        let state = UiState::from_config(&RoseConfig::default(), false);
        assert!(!state.fps_cap_enabled);
        assert_eq!(state.fps_cap, DEFAULT_FPS_CAP);
        assert!(state.show_panel);
    }

    #[test]
    fn config_values_carry_over() {
        let mut config = RoseConfig::default();
        config.ui.fps_cap = 30;
        config.render.vsync = false;
        let state = UiState::from_config(&config, true);
        assert!(state.fps_cap_enabled);
        assert_eq!(state.fps_cap, 30);
        assert!(!state.vsync_enabled);
        assert!(!state.show_panel);
    }
}
