//! Cue-driven arena lighting timeline. Grounded on
//! `original_source/.../competition_supervisor/lighting_control.py`, with one
//! deliberate deviation from that file: the fade step count uses
//! `round(fade_ms / step_ms)` rather than Python's truncating `int(...)`,
//! and never drops an interpolated step in favour of a later exact one. See
//! DESIGN.md for why.

use crate::error::SimError;
use crate::physics_host::PhysicsHost;

const MATCH_LIGHTING_INTENSITY: f64 = 1.5;
const DEFAULT_LUMINOSITY: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
pub enum StartTime {
    Absolute(f64),
    /// Time relative to the end of the match. 0 is the last frame of video;
    /// positive values only appear in the post-match still image.
    FromEnd(f64),
}

#[derive(Debug, Clone)]
pub struct ArenaLighting {
    pub light_def: String,
    pub intensity: f64,
    pub colour: (f64, f64, f64),
}

impl ArenaLighting {
    fn new(light_def: &str, intensity: f64) -> Self {
        Self { light_def: light_def.to_string(), intensity, colour: (1.0, 1.0, 1.0) }
    }

    fn with_colour(light_def: &str, intensity: f64, colour: (f64, f64, f64)) -> Self {
        Self { light_def: light_def.to_string(), intensity, colour }
    }
}

#[derive(Debug, Clone)]
pub struct LightingEffect {
    pub start_time: StartTime,
    pub fade_time: Option<f64>,
    pub lighting: ArenaLighting,
    pub luminosity: f64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct LightingStep {
    pub timestep: i64,
    pub light_def: String,
    pub intensity: Option<f64>,
    pub colour: Option<(f64, f64, f64)>,
    pub luminosity: Option<f64>,
    pub name: Option<String>,
}

fn default_cue_stack() -> Vec<LightingEffect> {
    vec![
        LightingEffect {
            start_time: StartTime::Absolute(0.0),
            fade_time: None,
            lighting: ArenaLighting::new("SUN", 0.2),
            luminosity: 0.05,
            name: "Pre-set".to_string(),
        },
        LightingEffect {
            start_time: StartTime::Absolute(0.0),
            fade_time: Some(1.5),
            lighting: ArenaLighting::new("SUN", MATCH_LIGHTING_INTENSITY),
            luminosity: DEFAULT_LUMINOSITY,
            name: "Fade-up".to_string(),
        },
        LightingEffect {
            start_time: StartTime::FromEnd(0.0),
            fade_time: None,
            lighting: ArenaLighting::with_colour("SUN", 1.0, (0.8, 0.1, 0.1)),
            luminosity: 0.1,
            name: "End of match".to_string(),
        },
        LightingEffect {
            start_time: StartTime::FromEnd(1.0),
            fade_time: None,
            lighting: ArenaLighting::new("SUN", MATCH_LIGHTING_INTENSITY),
            luminosity: DEFAULT_LUMINOSITY,
            name: "Post-match image".to_string(),
        },
    ]
}

#[derive(Clone, Copy)]
struct LightState {
    intensity: f64,
    colour: (f64, f64, f64),
    luminosity: f64,
}

pub struct LightingControl {
    final_timestep: i64,
    basic_step_ms: i32,
    ambient_node_def: String,
    steps: Vec<LightingStep>,
}

impl LightingControl {
    pub fn new(
        host: &dyn PhysicsHost,
        final_timestep: i64,
        basic_step_ms: i32,
        ambient_node_def: &str,
    ) -> Result<Self, SimError> {
        Self::with_cue_stack(host, final_timestep, basic_step_ms, ambient_node_def, default_cue_stack())
    }

    fn with_cue_stack(
        host: &dyn PhysicsHost,
        final_timestep: i64,
        basic_step_ms: i32,
        ambient_node_def: &str,
        cue_stack: Vec<LightingEffect>,
    ) -> Result<Self, SimError> {
        let mut light_defs: Vec<&str> = cue_stack.iter().map(|c| c.lighting.light_def.as_str()).collect();
        light_defs.sort_unstable();
        light_defs.dedup();
        for light_def in &light_defs {
            if host.node_field_get_sf_float(light_def, "intensity").is_none() {
                return Err(SimError::MissingLightNode(light_def.to_string()));
            }
        }

        let cue_stack = convert_from_end_times(cue_stack, final_timestep, basic_step_ms);
        let mut current_values: std::collections::HashMap<String, LightState> = std::collections::HashMap::new();
        for light_def in &light_defs {
            let intensity = host.node_field_get_sf_float(light_def, "intensity").unwrap_or(0.0);
            let colour = host.node_field_get_sf_color(light_def, "color").unwrap_or((1.0, 1.0, 1.0));
            current_values.insert(light_def.to_string(), LightState { intensity, colour, luminosity: 0.0 });
        }
        let mut current_luminosity = host.node_field_get_sf_float(ambient_node_def, "luminosity").unwrap_or(0.0);

        let mut steps = Vec::new();
        for cue in &cue_stack {
            let mut state = *current_values.get(&cue.lighting.light_def).expect("light resolved above");
            state.luminosity = current_luminosity;

            let expanded = expand_lighting_fade(cue, &state, basic_step_ms);
            let last = expanded.last().expect("a cue always expands to at least one step");
            current_values.insert(
                cue.lighting.light_def.clone(),
                LightState {
                    intensity: last.intensity.unwrap_or(state.intensity),
                    colour: last.colour.unwrap_or(state.colour),
                    luminosity: last.luminosity.unwrap_or(state.luminosity),
                },
            );
            current_luminosity = last.luminosity.unwrap_or(current_luminosity);
            steps.extend(expanded);
        }
        steps.sort_by_key(|s| s.timestep);

        Ok(Self { final_timestep, basic_step_ms, ambient_node_def: ambient_node_def.to_string(), steps })
    }

    /// Applies every queued step whose timestep matches `current_timestep`,
    /// collapsing all remaining steps onto the final timestep once the match
    /// has ended. Returns the delay (in timesteps) until the next pending
    /// step, or `-1` once the queue is exhausted.
    pub fn service_lighting(&mut self, current_timestep: i64, host: &mut dyn PhysicsHost) -> i64 {
        if current_timestep >= self.final_timestep {
            for step in self.steps.drain(..) {
                Self::apply_step(&step, self.ambient_node_def.as_str(), self.basic_step_ms, host);
            }
            return -1;
        }

        let mut index = 0;
        while index < self.steps.len() && self.steps[index].timestep == current_timestep {
            Self::apply_step(&self.steps[index], self.ambient_node_def.as_str(), self.basic_step_ms, host);
            index += 1;
        }
        self.steps.drain(0..index);

        match self.steps.first() {
            Some(step) => step.timestep - current_timestep,
            None => -1,
        }
    }

    fn apply_step(step: &LightingStep, ambient_node_def: &str, basic_step_ms: i32, host: &mut dyn PhysicsHost) {
        if let Some(name) = &step.name {
            tracing::info!(
                name = %name,
                time_s = step.timestep as f64 * basic_step_ms as f64 / 1000.0,
                "running lighting effect"
            );
        }
        if let Some(intensity) = step.intensity {
            host.node_field_set_sf_float(&step.light_def, "intensity", intensity);
        }
        if let Some(colour) = step.colour {
            host.node_field_set_sf_color(&step.light_def, "color", colour);
        }
        if let Some(luminosity) = step.luminosity {
            host.node_field_set_sf_float(ambient_node_def, "luminosity", luminosity);
        }
    }
}

fn convert_from_end_times(cue_stack: Vec<LightingEffect>, final_timestep: i64, basic_step_ms: i32) -> Vec<LightingEffect> {
    let end_time = final_timestep as f64 * basic_step_ms as f64 / 1000.0;
    // At 25fps the last 5 timesteps don't make it into the recorded video.
    let start_of_frame_offset = basic_step_ms as f64 * 6.0 / 1000.0;
    cue_stack
        .into_iter()
        .map(|cue| match cue.start_time {
            StartTime::FromEnd(t) => LightingEffect {
                start_time: StartTime::Absolute(end_time + t - start_of_frame_offset),
                ..cue
            },
            StartTime::Absolute(_) => cue,
        })
        .collect()
}

fn expand_lighting_fade(cue: &LightingEffect, current: &LightState, basic_step_ms: i32) -> Vec<LightingStep> {
    let StartTime::Absolute(start_time) = cue.start_time else {
        unreachable!("FromEnd times are converted to Absolute before expansion")
    };
    let cue_start = (start_time * 1000.0 / basic_step_ms as f64) as i64;

    let Some(fade_time) = cue.fade_time else {
        return vec![LightingStep {
            timestep: cue_start,
            light_def: cue.lighting.light_def.clone(),
            intensity: Some(cue.lighting.intensity),
            colour: Some(cue.lighting.colour),
            luminosity: Some(cue.luminosity),
            name: Some(cue.name.clone()),
        }];
    };

    let fade_steps = ((fade_time * 1000.0 / basic_step_ms as f64).round() as i64).max(1);
    let intensity_step = (cue.lighting.intensity - current.intensity) / fade_steps as f64;
    let colour_step = (
        (cue.lighting.colour.0 - current.colour.0) / fade_steps as f64,
        (cue.lighting.colour.1 - current.colour.1) / fade_steps as f64,
        (cue.lighting.colour.2 - current.colour.2) / fade_steps as f64,
    );
    let luminosity_step = (cue.luminosity - current.luminosity) / fade_steps as f64;

    let mut steps = Vec::with_capacity((fade_steps + 1) as usize);
    for step in 0..fade_steps {
        let s = step as f64;
        steps.push(LightingStep {
            timestep: cue_start + step,
            light_def: cue.lighting.light_def.clone(),
            intensity: Some(current.intensity + intensity_step * s),
            colour: Some((
                current.colour.0 + colour_step.0 * s,
                current.colour.1 + colour_step.1 * s,
                current.colour.2 + colour_step.2 * s,
            )),
            luminosity: Some(current.luminosity + luminosity_step * s),
            name: if step == 0 { Some(cue.name.clone()) } else { None },
        });
    }
    steps.push(LightingStep {
        timestep: cue_start + fade_steps,
        light_def: cue.lighting.light_def.clone(),
        intensity: Some(cue.lighting.intensity),
        colour: Some(cue.lighting.colour),
        luminosity: Some(cue.luminosity),
        name: None,
    });
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_host::MockPhysicsHost;

    fn host_with_sun() -> MockPhysicsHost {
        let mut host = MockPhysicsHost::new(32);
        host.node_field_set_sf_float("SUN", "intensity", 0.0);
        host.node_field_set_sf_color("SUN", "color", (1.0, 1.0, 1.0));
        host.node_field_set_sf_float("AMBIENT", "luminosity", 0.0);
        host
    }

    #[test]
    fn missing_light_node_is_an_error() {
        let host = MockPhysicsHost::new(32);
        let err = LightingControl::new(&host, 312, 32, "AMBIENT").unwrap_err();
        assert!(matches!(err, SimError::MissingLightNode(_)));
    }

    #[test]
    fn property_7_fade_up_step_count_and_endpoint() {
        // Isolate the "Fade-up" cue's geometry directly: a single fade from
        // luminosity 0 to 1 over 1.5s at a 32ms basic step (spec S6).
        let cue = LightingEffect {
            start_time: StartTime::Absolute(0.0),
            fade_time: Some(1.5),
            lighting: ArenaLighting::new("SUN", MATCH_LIGHTING_INTENSITY),
            luminosity: 1.0,
            name: "Fade-up".to_string(),
        };
        let current = LightState { intensity: 0.2, colour: (1.0, 1.0, 1.0), luminosity: 0.0 };
        let steps = expand_lighting_fade(&cue, &current, 32);

        // N = round(1500 / 32) = 47; N interpolated steps + 1 final snap.
        assert_eq!(steps.len(), 48);
        assert_eq!(steps[0].timestep, 0);
        assert_eq!(steps[0].name.as_deref(), Some("Fade-up"));
        assert_eq!(steps[46].timestep, 46);
        assert!(steps[46].name.is_none());
        assert_eq!(steps[47].timestep, 47);
        assert_eq!(steps[47].luminosity, Some(1.0));
        assert_eq!(steps[47].intensity, Some(MATCH_LIGHTING_INTENSITY));

        // Linear interpolation, not the original's truncated/skipped variant.
        let expected_lum_step1 = current.luminosity + (1.0 - current.luminosity) / 47.0;
        assert!((steps[1].luminosity.unwrap() - expected_lum_step1).abs() < 1e-9);
    }

    #[test]
    fn no_fade_time_emits_a_single_exact_step() {
        let cue = LightingEffect {
            start_time: StartTime::Absolute(0.25),
            fade_time: None,
            lighting: ArenaLighting::new("SUN", 0.2),
            luminosity: 0.05,
            name: "Pre-set".to_string(),
        };
        let current = LightState { intensity: 0.0, colour: (1.0, 1.0, 1.0), luminosity: 0.0 };
        let steps = expand_lighting_fade(&cue, &current, 32);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].timestep, (0.25 * 1000.0 / 32.0) as i64);
        assert_eq!(steps[0].name.as_deref(), Some("Pre-set"));
    }

    #[test]
    fn s6_full_match_service_applies_interpolated_and_final_steps() {
        let host = host_with_sun();
        let mut control = LightingControl::with_cue_stack(
            &host,
            312,
            32,
            "AMBIENT",
            vec![LightingEffect {
                start_time: StartTime::Absolute(0.0),
                fade_time: Some(1.5),
                lighting: ArenaLighting::new("SUN", MATCH_LIGHTING_INTENSITY),
                luminosity: 1.0,
                name: "Fade-up".to_string(),
            }],
        )
        .unwrap();

        let mut live_host = host_with_sun();
        let delay = control.service_lighting(0, &mut live_host);
        assert_eq!(delay, 1);
        assert_eq!(live_host.node_field_get_sf_float("AMBIENT", "luminosity"), Some(0.0));

        for t in 1..47 {
            control.service_lighting(t, &mut live_host);
        }
        let final_delay = control.service_lighting(47, &mut live_host);
        assert_eq!(final_delay, -1);
        assert_eq!(live_host.node_field_get_sf_float("AMBIENT", "luminosity"), Some(1.0));
        assert_eq!(live_host.node_field_get_sf_float("SUN", "intensity"), Some(MATCH_LIGHTING_INTENSITY));
    }

    #[test]
    fn end_of_match_collapses_remaining_steps_onto_final_timestep() {
        let host = host_with_sun();
        let mut control = LightingControl::with_cue_stack(
            &host,
            10,
            32,
            "AMBIENT",
            vec![LightingEffect {
                start_time: StartTime::FromEnd(0.0),
                fade_time: None,
                lighting: ArenaLighting::with_colour("SUN", 1.0, (0.8, 0.1, 0.1)),
                luminosity: 0.1,
                name: "End of match".to_string(),
            }],
        )
        .unwrap();
        let mut live_host = host_with_sun();
        // Past the final timestep: the queued step still fires.
        let delay = control.service_lighting(500, &mut live_host);
        assert_eq!(delay, -1);
        assert_eq!(live_host.node_field_get_sf_color("SUN", "color"), Some((0.8, 0.1, 0.1)));
    }

    #[test]
    fn collapse_applies_every_distinct_pending_timestep_not_just_the_last() {
        // A short match with a fade still queued: multiple distinct pending
        // timesteps must all be applied once the match ends, not only the
        // one matching the reassigned final timestep.
        let host = host_with_sun();
        let mut control = LightingControl::with_cue_stack(
            &host,
            5,
            32,
            "AMBIENT",
            vec![LightingEffect {
                start_time: StartTime::Absolute(0.0),
                fade_time: Some(1.5),
                lighting: ArenaLighting::new("SUN", MATCH_LIGHTING_INTENSITY),
                luminosity: 1.0,
                name: "Fade-up".to_string(),
            }],
        )
        .unwrap();
        assert!(control.steps.len() > 1);

        let mut live_host = host_with_sun();
        let delay = control.service_lighting(500, &mut live_host);
        assert_eq!(delay, -1);
        assert!(control.steps.is_empty());
        assert_eq!(live_host.node_field_get_sf_float("AMBIENT", "luminosity"), Some(1.0));
        assert_eq!(live_host.node_field_get_sf_float("SUN", "intensity"), Some(MATCH_LIGHTING_INTENSITY));
    }
}
