//! Scripted input replay against the demo notepad
//!
//! A script is a YAML list of steps, each naming exactly one action:
//!
//! ```yaml
//! steps:
//!   - focus: editor
//!   - key: "ctrl+n"
//!   - key: "alt"
//!     release: true
//!   - mouse: "mouse_left*3"
//!   - mouse: "mouse_middle"
//!     target: tabs
//!   - wheel: 120
//!     mods: "ctrl"
//!   - run: true
//! ```
//!
//! `key` and `mouse` take the same stroke syntax as keymap files. `run`
//! drives the foreground executor so pending commands can finish.

use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;

use crate::commands::DispatchError;
use crate::demo::DemoApp;
use crate::keymap::{parse_key_string, parse_modifiers, KeyCode, Keymap, Modifiers, Stroke};
use crate::model::{ElementId, ElementTree, InputFlags};
use crate::runtime::{
    DispatchResult, EventPhase, ForegroundExecutor, InputOutcome, KeyEvent, MouseButtonEvent,
    MouseWheelEvent, ShortcutInputManager, Task,
};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    pub steps: Vec<Step>,
}

/// One scripted action plus its options
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Step {
    pub focus: Option<String>,
    pub key: Option<String>,
    pub mouse: Option<String>,
    pub wheel: Option<i32>,
    pub run: bool,

    pub release: bool,
    pub repeat: bool,
    pub phase: EventPhase,
    /// Element the event is delivered to; defaults to the focused element
    pub target: Option<String>,
    /// Extra live modifiers held during the step, e.g. "ctrl+shift"
    pub mods: Option<String>,
}

enum Action<'a> {
    Focus(&'a str),
    Key(&'a str),
    Mouse(&'a str),
    Wheel(i32),
    Run,
}

impl Step {
    fn action(&self) -> anyhow::Result<Action<'_>> {
        let mut actions = Vec::new();
        if let Some(name) = &self.focus {
            actions.push(Action::Focus(name));
        }
        if let Some(key) = &self.key {
            actions.push(Action::Key(key));
        }
        if let Some(mouse) = &self.mouse {
            actions.push(Action::Mouse(mouse));
        }
        if let Some(delta) = self.wheel {
            actions.push(Action::Wheel(delta));
        }
        if self.run {
            actions.push(Action::Run);
        }

        match actions.len() {
            1 => Ok(actions.remove(0)),
            0 => bail!("step has no action (focus, key, mouse, wheel or run)"),
            n => bail!("step has {} actions, expected one", n),
        }
    }

    fn describe(&self) -> String {
        let mut text = match self.action() {
            Ok(Action::Focus(name)) => format!("focus {}", name),
            Ok(Action::Key(key)) => format!("key {}", key),
            Ok(Action::Mouse(mouse)) => format!("mouse {}", mouse),
            Ok(Action::Wheel(delta)) => format!("wheel {:+}", delta),
            Ok(Action::Run) => "run".to_string(),
            Err(_) => "invalid".to_string(),
        };
        if let Some(mods) = &self.mods {
            text.push_str(&format!(" [{}]", mods));
        }
        if self.release {
            text.push_str(" (release)");
        }
        if self.repeat {
            text.push_str(" (repeat)");
        }
        if self.phase.is_preview() {
            text.push_str(" (preview)");
        }
        if let Some(target) = &self.target {
            text.push_str(&format!(" @{}", target));
        }
        text
    }
}

pub fn parse_script(yaml: &str) -> anyhow::Result<Script> {
    serde_yaml::from_str(yaml).context("Invalid replay script")
}

pub fn load_script(path: &Path) -> anyhow::Result<Script> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_script(&yaml)
}

/// A pending dispatch that finished during a `run` step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    /// Index of the step that started the dispatch
    pub step: usize,
    pub result: Result<bool, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Focused,
    Ignored,
    Completed { handled: bool },
    /// The stroke started or extended a chord; the strokes so far
    AwaitingChord(String),
    Pending,
    Faulted(String),
    Ran(Vec<Settled>),
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Focused => write!(f, "focused"),
            StepOutcome::Ignored => write!(f, "ignored"),
            StepOutcome::Completed { handled: true } => write!(f, "handled"),
            StepOutcome::Completed { handled: false } => write!(f, "not handled"),
            StepOutcome::AwaitingChord(strokes) => write!(f, "awaiting chord after {}", strokes),
            StepOutcome::Pending => write!(f, "pending (marked handled)"),
            StepOutcome::Faulted(e) => write!(f, "fault: {}", e),
            StepOutcome::Ran(settled) if settled.is_empty() => write!(f, "nothing pending"),
            StepOutcome::Ran(settled) => {
                let parts: Vec<String> = settled
                    .iter()
                    .map(|s| match &s.result {
                        Ok(true) => format!("#{} ran", s.step),
                        Ok(false) => format!("#{} found nothing to run", s.step),
                        Err(e) => format!("#{} failed: {}", s.step, e),
                    })
                    .collect();
                write!(f, "settled {}", parts.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub index: usize,
    pub description: String,
    pub outcome: StepOutcome,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}  {:<32} {}", self.index, self.description, self.outcome)
    }
}

/// Drives the demo notepad through a shortcut input manager
pub struct Replayer {
    demo: DemoApp,
    input: ShortcutInputManager,
    pending: Vec<(usize, Task<DispatchResult>)>,
}

impl Replayer {
    pub fn new(keymap: Keymap, default_flags: InputFlags) -> Self {
        let demo = DemoApp::new(default_flags);
        let input = ShortcutInputManager::new(
            Rc::new(RefCell::new(keymap)),
            Rc::new(demo.commands()),
            Rc::new(ForegroundExecutor::new()),
        );
        Self {
            demo,
            input,
            pending: Vec::new(),
        }
    }

    pub fn demo(&self) -> &DemoApp {
        &self.demo
    }

    pub fn input(&self) -> &ShortcutInputManager {
        &self.input
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn run_script(&mut self, script: &Script) -> anyhow::Result<Vec<StepReport>> {
        script
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| self.step(i + 1, step).with_context(|| format!("Step {}", i + 1)))
            .collect()
    }

    /// Apply one step and report what the input manager did with it
    pub fn step(&mut self, index: usize, step: &Step) -> anyhow::Result<StepReport> {
        let outcome = match step.action()? {
            Action::Focus(name) => {
                let element = self.element(name)?;
                self.demo.tree.focus(Some(element));
                StepOutcome::Focused
            }
            Action::Key(key) => self.key(index, key, step)?,
            Action::Mouse(mouse) => self.mouse(index, mouse, step)?,
            Action::Wheel(delta) => self.wheel(index, delta, step)?,
            Action::Run => StepOutcome::Ran(self.settle()),
        };
        self.demo.sync_context();
        tracing::debug!("Step {}: {}", index, outcome);

        Ok(StepReport {
            index,
            description: step.describe(),
            outcome,
        })
    }

    /// Run the executor until stalled and collect dispatches that finished
    pub fn settle(&mut self) -> Vec<Settled> {
        self.input.executor().run_until_stalled();

        let mut settled = Vec::new();
        self.pending.retain_mut(|(step, task)| match task.try_take() {
            Some(result) => {
                settled.push(Settled {
                    step: *step,
                    result: result.map_err(|e| e.to_string()),
                });
                false
            }
            None => true,
        });
        self.demo.sync_context();
        settled
    }

    fn key(&mut self, index: usize, key: &str, step: &Step) -> anyhow::Result<StepOutcome> {
        let Stroke::Key(stroke) = parse_key_string(key)? else {
            bail!("'{}' is a mouse stroke, use a mouse or wheel step", key);
        };
        let is_release = stroke.is_release || step.release;

        // A held modifier key shows up in the live modifier state
        let mut modifiers = stroke.mods | self.held(step)?;
        if !is_release {
            modifiers = modifiers | own_modifier(stroke.key);
        }

        let mut event = KeyEvent {
            is_release,
            is_repeat: step.repeat,
            ..KeyEvent::press(stroke.key, modifiers)
        };
        let focused = self.target(step)?;
        let result = self.input.on_key_event(
            &self.demo.tree,
            focused,
            &mut event,
            step.phase.is_preview(),
        );
        Ok(self.outcome(index, result))
    }

    fn mouse(&mut self, index: usize, mouse: &str, step: &Step) -> anyhow::Result<StepOutcome> {
        let Stroke::Mouse(stroke) = parse_key_string(mouse)? else {
            bail!("'{}' is a key stroke, use a key step", mouse);
        };
        if stroke.button.is_wheel() {
            bail!("'{}' is a wheel stroke, use a wheel step", mouse);
        }

        let modifiers = stroke.mods | self.held(step)?;
        let mut event = MouseButtonEvent {
            is_release: stroke.is_release || step.release,
            ..MouseButtonEvent::press(stroke.button, modifiers, stroke.click_count.max(1))
        };
        let target = self.target(step)?;
        let result = self.input.on_mouse_button(
            &self.demo.tree,
            target,
            &mut event,
            step.phase.is_preview(),
        );
        Ok(self.outcome(index, result))
    }

    fn wheel(&mut self, index: usize, delta: i32, step: &Step) -> anyhow::Result<StepOutcome> {
        let mut event = MouseWheelEvent::new(delta, self.held(step)?);
        let target = self.target(step)?;
        let result = self.input.on_mouse_wheel(
            &self.demo.tree,
            target,
            &mut event,
            step.phase.is_preview(),
        );
        Ok(self.outcome(index, result))
    }

    fn outcome(
        &mut self,
        index: usize,
        result: Result<InputOutcome, DispatchError>,
    ) -> StepOutcome {
        match result {
            Ok(InputOutcome::Ignored) => StepOutcome::Ignored,
            Ok(InputOutcome::Completed { handled }) => {
                match self.input.keymap().borrow().pending_chord_display() {
                    Some(strokes) if handled => StepOutcome::AwaitingChord(strokes),
                    _ => StepOutcome::Completed { handled },
                }
            }
            Ok(InputOutcome::Pending(task)) => {
                self.pending.push((index, task));
                StepOutcome::Pending
            }
            Err(e) => {
                tracing::warn!("Step {} faulted: {}", index, e);
                StepOutcome::Faulted(e.to_string())
            }
        }
    }

    fn held(&self, step: &Step) -> anyhow::Result<Modifiers> {
        Ok(parse_modifiers(step.mods.as_deref().unwrap_or(""))?)
    }

    fn target(&self, step: &Step) -> anyhow::Result<ElementId> {
        match &step.target {
            Some(name) => self.element(name),
            None => self
                .demo
                .tree
                .focused()
                .ok_or_else(|| anyhow!("nothing has focus; add a focus step or a target")),
        }
    }

    fn element(&self, name: &str) -> anyhow::Result<ElementId> {
        self.demo
            .tree
            .find(name)
            .ok_or_else(|| anyhow!("no element named '{}'", name))
    }
}

fn own_modifier(key: KeyCode) -> Modifiers {
    match key {
        KeyCode::Control => Modifiers::CTRL,
        KeyCode::Shift => Modifiers::SHIFT,
        KeyCode::Alt => Modifiers::ALT,
        KeyCode::Meta => Modifiers::META,
        _ => Modifiers::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = parse_script(
            r#"
steps:
  - focus: editor
  - key: "ctrl+n"
    repeat: true
  - wheel: -120
    mods: ctrl
    target: tabs
  - run: true
"#,
        )
        .unwrap();

        assert_eq!(script.steps.len(), 4);
        assert_eq!(script.steps[1].key.as_deref(), Some("ctrl+n"));
        assert!(script.steps[1].repeat);
        assert_eq!(script.steps[2].wheel, Some(-120));
        assert!(script.steps[3].run);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(parse_script("steps:\n  - press: a\n").is_err());
    }

    #[test]
    fn test_step_needs_exactly_one_action() {
        let empty = Step::default();
        assert!(empty.action().is_err());

        let both = Step {
            key: Some("a".into()),
            run: true,
            ..Step::default()
        };
        assert!(both.action().is_err());
    }

    #[test]
    fn test_describe() {
        let step = Step {
            wheel: Some(120),
            mods: Some("ctrl".into()),
            target: Some("editor".into()),
            ..Step::default()
        };
        assert_eq!(step.describe(), "wheel +120 [ctrl] @editor");
    }

    #[test]
    fn test_own_modifier() {
        assert_eq!(own_modifier(KeyCode::Control), Modifiers::CTRL);
        assert_eq!(own_modifier(KeyCode::Char('a')), Modifiers::NONE);
    }

    #[test]
    fn test_run_outcome_display() {
        let outcome = StepOutcome::Ran(vec![
            Settled {
                step: 2,
                result: Ok(true),
            },
            Settled {
                step: 4,
                result: Err("boom".into()),
            },
        ]);
        assert_eq!(outcome.to_string(), "settled #2 ran, #4 failed: boom");
    }
}
