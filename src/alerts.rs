use log::{debug, warn};
use notify_rust::{Notification, Urgency};
use std::{
    path::Path,
    process::{Command, Stdio},
    thread,
};

/// Best-effort side effects fired when a countdown ends. Implementations swallow
/// their own failures; the timer never waits on them.
pub trait Alerts {
    fn play_sound(&mut self, sound_id: &str, volume: f32);
    fn notify(&mut self, title: &str, body: &str);
}

impl Alerts for Box<dyn Alerts> {
    fn play_sound(&mut self, sound_id: &str, volume: f32) {
        (**self).play_sound(sound_id, volume);
    }

    fn notify(&mut self, title: &str, body: &str) {
        (**self).notify(title, body);
    }
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlerts;

impl Alerts for SilentAlerts {
    fn play_sound(&mut self, _sound_id: &str, _volume: f32) {}
    fn notify(&mut self, _title: &str, _body: &str) {}
}

const SOUND_DIR: &str = "/usr/share/sounds/freedesktop/stereo";

fn sound_file(sound_id: &str) -> Option<&'static str> {
    match sound_id {
        "bell" => Some("bell.oga"),
        "chime" => Some("complete.oga"),
        "alarm" => Some("alarm-clock-elapsed.oga"),
        "message" => Some("message.oga"),
        _ => None,
    }
}

/// Desktop notifications through the notification daemon, sounds through `paplay`
/// (or `aplay` for the bundled fallbacks).
#[derive(Debug, Clone)]
pub struct DesktopAlerts {
    sound_enabled: bool,
}

impl DesktopAlerts {
    pub fn new(sound_enabled: bool) -> Self {
        Self { sound_enabled }
    }

    fn plays(&self, sound_id: &str) -> bool {
        self.sound_enabled && sound_id != "none"
    }
}

/// paplay volume is linear in 0..=65536.
fn paplay_volume(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * 65536.0) as u32
}

impl Alerts for DesktopAlerts {
    fn play_sound(&mut self, sound_id: &str, volume: f32) {
        if !self.plays(sound_id) {
            return;
        }

        let preferred = sound_file(sound_id).map(|file| format!("{SOUND_DIR}/{file}"));
        let candidates = preferred
            .iter()
            .map(|path| ("paplay", path.as_str()))
            .chain([
                ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
                ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
                ("aplay", "/usr/share/sounds/generic.wav"),
            ]);

        let Some((player, file)) = candidates.into_iter().find(|(_, file)| Path::new(file).exists())
        else {
            warn!("No sound file available for {sound_id}");
            return;
        };

        let mut command = Command::new(player);
        if player == "paplay" {
            command.arg(format!("--volume={}", paplay_volume(volume)));
        }
        let spawned = command
            .arg(file)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                debug!("Playing {sound_id} via {player}");
                thread::spawn(move || {
                    if let Err(err) = child.wait() {
                        warn!("Failed to wait for sound player: {err}");
                    }
                });
            }
            Err(err) => warn!("Failed to play {sound_id} with {player}: {err}"),
        }
    }

    fn notify(&mut self, title: &str, body: &str) {
        let shown = Notification::new()
            .summary(title)
            .body(body)
            .appname("focuslog")
            .icon("alarm-clock")
            .urgency(Urgency::Critical)
            .show();

        if let Err(err) = shown {
            warn!("Failed to show notification: {err}");
        }
    }
}
