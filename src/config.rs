use anyhow::{Context, Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::actions::Button;
use crate::history::{DEFAULT_DEPTH, MIN_DEPTH};

#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Double-click / settle window.
    pub delta_time_ms: u64,
    /// Max age of the oldest history entry before the history is flushed.
    pub timeout_ms: u64,
    pub history_depth: usize,
    pub flush_on_double_click: bool,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            delta_time_ms: 700,
            timeout_ms: 3000,
            history_depth: DEFAULT_DEPTH,
            flush_on_double_click: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Pointer {
    pub button: Button,
    // range of the absolute pointer axes, in observation coordinates
    pub frame_width: i32,
    pub frame_height: i32,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            button: Button::Left,
            frame_width: 800,
            frame_height: 800,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub meta: Meta,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub pointer: Pointer,
}

impl Profile {
    pub fn parse(txt: &str) -> Result<Self> {
        let profile: Profile = toml::from_str(txt)?;
        validate_profile(&profile)?;
        Ok(profile)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigState {
    pub active_name: String,
    pub profile: Profile,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

fn config_dir() -> Result<PathBuf> {
    let dirs = UserDirs::new().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(dirs.home_dir().join(".config").join("handctl"))
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

impl ConfigState {
    pub fn load_or_install_default() -> Result<Self> {
        let cfgdir = config_dir()?;
        let profdir = cfgdir.join("profiles");
        fs::create_dir_all(&profdir)
            .with_context(|| format!("failed to create {}", profdir.display()))?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = cfgdir.join("active");
        if !active_ptr.exists() {
            fs::write(&active_ptr, b"default")?;
        }

        let active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        let profile = load_profile(&profdir, &active_name)?;

        Ok(Self {
            active_name,
            profile,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    /// Load `name` for this session only, leaving the active pointer alone.
    pub fn with_profile(mut self, name: &str) -> Result<Self> {
        self.profile = load_profile(&self.profiles_dir, name)?;
        self.active_name = name.to_string();
        Ok(self)
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.profiles_dir.join(format!("{name}.toml"));
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        self.profile = load_profile(&self.profiles_dir, name)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }

    pub fn doctor_report(&self) -> serde_json::Value {
        serde_json::json!({
            "uinput_present": Path::new("/dev/uinput").exists(),
            "input_group_member": check_in_input_group(),
            "profiles_dir": self.profiles_dir,
            "active_profile": self.active_name,
            "timing": {
                "delta_time_ms": self.profile.timing.delta_time_ms,
                "timeout_ms": self.profile.timing.timeout_ms,
                "history_depth": self.profile.timing.history_depth,
                "flush_on_double_click": self.profile.timing.flush_on_double_click,
            },
            "hints": {
                "udev_rule": "/etc/udev/rules.d/80-uinput.rules",
                "add_user_to_input_group": "sudo usermod -aG input $USER && newgrp input"
            }
        })
    }
}

fn load_profile(dir: &Path, name: &str) -> Result<Profile> {
    let path = dir.join(format!("{name}.toml"));
    let txt = fs::read_to_string(&path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    Profile::parse(&txt).map_err(|e| anyhow!("failed to parse {}: {e}", path.display()))
}

fn validate_profile(p: &Profile) -> Result<()> {
    let t = &p.timing;
    if t.delta_time_ms == 0 || t.timeout_ms == 0 {
        return Err(anyhow!("timing windows must be positive durations"));
    }
    if t.history_depth < MIN_DEPTH {
        return Err(anyhow!(
            "timing.history_depth must be at least {MIN_DEPTH}, got {}",
            t.history_depth
        ));
    }
    if p.pointer.frame_width <= 0 || p.pointer.frame_height <= 0 {
        return Err(anyhow!("pointer frame size must be positive"));
    }
    Ok(())
}

fn check_in_input_group() -> bool {
    if let Ok(s) = fs::read_to_string("/etc/group") {
        let user = whoami::username();
        for line in s.lines() {
            if line.starts_with("input:") {
                if line
                    .split(':')
                    .nth(3)
                    .unwrap_or("")
                    .split(',')
                    .any(|u| u == user)
                {
                    return true;
                }
            }
        }
    }
    false
}
