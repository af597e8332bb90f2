use anyhow::{Result, anyhow};
use log::{info, warn};
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Left,
    Right,
    Middle,
}

impl Button {
    pub fn as_str(&self) -> &'static str {
        match self {
            Button::Left => "left",
            Button::Right => "right",
            Button::Middle => "middle",
        }
    }
}

impl FromStr for Button {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Button::Left),
            "right" => Ok(Button::Right),
            "middle" => Ok(Button::Middle),
            other => Err(anyhow!("unknown mouse button: {other}")),
        }
    }
}

/// Where recognized gestures end up.
pub trait PointerSink {
    fn click(&mut self, button: Button, times: u8) -> Result<()>;
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;
}

pub struct UinputSink {
    linux: Option<Box<LinuxUinput>>,
}

impl UinputSink {
    /// Create the virtual pointer. Absolute axes span `0..=width` and
    /// `0..=height` so observation coordinates map straight onto the screen.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            let dev = LinuxUinput::create(width, height)?;
            return Ok(Self {
                linux: Some(Box::new(dev)),
            });
        }
        #[allow(unreachable_code)]
        {
            let _ = (width, height);
            warn!("uinput not available; running in NO-OP mode");
            Ok(Self::noop())
        }
    }

    /// A sink that only logs what it would have done.
    pub fn noop() -> Self {
        Self { linux: None }
    }
}

impl PointerSink for UinputSink {
    fn click(&mut self, button: Button, times: u8) -> Result<()> {
        #[cfg(target_os = "linux")]
        if let Some(dev) = self.linux.as_mut() {
            for _ in 0..times {
                dev.click(button)?;
            }
            return Ok(());
        }
        info!("no-op: click {} x{times}", button.as_str());
        Ok(())
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        #[cfg(target_os = "linux")]
        if let Some(dev) = self.linux.as_mut() {
            return dev.move_to(x, y);
        }
        log::debug!("no-op: move to ({x}, {y})");
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn mouse_code(button: Button) -> uinput::event::controller::Mouse {
    use uinput::event::controller::Mouse;
    match button {
        Button::Left => Mouse::Left,
        Button::Right => Mouse::Right,
        Button::Middle => Mouse::Middle,
    }
}

#[cfg(target_os = "linux")]
struct LinuxUinput {
    dev: uinput::device::Device,
}

#[cfg(target_os = "linux")]
impl LinuxUinput {
    fn create(width: i32, height: i32) -> Result<Self> {
        use uinput::event::{absolute, controller::Mouse};

        let dev = uinput::default()?
            .name("handctl Virtual Pointer")?
            .event(absolute::Position::X)?
            .min(0)
            .max(width)
            .event(absolute::Position::Y)?
            .min(0)
            .max(height)
            .event(Mouse::Left)?
            .event(Mouse::Right)?
            .event(Mouse::Middle)?
            .create()?;

        info!("uinput: created virtual pointer ({width}x{height})");
        Ok(Self { dev })
    }

    fn sync(&mut self) -> Result<()> {
        self.dev.synchronize()?;
        Ok(())
    }

    fn click(&mut self, button: Button) -> Result<()> {
        self.dev.send(mouse_code(button), 1)?;
        self.sync()?;
        self.dev.send(mouse_code(button), 0)?;
        self.sync()
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        use uinput::event::absolute::Position;
        self.dev.send(Position::X, x)?;
        self.dev.send(Position::Y, y)?;
        self.sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_from_str() {
        assert_eq!("left".parse::<Button>().unwrap(), Button::Left);
        assert_eq!("RIGHT".parse::<Button>().unwrap(), Button::Right);
        assert_eq!("Middle".parse::<Button>().unwrap(), Button::Middle);
        assert!("thumb".parse::<Button>().is_err());
    }

    #[test]
    fn test_noop_sink_accepts_everything() {
        let mut sink = UinputSink::noop();
        assert!(sink.click(Button::Left, 2).is_ok());
        assert!(sink.move_to(10, 20).is_ok());
    }
}
