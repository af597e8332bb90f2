use anyhow::Result;

use crate::actions::{Button, PointerSink};
use crate::gestures::GestureEvent;

pub fn dispatch_event(ev: &GestureEvent, button: Button, sink: &mut dyn PointerSink) -> Result<()> {
    match *ev {
        GestureEvent::None => Ok(()),
        GestureEvent::Move { x, y } => sink.move_to(x, y),
        GestureEvent::Click { count } => sink.click(button, count.times()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gestures::ClickCount;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Click(Button, u8),
        MoveTo(i32, i32),
    }

    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub calls: Vec<Call>,
        pub fail: bool,
    }

    impl PointerSink for RecordingSink {
        fn click(&mut self, button: Button, times: u8) -> Result<()> {
            if self.fail {
                anyhow::bail!("sink unavailable");
            }
            self.calls.push(Call::Click(button, times));
            Ok(())
        }

        fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
            if self.fail {
                anyhow::bail!("sink unavailable");
            }
            self.calls.push(Call::MoveTo(x, y));
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_maps_events() {
        let mut sink = RecordingSink::default();
        let evs = [
            GestureEvent::Move { x: 3, y: 4 },
            GestureEvent::None,
            GestureEvent::Click {
                count: ClickCount::Double,
            },
            GestureEvent::Click {
                count: ClickCount::Single,
            },
        ];
        for ev in &evs {
            dispatch_event(ev, Button::Right, &mut sink).unwrap();
        }
        assert_eq!(
            sink.calls,
            vec![
                Call::MoveTo(3, 4),
                Call::Click(Button::Right, 2),
                Call::Click(Button::Right, 1),
            ]
        );
    }

    #[test]
    fn test_dispatch_propagates_sink_errors() {
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        assert!(dispatch_event(&GestureEvent::Move { x: 0, y: 0 }, Button::Left, &mut sink).is_err());
        assert!(dispatch_event(&GestureEvent::None, Button::Left, &mut sink).is_ok());
    }
}
