//! Background video playback under browser autoplay policies.

use crate::{
    host::{GestureSource, Host, Media, NodeId, ObserverOptions, Spawner, VisibilitySource},
    telemetry::{log_event, LogLevel},
    visibility::PresenceObserver,
};
use futures_util::FutureExt;
use serde_json::json;
use std::{cell::Cell, rc::Rc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    AttemptingAutoplay,
    Playing,
    AwaitingUserGesture,
    /// The single gesture-gated attempt was rejected as well. Terminal.
    GestureAttemptFailed,
}

impl PlaybackState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AttemptingAutoplay => "attempting_autoplay",
            Self::Playing => "playing",
            Self::AwaitingUserGesture => "awaiting_user_gesture",
            Self::GestureAttemptFailed => "gesture_attempt_failed",
        }
    }
}

pub struct Autoplay {
    label: String,
    media: Rc<dyn Media>,
    gestures: Rc<dyn GestureSource>,
    state: Cell<PlaybackState>,
}

impl Autoplay {
    pub fn new(label: impl Into<String>, media: Rc<dyn Media>, gestures: Rc<dyn GestureSource>) -> Self {
        Self {
            label: label.into(),
            media,
            gestures,
            state: Cell::new(PlaybackState::AttemptingAutoplay),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state.get()
    }

    fn transition(&self, state: PlaybackState) {
        self.state.set(state);
        log_event(
            LogLevel::Debug,
            "autoplay_state",
            json!({ "video": self.label, "state": state.as_str() }),
        );
    }

    /// Tries to start playback, falling back to one attempt on the first user
    /// gesture when the host refuses.
    pub async fn run(self: Rc<Self>) {
        self.transition(PlaybackState::AttemptingAutoplay);
        let Err(error) = self.media.play().await else {
            self.transition(PlaybackState::Playing);
            return;
        };

        log_event(
            LogLevel::Info,
            "autoplay_prevented",
            json!({ "video": self.label, "reason": error.reason }),
        );
        self.transition(PlaybackState::AwaitingUserGesture);
        self.gestures.first_gesture().await;

        match self.media.play().await {
            Ok(()) => self.transition(PlaybackState::Playing),
            Err(error) => {
                log_event(
                    LogLevel::Warn,
                    "gesture_play_failed",
                    json!({ "video": self.label, "reason": error.reason }),
                );
                self.transition(PlaybackState::GestureAttemptFailed);
            }
        }
    }
}

/// Plays a video while it is on screen and pauses it otherwise.
pub struct VisibilityPlayback {
    _presence: Rc<PresenceObserver>,
}

impl VisibilityPlayback {
    pub fn attach(
        source: Rc<dyn VisibilitySource>,
        spawner: Rc<dyn Spawner>,
        label: String,
        video: NodeId,
        media: Rc<dyn Media>,
        threshold: f64,
    ) -> Option<Self> {
        let presence = PresenceObserver::attach(
            source,
            &[video],
            &ObserverOptions::new(threshold),
            move |_, visible| {
                if !visible {
                    media.pause();
                    return;
                }

                let label = label.clone();
                let play = media.play();
                spawner.spawn(
                    async move {
                        if let Err(error) = play.await {
                            log_event(
                                LogLevel::Debug,
                                "visible_play_failed",
                                json!({ "video": label, "reason": error.reason }),
                            );
                        }
                    }
                    .boxed_local(),
                );
            },
        )?;

        Some(Self {
            _presence: presence,
        })
    }
}

pub struct AutoplayVideo {
    pub label: String,
    pub node: NodeId,
    pub media: Rc<dyn Media>,
}

/// Starts the gesture-gated autoplay flow for every video and pauses each one
/// while it is off screen.
pub fn start_autoplay_videos(
    host: &Host,
    gestures: Rc<dyn GestureSource>,
    videos: Vec<AutoplayVideo>,
    threshold: f64,
) -> Vec<Rc<Autoplay>> {
    videos
        .into_iter()
        .map(|video| {
            let observed = VisibilityPlayback::attach(
                Rc::clone(&host.visibility),
                Rc::clone(&host.spawner),
                video.label.clone(),
                video.node,
                Rc::clone(&video.media),
                threshold,
            );
            if observed.is_none() {
                log_event(
                    LogLevel::Debug,
                    "visibility_playback_inactive",
                    json!({ "video": video.label }),
                );
            }

            let controller = Rc::new(Autoplay::new(video.label, video.media, Rc::clone(&gestures)));
            host.spawner.spawn(Rc::clone(&controller).run().boxed_local());
            controller
        })
        .collect()
}
