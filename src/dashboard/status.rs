#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    pub fn is_loading(self) -> bool {
        self == Self::Loading
    }
}

/// Status plus the value it guards. Every transition builds a fresh `Tracked`, so the
/// value is only observable together with the status it was produced under.
#[derive(Clone, Debug, PartialEq)]
pub struct Tracked<T> {
    status: Status,
    value: Option<T>,
    error: Option<String>,
}

impl<T> Default for Tracked<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> Tracked<T> {
    pub fn idle() -> Self {
        Self {
            status: Status::Idle,
            value: None,
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            status: Status::Loading,
            value: None,
            error: None,
        }
    }

    pub fn ready(value: T) -> Self {
        Self {
            status: Status::Ready,
            value: Some(value),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            value: None,
            error: Some(error.into()),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The value, only while `Ready`.
    pub fn current(&self) -> Option<&T> {
        if self.status == Status::Ready {
            self.value.as_ref()
        } else {
            None
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
