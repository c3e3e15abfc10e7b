/// The three settings the control panel can change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Color,
    Brightness,
    Speed,
}

/// What fires a control's submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The color picker widget emitted `change`
    PickerChange,
    /// A plain `<input>` emitted `change`
    InputChange,
}

/// Ties a DOM control to the form it submits and the endpoint it posts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBinding {
    pub kind: ControlKind,
    pub input_id: &'static str,
    pub form_id: &'static str,
    pub endpoint: &'static str,
    pub trigger: Trigger,
}

/// Bindings in the order the control panel installs them
pub const CONTROLS: [ControlBinding; 3] = [
    ControlKind::Color.binding(),
    ControlKind::Brightness.binding(),
    ControlKind::Speed.binding(),
];

impl ControlKind {
    /// Backend path receiving the form
    pub const fn path(self) -> &'static str {
        match self {
            Self::Color => "/color",
            Self::Brightness => "/brightness",
            Self::Speed => "/speed",
        }
    }

    /// Name of the form field carrying the value
    pub const fn field(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Brightness => "brightness",
            Self::Speed => "speed",
        }
    }

    pub const fn input_id(self) -> &'static str {
        match self {
            Self::Color => "color-input",
            Self::Brightness => "brightness-input",
            Self::Speed => "speed-input",
        }
    }

    pub const fn form_id(self) -> &'static str {
        match self {
            Self::Color => "color-form",
            Self::Brightness => "brightness-form",
            Self::Speed => "speed-form",
        }
    }

    pub const fn trigger(self) -> Trigger {
        match self {
            Self::Color => Trigger::PickerChange,
            Self::Brightness | Self::Speed => Trigger::InputChange,
        }
    }

    pub const fn binding(self) -> ControlBinding {
        ControlBinding {
            kind: self,
            input_id: self.input_id(),
            form_id: self.form_id(),
            endpoint: self.path(),
            trigger: self.trigger(),
        }
    }
}

impl std::fmt::Display for ControlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field())
    }
}
